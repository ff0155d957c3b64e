//! Benchmarks for one composited animation frame.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::SmallRng, SeedableRng};

use particle_reveal::{
    config::RenderConfig,
    particles::{Canvas, FrameTime, ParticleField, Point},
    render::{Compositor, Frame},
    styles::{KinematicsTuning, MotionStyle, StyleRegistry},
};

fn points(render: &RenderConfig) -> Vec<Point> {
    // Roughly the foreground of a QR code at stride 3
    (0..render.height)
        .step_by(render.density as usize)
        .flat_map(|y| {
            (0..render.width)
                .step_by(render.density as usize)
                .filter(move |x| (x / 24 + y / 24) % 2 == 0)
                .map(move |x| Point::new(x as f32, y as f32))
        })
        .collect()
}

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let registry = StyleRegistry::new();
    let render = RenderConfig {
        glow_intensity: 40.0,
        ..RenderConfig::default()
    };
    let tuning = KinematicsTuning::default();
    let points = points(&render);

    for style in MotionStyle::ALL {
        let entry = registry.get(style).unwrap();
        let compositor = Compositor::new(&render, entry).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut field = ParticleField::new(Canvas::new(render.width, render.height));
        field.reset(&points, entry, &render, &mut rng);

        let mut surface = Frame::new_black(render.width, render.height);
        let mut placements = Vec::with_capacity(points.len());
        let frame = FrameTime {
            progress: 0.5,
            time_ms: 1250.0,
        };

        group.bench_with_input(BenchmarkId::from_parameter(style.name()), &style, |b, _| {
            b.iter(|| {
                field.advance(entry, black_box(frame), &tuning, &mut rng, &mut placements);
                compositor.draw_frame(black_box(&mut surface), &placements, frame.progress);
            });
        });
    }

    group.finish();
}

fn bench_static_render(c: &mut Criterion) {
    let registry = StyleRegistry::new();
    let render = RenderConfig::default();
    let entry = registry.get(MotionStyle::Assemble).unwrap();
    let compositor = Compositor::new(&render, entry).unwrap();
    let mut rng = SmallRng::seed_from_u64(1);
    let mut field = ParticleField::new(Canvas::new(render.width, render.height));
    field.reset(&points(&render), entry, &render, &mut rng);
    let mut surface = Frame::new_black(render.width, render.height);

    c.bench_function("static_render", |b| {
        b.iter(|| compositor.static_render(black_box(&mut surface), field.settled()));
    });
}

criterion_group!(benches, bench_frame, bench_static_render);
criterion_main!(benches);
