use rand::{rngs::SmallRng, Rng};
use tracing::debug;

use crate::{
    config::RenderConfig,
    particles::{
        kinematics::{self, FrameTime, Placement, FLASH_WHITE},
        types::{Canvas, Particle, Point, Shape, ShapeMode},
    },
    styles::{KinematicsTuning, Motion, MotionStyle, SpawnContext, StyleEntry},
};

/// Owner of the particle arena
///
/// The arena is rebuilt wholesale by [`ParticleField::reset`]; between resets
/// only the `current` position of each record changes.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    style: MotionStyle,
    canvas: Canvas,
}

impl ParticleField {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            particles: Vec::new(),
            style: MotionStyle::default(),
            canvas,
        }
    }

    /// Discard every particle and build one record per point for `entry`'s
    /// style.
    pub fn reset(
        &mut self,
        points: &[Point],
        entry: &StyleEntry,
        render: &RenderConfig,
        rng: &mut SmallRng,
    ) {
        let canvas = Canvas::new(render.width, render.height);
        let base_size = render.density as f32 * render.size_multiplier;
        let variance = render.size_variance;

        let mut particles = Vec::with_capacity(points.len());
        for point in points {
            let target = point.position();
            let spawn = (entry.initializer)(target, &mut SpawnContext { canvas, rng: &mut *rng });

            let depth = match entry.depth {
                Some(range) if range.far > range.near => rng.gen_range(range.near..range.far),
                Some(range) => range.near,
                None => 0.0,
            };
            let start = spawn.start.extend(depth);

            let size_variation = 1.0 + (rng.gen::<f32>() - 0.5) * variance;
            let shape = match render.shape {
                ShapeMode::Square => Shape::Square,
                ShapeMode::Circle => Shape::Circle,
                ShapeMode::Mixed => {
                    if rng.gen_bool(0.5) {
                        Shape::Circle
                    } else {
                        Shape::Square
                    }
                }
            };

            particles.push(Particle {
                start,
                current: start,
                target: target.extend(0.0),
                base_size,
                size_variation,
                delay: spawn.delay,
                shape,
                color: if render.use_source_colors { point.color } else { None },
            });
        }

        debug!(
            "Reset {} particles for {} style on a {}x{} canvas",
            particles.len(),
            entry.style,
            render.width,
            render.height
        );

        self.particles = particles;
        self.style = entry.style;
        self.canvas = canvas;
    }

    /// Move every particle to its position at `frame` and collect the visible
    /// ones into `out`.
    pub fn advance(
        &mut self,
        entry: &StyleEntry,
        frame: FrameTime,
        tuning: &KinematicsTuning,
        rng: &mut SmallRng,
        out: &mut Vec<Placement>,
    ) {
        out.clear();
        let canvas = self.canvas;

        for (index, particle) in self.particles.iter_mut().enumerate() {
            match kinematics::evaluate(entry, particle, index, frame, canvas, tuning, rng) {
                Motion::Hidden => {}
                Motion::Visible { position, flash } => {
                    particle.current = position;
                    out.push(Placement {
                        position,
                        size: particle.size(),
                        shape: particle.shape,
                        color: if flash { Some(FLASH_WHITE) } else { particle.color },
                    });
                }
            }
        }
    }

    /// Every particle at rest on its target
    pub fn settled(&self) -> impl Iterator<Item = Placement> + '_ {
        self.particles.iter().map(|particle| Placement {
            position: particle.target,
            size: particle.size(),
            shape: particle.shape,
            color: particle.color,
        })
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn style(&self) -> MotionStyle {
        self.style
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::StyleRegistry;
    use rand::SeedableRng;

    fn grid(width: u32, height: u32, step: usize) -> Vec<Point> {
        (0..height)
            .step_by(step)
            .flat_map(|y| (0..width).step_by(step).map(move |x| Point::new(x as f32, y as f32)))
            .collect()
    }

    fn reset(style: MotionStyle, render: &RenderConfig, points: &[Point], seed: u64) -> ParticleField {
        let registry = StyleRegistry::new();
        let mut field = ParticleField::new(Canvas::new(render.width, render.height));
        let mut rng = SmallRng::seed_from_u64(seed);
        field.reset(points, registry.get(style).unwrap(), render, &mut rng);
        field
    }

    #[test]
    fn test_one_particle_per_point_with_bounded_delay() {
        let render = RenderConfig::default();
        let points = grid(render.width, render.height, 37);

        for style in MotionStyle::ALL {
            let field = reset(style, &render, &points, 1);
            assert_eq!(field.len(), points.len());
            assert_eq!(field.style(), style);

            for (particle, point) in field.particles().iter().zip(&points) {
                assert_eq!(particle.target.x, point.x);
                assert_eq!(particle.target.y, point.y);
                assert_eq!(particle.target.z, 0.0);
                assert!(
                    (0.0..=1.0).contains(&particle.delay),
                    "{} delay {} out of bounds",
                    style,
                    particle.delay
                );
            }
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let render = RenderConfig {
            shape: ShapeMode::Mixed,
            ..RenderConfig::default()
        };
        let points = grid(render.width, render.height, 50);

        for style in MotionStyle::ALL {
            let a = reset(style, &render, &points, 42);
            let b = reset(style, &render, &points, 42);
            assert_eq!(a.particles(), b.particles(), "{} is not deterministic", style);
        }

        let a = reset(MotionStyle::Assemble, &render, &points, 1);
        let b = reset(MotionStyle::Assemble, &render, &points, 2);
        assert_ne!(a.particles(), b.particles());
    }

    #[test]
    fn test_flat_styles_pin_depth() {
        let render = RenderConfig::default();
        let points = grid(render.width, render.height, 60);

        for style in [MotionStyle::Glitch, MotionStyle::Liquid, MotionStyle::Scanwave] {
            let field = reset(style, &render, &points, 9);
            assert!(field.particles().iter().all(|p| p.start.z == 0.0));
        }

        let stipple = reset(MotionStyle::Stipple, &render, &points, 9);
        assert!(stipple.particles().iter().all(|p| (200.0..1000.0).contains(&p.start.z)));
    }

    #[test]
    fn test_zero_variance_gives_exact_size() {
        let render = RenderConfig {
            density: 4,
            size_multiplier: 1.5,
            size_variance: 0.0,
            ..RenderConfig::default()
        };
        let points = grid(render.width, render.height, 40);
        let field = reset(MotionStyle::Vortex, &render, &points, 5);

        assert!(field.particles().iter().all(|p| p.size() == 6.0));
    }

    #[test]
    fn test_variance_bounds() {
        let render = RenderConfig {
            size_variance: 1.0,
            ..RenderConfig::default()
        };
        let points = grid(render.width, render.height, 20);
        let field = reset(MotionStyle::Assemble, &render, &points, 5);

        assert!(field
            .particles()
            .iter()
            .all(|p| (0.5..=1.5).contains(&p.size_variation)));
    }

    #[test]
    fn test_shape_modes() {
        let points = grid(600, 600, 30);
        let square = reset(MotionStyle::Assemble, &RenderConfig::default(), &points, 3);
        assert!(square.particles().iter().all(|p| p.shape == Shape::Square));

        let mixed_render = RenderConfig {
            shape: ShapeMode::Mixed,
            ..RenderConfig::default()
        };
        let mixed = reset(MotionStyle::Assemble, &mixed_render, &points, 3);
        let circles = mixed.particles().iter().filter(|p| p.shape == Shape::Circle).count();
        assert!(circles > 0 && circles < points.len());
    }

    #[test]
    fn test_source_colors_are_opt_in() {
        let points = vec![Point::new(5.0, 5.0).with_color([10, 20, 30])];

        let plain = reset(MotionStyle::Scanwave, &RenderConfig::default(), &points, 0);
        assert_eq!(plain.particles()[0].color, None);

        let colored_render = RenderConfig {
            use_source_colors: true,
            ..RenderConfig::default()
        };
        let colored = reset(MotionStyle::Scanwave, &colored_render, &points, 0);
        assert_eq!(colored.particles()[0].color, Some([10, 20, 30]));
    }

    #[test]
    fn test_advance_updates_current_and_flashes() {
        let render = RenderConfig::default();
        let registry = StyleRegistry::new();
        let entry = registry.get(MotionStyle::Scanwave).unwrap();
        let points = vec![Point::new(100.0, 0.0), Point::new(100.0, 599.0)];
        let mut field = reset(MotionStyle::Scanwave, &render, &points, 0);
        let mut rng = SmallRng::seed_from_u64(0);
        let mut out = Vec::new();

        // Top row just passed by the scan line, bottom row not yet
        field.advance(
            entry,
            FrameTime { progress: 0.02, time_ms: 50.0 },
            &KinematicsTuning::default(),
            &mut rng,
            &mut out,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].color, Some(FLASH_WHITE));
        assert_eq!(out[0].position, field.particles()[0].target);
    }
}
