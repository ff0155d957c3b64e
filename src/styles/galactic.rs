//! # Galactic
//!
//! Particles start on a wide ring around the canvas and spiral inwards. The
//! interpolated position is rotated about the canvas center by the remaining
//! progress, one full turn at the start and none on arrival. Inner targets
//! start first.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::{
    particles::Particle,
    styles::{
        easing::Easing,
        traits::{
            mix, DepthRange, Motion, MotionContext, MotionStyle, Spawn, SpawnContext, StyleEntry,
        },
    },
};

/// Ring radius as a fraction of the larger canvas side
const RING_RADIUS: f32 = 0.8;

pub(super) fn entry() -> StyleEntry {
    StyleEntry {
        style: MotionStyle::Galactic,
        description: "Particles spiral in from a distant ring, inner targets first",
        easing: Easing::EaseInOutCubic,
        depth: Some(DepthRange { near: 100.0, far: 600.0 }),
        visibility_gate: false,
        clear_alpha: None,
        initializer: spawn,
        transform: spiral,
    }
}

fn spawn(target: Vec2, ctx: &mut SpawnContext<'_>) -> Spawn {
    let angle = ctx.rng.gen::<f32>() * TAU;
    let radius = ctx.canvas.width.max(ctx.canvas.height) * RING_RADIUS;
    Spawn {
        start: ctx.canvas.center() + Vec2::from_angle(angle) * radius,
        delay: ctx.canvas.normalized_distance(target).min(1.0),
    }
}

/// Rotation applied at eased progress `ease`
pub fn spiral_angle(ease: f32) -> f32 {
    (1.0 - ease) * TAU
}

fn spiral(particle: &Particle, ctx: &mut MotionContext<'_>) -> Motion {
    let position = mix(particle.start, particle.target, ctx.ease);
    let angle = spiral_angle(ctx.ease);
    if angle == 0.0 {
        return Motion::at(position);
    }

    let center = ctx.canvas.center();
    let rotated = center + Vec2::from_angle(angle).rotate(position.truncate() - center);
    Motion::at(Vec3::new(rotated.x, rotated.y, position.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{particles::{Canvas, Shape}, styles::KinematicsTuning};
    use rand::{rngs::SmallRng, SeedableRng};

    fn particle() -> Particle {
        Particle {
            start: Vec3::new(780.0, 300.0, 250.0),
            current: Vec3::new(780.0, 300.0, 250.0),
            target: Vec3::new(123.0, 456.0, 0.0),
            base_size: 3.0,
            size_variation: 1.0,
            delay: 0.5,
            shape: Shape::Square,
            color: None,
        }
    }

    fn evaluate(particle: &Particle, ease: f32) -> Motion {
        let tuning = KinematicsTuning::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut ctx = MotionContext {
            t: ease,
            ease,
            canvas: Canvas::new(600, 600),
            time_ms: 0.0,
            index: 0,
            tuning: &tuning,
            rng: &mut rng,
        };
        spiral(particle, &mut ctx)
    }

    #[test]
    fn test_settled_particle_has_no_spiral_residue() {
        assert_eq!(spiral_angle(1.0), 0.0);
        let particle = particle();
        assert_eq!(evaluate(&particle, 1.0), Motion::at(particle.target));
    }

    #[test]
    fn test_rotation_preserves_distance_from_center() {
        let particle = particle();
        let center = Vec2::new(300.0, 300.0);
        let unrotated = mix(particle.start, particle.target, 0.3).truncate();

        match evaluate(&particle, 0.3) {
            Motion::Visible { position, .. } => {
                let rotated = position.truncate();
                assert!((rotated.distance(center) - unrotated.distance(center)).abs() < 1e-3);
                assert!(rotated.distance(unrotated) > 1.0);
            }
            Motion::Hidden => panic!("galactic particles are never hidden once started"),
        }
    }

    #[test]
    fn test_inner_targets_start_first() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut ctx = SpawnContext {
            canvas: Canvas::new(600, 600),
            rng: &mut rng,
        };
        let inner = spawn(Vec2::new(310.0, 300.0), &mut ctx);
        let outer = spawn(Vec2::new(20.0, 20.0), &mut ctx);
        assert!(inner.delay < outer.delay);
        assert!(outer.delay <= 1.0);
        assert!((inner.start.distance(Vec2::new(300.0, 300.0)) - 480.0).abs() < 1e-2);
    }
}
