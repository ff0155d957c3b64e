//! # Elastic and Vortex
//!
//! Both styles launch particles from just outside a random canvas edge. They
//! differ only in easing: elastic overshoots and wobbles on arrival, vortex
//! glides in on a symmetric cubic.

use glam::Vec2;
use rand::Rng;

use crate::styles::{
    easing::Easing,
    traits::{interpolate, DepthRange, MotionStyle, Spawn, SpawnContext, StyleEntry},
};

/// How far outside the edge particles start
const EDGE_OFFSET: f32 = 50.0;

const EDGE_DEPTH: DepthRange = DepthRange { near: 0.0, far: 300.0 };

pub(super) fn elastic() -> StyleEntry {
    StyleEntry {
        style: MotionStyle::Elastic,
        description: "Particles spring in from the canvas edges and oscillate into place",
        easing: Easing::EaseOutElastic,
        depth: Some(EDGE_DEPTH),
        visibility_gate: false,
        clear_alpha: None,
        initializer: spawn,
        transform: interpolate,
    }
}

pub(super) fn vortex() -> StyleEntry {
    StyleEntry {
        style: MotionStyle::Vortex,
        description: "Particles sweep in from the canvas edges with a smooth in-out glide",
        easing: Easing::EaseInOutCubic,
        depth: Some(EDGE_DEPTH),
        visibility_gate: false,
        clear_alpha: None,
        initializer: spawn,
        transform: interpolate,
    }
}

fn spawn(_target: Vec2, ctx: &mut SpawnContext<'_>) -> Spawn {
    let (width, height) = (ctx.canvas.width, ctx.canvas.height);
    let start = match ctx.rng.gen_range(0..4) {
        0 => Vec2::new(ctx.rng.gen::<f32>() * width, -EDGE_OFFSET),
        1 => Vec2::new(width + EDGE_OFFSET, ctx.rng.gen::<f32>() * height),
        2 => Vec2::new(ctx.rng.gen::<f32>() * width, height + EDGE_OFFSET),
        _ => Vec2::new(-EDGE_OFFSET, ctx.rng.gen::<f32>() * height),
    };
    Spawn {
        start,
        delay: ctx.rng.gen::<f32>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::Canvas;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn test_starts_outside_canvas() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut ctx = SpawnContext {
            canvas: Canvas::new(200, 100),
            rng: &mut rng,
        };

        for _ in 0..200 {
            let spawn = spawn(Vec2::new(50.0, 50.0), &mut ctx);
            let outside = spawn.start.x < 0.0
                || spawn.start.x > 200.0
                || spawn.start.y < 0.0
                || spawn.start.y > 100.0;
            assert!(outside, "start {:?} is inside the canvas", spawn.start);
            assert!((0.0..1.0).contains(&spawn.delay));
        }
    }
}
