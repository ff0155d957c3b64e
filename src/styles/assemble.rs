//! # Assemble
//!
//! Particles fly in from random positions scattered over the whole canvas and
//! settle with a fast exponential brake.

use glam::Vec2;
use rand::Rng;

use crate::styles::{
    easing::Easing,
    traits::{interpolate, DepthRange, MotionStyle, Spawn, SpawnContext, StyleEntry},
};

pub(super) fn entry() -> StyleEntry {
    StyleEntry {
        style: MotionStyle::Assemble,
        description: "Particles converge from random canvas positions and settle softly",
        easing: Easing::EaseOutExpo,
        depth: Some(DepthRange { near: 0.0, far: 500.0 }),
        visibility_gate: false,
        clear_alpha: None,
        initializer: spawn,
        transform: interpolate,
    }
}

fn spawn(_target: Vec2, ctx: &mut SpawnContext<'_>) -> Spawn {
    let start = Vec2::new(
        ctx.rng.gen::<f32>() * ctx.canvas.width,
        ctx.rng.gen::<f32>() * ctx.canvas.height,
    );
    Spawn {
        start,
        delay: ctx.rng.gen::<f32>(),
    }
}
