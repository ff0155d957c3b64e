//! # Liquid
//!
//! Particles rise from below the canvas along a sine-warped column and
//! overshoot slightly before settling, bottom rows first.

use glam::Vec2;

use crate::styles::{
    easing::Easing,
    traits::{interpolate, MotionStyle, Spawn, SpawnContext, StyleEntry},
};

const WAVE_FREQUENCY: f32 = 0.05;
const WAVE_AMPLITUDE: f32 = 50.0;
/// Distance below the bottom edge where particles start
const SURFACE_DEPTH: f32 = 100.0;

pub(super) fn entry() -> StyleEntry {
    StyleEntry {
        style: MotionStyle::Liquid,
        description: "Particles well up from below the canvas in a wavy, bottom-up flow",
        easing: Easing::EaseOutBack,
        depth: None,
        visibility_gate: false,
        clear_alpha: None,
        initializer: spawn,
        transform: interpolate,
    }
}

fn spawn(target: Vec2, ctx: &mut SpawnContext<'_>) -> Spawn {
    let height = ctx.canvas.height;
    let delay = if height > 0.0 {
        ((height - target.y) / height).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Spawn {
        start: Vec2::new(
            target.x + (target.y * WAVE_FREQUENCY).sin() * WAVE_AMPLITUDE,
            height + SURFACE_DEPTH,
        ),
        delay,
    }
}
