//! # Stipple
//!
//! Particles fall in from deep space far outside the canvas, shimmering with a
//! small sinusoidal wobble in position and depth until they land. Inner
//! targets land first.
//!
//! The wobble is driven by `MotionContext::time_ms`, which the session clock
//! derives from the frame index while recording so exports are reproducible.

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

/// Start radius range, in half-diagonals from the canvas center
const SPAWN_RADIUS: (f32, f32) = (1.5, 2.5);

/// Per-index phase offset so neighbours do not wobble in unison
const PHASE_STEP: f32 = 0.37;

pub(super) fn entry() -> StyleEntry {
    StyleEntry {
        style: MotionStyle::Stipple,
        description: "Particles dive in from deep space with a shimmering 3D wobble",
        easing: Easing::EaseOutCubic,
        depth: Some(DepthRange { near: 200.0, far: 1000.0 }),
        visibility_gate: false,
        clear_alpha: None,
        initializer: spawn,
        transform: shimmer,
    }
}

fn spawn(target: Vec2, ctx: &mut SpawnContext<'_>) -> Spawn {
    let angle = ctx.rng.gen::<f32>() * TAU;
    let radius = ctx.canvas.half_diagonal() * ctx.rng.gen_range(SPAWN_RADIUS.0..SPAWN_RADIUS.1);
    Spawn {
        start: ctx.canvas.center() + Vec2::from_angle(angle) * radius,
        delay: ctx.canvas.normalized_distance(target).min(1.0),
    }
}

fn shimmer(particle: &Particle, ctx: &mut MotionContext<'_>) -> Motion {
    let position = mix(particle.start, particle.target, ctx.ease);
    if ctx.t >= 1.0 {
        return Motion::at(position);
    }

    let tuning = ctx.tuning;
    let fade = 1.0 - ctx.t;
    let phase = ctx.index as f32 * PHASE_STEP;
    let w = (ctx.time_ms as f32) * tuning.stipple_noise_frequency;

    let noise = Vec3::new(
        (w + phase).sin() * tuning.stipple_noise_amplitude,
        (w * 1.3 + phase).cos() * tuning.stipple_noise_amplitude,
        (w * 0.7 + phase).sin() * tuning.stipple_depth_noise,
    );
    Motion::at(position + noise * fade)
}
