//! # Glitch
//!
//! Particles hover around their targets with decaying random jitter and
//! flicker in and out until they snap into place. The jitter shrinks
//! linearly with local time; the step easing only shapes the trail timing.

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::{
    particles::Particle,
    styles::{
        easing::Easing,
        traits::{Motion, MotionContext, MotionStyle, Spawn, SpawnContext, StyleEntry},
    },
};

/// Half-width of the start box around each target
const START_SPREAD: f32 = 100.0;

/// Trail clear alpha used regardless of trail persistence
pub const GLITCH_CLEAR_ALPHA: f32 = 0.4;

pub(super) fn entry() -> StyleEntry {
    StyleEntry {
        style: MotionStyle::Glitch,
        description: "Particles jitter and flicker around their targets before snapping in",
        easing: Easing::Steps,
        depth: None,
        visibility_gate: false,
        clear_alpha: Some(GLITCH_CLEAR_ALPHA),
        initializer: spawn,
        transform: jitter,
    }
}

fn spawn(target: Vec2, ctx: &mut SpawnContext<'_>) -> Spawn {
    let offset = Vec2::new(
        ctx.rng.gen_range(-START_SPREAD..START_SPREAD),
        ctx.rng.gen_range(-START_SPREAD..START_SPREAD),
    );
    Spawn {
        start: target + offset,
        delay: ctx.rng.gen::<f32>(),
    }
}

fn jitter(particle: &Particle, ctx: &mut MotionContext<'_>) -> Motion {
    if ctx.t >= 1.0 {
        return Motion::at(particle.target);
    }

    let amplitude = ctx.tuning.glitch_jitter * (1.0 - ctx.t);
    let offset = Vec3::new(
        (ctx.rng.gen::<f32>() - 0.5) * amplitude,
        (ctx.rng.gen::<f32>() - 0.5) * amplitude,
        0.0,
    );

    if ctx.rng.gen::<f32>() < ctx.tuning.glitch_flicker_probability {
        return Motion::Hidden;
    }
    Motion::at(particle.target + offset)
}
