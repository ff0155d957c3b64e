//! # Scanwave
//!
//! Nothing moves. A scan line sweeps top to bottom and particles switch on as
//! it passes, flashing white for a moment before taking the fill color.

use glam::Vec2;

use crate::{
    particles::Particle,
    styles::{
        easing::Easing,
        traits::{Motion, MotionContext, MotionStyle, Spawn, SpawnContext, StyleEntry},
    },
};

pub(super) fn entry() -> StyleEntry {
    StyleEntry {
        style: MotionStyle::Scanwave,
        description: "A top-down scan line lights particles in place with a white flash",
        easing: Easing::Linear,
        depth: None,
        visibility_gate: true,
        clear_alpha: None,
        initializer: spawn,
        transform: scan,
    }
}

fn spawn(target: Vec2, ctx: &mut SpawnContext<'_>) -> Spawn {
    let height = ctx.canvas.height;
    let delay = if height > 0.0 {
        (target.y / height).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Spawn {
        start: target,
        delay,
    }
}

fn scan(particle: &Particle, ctx: &mut MotionContext<'_>) -> Motion {
    if ctx.t <= 0.0 {
        return Motion::Hidden;
    }
    Motion::Visible {
        position: particle.target,
        flash: ctx.t < ctx.tuning.scan_flash_window,
    }
}
