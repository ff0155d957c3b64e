//! Per-frame particle kinematics.
//!
//! Pure functions from (animation progress, particle delay, style) to an
//! eased 3D position. Randomness comes only from the injected generator.

use glam::Vec3;
use rand::rngs::SmallRng;

use crate::{
    particles::types::{Canvas, Particle, Shape},
    styles::{KinematicsTuning, Motion, MotionContext, StyleEntry},
};

/// Flash color of scanwave particles
pub const FLASH_WHITE: [u8; 3] = [255, 255, 255];

/// Logical time of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Elapsed fraction of the animation, `[0, 1]`
    pub progress: f32,
    /// Elapsed milliseconds, used by time-driven noise
    pub time_ms: f64,
}

/// A particle placed for drawing, before projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub size: f32,
    pub shape: Shape,
    /// Overrides the configured fill
    pub color: Option<[u8; 3]>,
}

/// Local time of a particle: when it starts inside the stagger window and how
/// far along its move it is.
pub fn local_time(progress: f32, delay: f32, stagger_window: f32) -> f32 {
    // Delays never exceed 1, so everything has landed by the end
    if progress >= 1.0 {
        return 1.0;
    }
    let my_start = delay * stagger_window;
    let move_duration = 1.0 - stagger_window;
    if move_duration <= 0.0 {
        return if progress >= my_start { 1.0 } else { 0.0 };
    }
    ((progress - my_start) / move_duration).clamp(0.0, 1.0)
}

/// Evaluate one particle for one frame
pub fn evaluate(
    entry: &StyleEntry,
    particle: &Particle,
    index: usize,
    frame: FrameTime,
    canvas: Canvas,
    tuning: &KinematicsTuning,
    rng: &mut SmallRng,
) -> Motion {
    let t = local_time(frame.progress, particle.delay, tuning.stagger_window);
    if t <= 0.0 && !entry.visibility_gate {
        return Motion::Hidden;
    }

    let ease = entry.easing.apply_with_steps(t, &tuning.glitch_steps);
    let mut ctx = MotionContext {
        t,
        ease,
        canvas,
        time_ms: frame.time_ms,
        index,
        tuning,
        rng,
    };
    (entry.transform)(particle, &mut ctx)
}
