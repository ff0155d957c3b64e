use std::fmt;
use std::str::FromStr;

use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, RevealError},
    particles::{Canvas, Particle},
    styles::easing::{Easing, DEFAULT_GLITCH_STEPS},
};

/// The eight motion styles a reveal can be choreographed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionStyle {
    Assemble,
    Elastic,
    Galactic,
    Glitch,
    Liquid,
    Vortex,
    Scanwave,
    Stipple,
}

impl MotionStyle {
    pub const ALL: [MotionStyle; 8] = [
        MotionStyle::Assemble,
        MotionStyle::Elastic,
        MotionStyle::Galactic,
        MotionStyle::Glitch,
        MotionStyle::Liquid,
        MotionStyle::Vortex,
        MotionStyle::Scanwave,
        MotionStyle::Stipple,
    ];

    /// Lowercase name, used in config files and artifact names
    pub fn name(self) -> &'static str {
        match self {
            MotionStyle::Assemble => "assemble",
            MotionStyle::Elastic => "elastic",
            MotionStyle::Galactic => "galactic",
            MotionStyle::Glitch => "glitch",
            MotionStyle::Liquid => "liquid",
            MotionStyle::Vortex => "vortex",
            MotionStyle::Scanwave => "scanwave",
            MotionStyle::Stipple => "stipple",
        }
    }
}

impl Default for MotionStyle {
    fn default() -> Self {
        MotionStyle::Assemble
    }
}

impl fmt::Display for MotionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name().to_uppercase())
    }
}

impl FromStr for MotionStyle {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        MotionStyle::ALL
            .into_iter()
            .find(|style| style.name() == wanted)
            .ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: "animation.style".to_string(),
                    value: s.to_string(),
                }
                .into()
            })
    }
}

/// Aesthetic tuning values for the per-style motion transforms
///
/// None of these are derived from anything; they are knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsTuning {
    /// Fraction of the animation over which particle start times are spread
    pub stagger_window: f32,

    /// Thresholds of the quantized glitch curve
    pub glitch_steps: [f32; 3],

    /// Chance that a still-settling glitch particle is skipped in a frame
    pub glitch_flicker_probability: f32,

    /// Width of the glitch jitter box in pixels
    pub glitch_jitter: f32,

    /// Local time window during which scanwave particles flash white
    pub scan_flash_window: f32,

    /// Stipple positional noise amplitude in pixels
    pub stipple_noise_amplitude: f32,

    /// Stipple depth noise amplitude
    pub stipple_depth_noise: f32,

    /// Stipple noise angular frequency in radians per millisecond
    pub stipple_noise_frequency: f32,
}

impl Default for KinematicsTuning {
    fn default() -> Self {
        Self {
            stagger_window: 0.6,
            glitch_steps: DEFAULT_GLITCH_STEPS,
            glitch_flicker_probability: 0.2,
            glitch_jitter: 50.0,
            scan_flash_window: 0.2,
            stipple_noise_amplitude: 6.0,
            stipple_depth_noise: 40.0,
            stipple_noise_frequency: 0.004,
        }
    }
}

/// Start state produced by a style initializer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    /// Start position on the image plane; depth is filled in from the style's
    /// depth range
    pub start: Vec2,
    pub delay: f32,
}

pub struct SpawnContext<'a> {
    pub canvas: Canvas,
    pub rng: &'a mut SmallRng,
}

/// Result of evaluating one particle for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Not drawn this frame
    Hidden,
    Visible {
        position: Vec3,
        /// Force pure white instead of the configured fill
        flash: bool,
    },
}

impl Motion {
    pub fn at(position: Vec3) -> Self {
        Motion::Visible {
            position,
            flash: false,
        }
    }
}

pub struct MotionContext<'a> {
    /// Local time of the particle, `[0, 1]`
    pub t: f32,
    /// `t` passed through the style's easing
    pub ease: f32,
    pub canvas: Canvas,
    /// Animation time in milliseconds. Frame-derived while recording.
    pub time_ms: f64,
    /// Index of the particle in the arena
    pub index: usize,
    pub tuning: &'a KinematicsTuning,
    pub rng: &'a mut SmallRng,
}

pub type Initializer = fn(target: Vec2, ctx: &mut SpawnContext<'_>) -> Spawn;
pub type Transform = fn(particle: &Particle, ctx: &mut MotionContext<'_>) -> Motion;

/// Uniform start depth range of depth-aware styles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    pub near: f32,
    pub far: f32,
}

/// One row of the style dispatch table
#[derive(Clone, Copy)]
pub struct StyleEntry {
    pub style: MotionStyle,
    pub description: &'static str,
    pub easing: Easing,

    /// `None` pins the start depth to the image plane
    pub depth: Option<DepthRange>,

    /// Particles are evaluated before their local time starts; the transform
    /// decides visibility itself
    pub visibility_gate: bool,

    /// Fixed trail clear alpha overriding the trail persistence setting
    pub clear_alpha: Option<f32>,

    pub initializer: Initializer,
    pub transform: Transform,
}

impl fmt::Debug for StyleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleEntry")
            .field("style", &self.style)
            .field("easing", &self.easing)
            .field("depth", &self.depth)
            .field("visibility_gate", &self.visibility_gate)
            .field("clear_alpha", &self.clear_alpha)
            .finish()
    }
}

/// Interpolation that lands exactly on `target` when `s == 1`
pub fn mix(start: Vec3, target: Vec3, s: f32) -> Vec3 {
    start * (1.0 - s) + target * s
}

/// The default motion transform: straight interpolation from start to target
pub fn interpolate(particle: &Particle, ctx: &mut MotionContext<'_>) -> Motion {
    Motion::at(mix(particle.start, particle.target, ctx.ease))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_names_roundtrip() {
        for style in MotionStyle::ALL {
            let parsed: MotionStyle = style.name().parse().unwrap();
            assert_eq!(parsed, style);
        }
        assert_eq!("  GaLaCtIc ".parse::<MotionStyle>().unwrap(), MotionStyle::Galactic);
        assert!("warp".parse::<MotionStyle>().is_err());
    }

    #[test]
    fn test_display_is_uppercase() {
        assert_eq!(MotionStyle::Scanwave.to_string(), "SCANWAVE");
    }

    #[test]
    fn test_mix_lands_exactly() {
        let start = Vec3::new(0.1, -731.3, 512.0);
        let target = Vec3::new(0.3, 17.7, 0.0);
        assert_eq!(mix(start, target, 1.0), target);
        assert_eq!(mix(start, target, 0.0), start);
    }
}
