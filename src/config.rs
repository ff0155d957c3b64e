use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    particles::ShapeMode,
    render::ColorSpec,
    styles::{KinematicsTuning, MotionStyle},
    video::OutputFormat,
};

/// Main configuration for a reveal
///
/// A copy of this is frozen when a session starts; later edits only take
/// effect on the next reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Choreography and timing
    pub animation: AnimationConfig,

    /// Particle appearance and compositing
    pub render: RenderConfig,

    /// Video export
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|_| ConfigError::ParseFailed {
            path: path.display().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            key: "config".to_string(),
            value: e.to_string(),
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.animation.validate()?;
        self.render.validate()?;
        self.export.validate()?;
        Ok(())
    }
}

fn invalid<V: ToString>(key: &str, value: V) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Choreography and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub style: MotionStyle,

    /// Playback speed multiplier; duration is `base_duration_ms / speed`
    pub speed: f64,

    /// Duration of the whole reveal at speed 1, in milliseconds
    pub base_duration_ms: f64,

    /// Fixed random seed. Unset means a fresh seed per reset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    pub tuning: KinematicsTuning,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            style: MotionStyle::Assemble,
            speed: 1.0,
            base_duration_ms: 2500.0,
            seed: None,
            tuning: KinematicsTuning::default(),
        }
    }
}

impl AnimationConfig {
    /// Total animation duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        self.base_duration_ms / self.speed
    }

    fn validate(&self) -> Result<()> {
        if !(self.speed > 0.0 && self.speed.is_finite()) {
            return Err(invalid("animation.speed", self.speed).into());
        }

        if !(self.base_duration_ms > 0.0 && self.base_duration_ms.is_finite()) {
            return Err(invalid("animation.base_duration_ms", self.base_duration_ms).into());
        }

        let tuning = &self.tuning;
        if !(0.0..1.0).contains(&tuning.stagger_window) {
            return Err(invalid("animation.tuning.stagger_window", tuning.stagger_window).into());
        }

        let steps = tuning.glitch_steps;
        if !(steps[0] <= steps[1] && steps[1] <= steps[2]) {
            return Err(invalid("animation.tuning.glitch_steps", format!("{:?}", steps)).into());
        }

        if !(0.0..=1.0).contains(&tuning.glitch_flicker_probability) {
            return Err(invalid(
                "animation.tuning.glitch_flicker_probability",
                tuning.glitch_flicker_probability,
            )
            .into());
        }

        if !(0.0..=1.0).contains(&tuning.scan_flash_window) {
            return Err(invalid("animation.tuning.scan_flash_window", tuning.scan_flash_window).into());
        }

        Ok(())
    }
}

/// Particle appearance and compositing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canvas width in pixels
    pub width: u32,

    /// Canvas height in pixels
    pub height: u32,

    /// Sampling stride of the point source; also the base particle size
    pub density: u32,

    pub size_multiplier: f32,

    /// Spread of the per-particle size factor, `0.0..=1.0`
    pub size_variance: f32,

    pub shape: ShapeMode,

    /// Additive glow strength, `0.0..=100.0`; zero disables glow
    pub glow_intensity: f32,

    /// How much of the previous frame survives, `0.0..=1.0`
    pub trail_persistence: f32,

    /// Pinhole focal length used by the projector
    pub focal_length: f32,

    /// Tint particles with the sampled image color instead of the fill
    pub use_source_colors: bool,

    /// Lowest trail clear alpha, whatever the persistence
    pub clear_alpha_floor: f32,

    /// Particles drawn smaller than this many pixels are skipped
    pub visibility_floor: f32,

    /// Circles smaller than this many pixels are drawn as squares
    pub circle_threshold: f32,

    /// Lay the fill-tinted source image under the particles
    pub backdrop: bool,

    /// Backdrop opacity once settled
    pub backdrop_alpha: f32,

    /// Progress at which the backdrop starts fading in
    pub backdrop_fade_start: f32,

    /// Kept last so it serializes as a trailing TOML table
    pub color: ColorSpec,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            density: 3,
            size_multiplier: 1.0,
            size_variance: 0.0,
            shape: ShapeMode::Square,
            glow_intensity: 0.0,
            trail_persistence: 0.5,
            focal_length: 400.0,
            use_source_colors: false,
            clear_alpha_floor: 0.02,
            visibility_floor: 0.3,
            circle_threshold: 2.0,
            backdrop: true,
            backdrop_alpha: 0.2,
            backdrop_fade_start: 0.8,
            color: ColorSpec::default(),
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid("render.size", format!("{}x{}", self.width, self.height)).into());
        }

        if self.density == 0 {
            return Err(invalid("render.density", self.density).into());
        }

        if !(self.size_multiplier > 0.0) {
            return Err(invalid("render.size_multiplier", self.size_multiplier).into());
        }

        if !(0.0..=1.0).contains(&self.size_variance) {
            return Err(invalid("render.size_variance", self.size_variance).into());
        }

        if !(0.0..=100.0).contains(&self.glow_intensity) {
            return Err(invalid("render.glow_intensity", self.glow_intensity).into());
        }

        if !(0.0..=1.0).contains(&self.trail_persistence) {
            return Err(invalid("render.trail_persistence", self.trail_persistence).into());
        }

        if !(self.focal_length > 0.0) {
            return Err(invalid("render.focal_length", self.focal_length).into());
        }

        if !(self.clear_alpha_floor > 0.0 && self.clear_alpha_floor <= 0.4) {
            return Err(invalid("render.clear_alpha_floor", self.clear_alpha_floor).into());
        }

        if !(0.0..=1.0).contains(&self.backdrop_alpha) {
            return Err(invalid("render.backdrop_alpha", self.backdrop_alpha).into());
        }

        if !(0.0..1.0).contains(&self.backdrop_fade_start) {
            return Err(invalid("render.backdrop_fade_start", self.backdrop_fade_start).into());
        }

        self.color.resolve()?;
        Ok(())
    }
}

/// Video export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: OutputFormat,

    /// Recording frame rate; also the fixed clock step while recording
    pub fps: u32,

    /// Artifact names are `<prefix>-<style>.<extension>`
    pub file_prefix: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::WebM,
            fps: 60,
            file_prefix: "qr-magic".to_string(),
            quality: 85,
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(invalid("export.fps", self.fps).into());
        }

        if self.quality > 100 {
            return Err(invalid("export.quality", self.quality).into());
        }

        if self.file_prefix.trim().is_empty() || self.file_prefix.contains(['/', '\\']) {
            return Err(invalid("export.file_prefix", &self.file_prefix).into());
        }

        Ok(())
    }
}
