//! # Particle-Reveal
//!
//! Turn a still image into a short animated particle "reveal", previewed live
//! or exported to WebM, MP4 or GIF.
//!
//! The image becomes a cloud of foreground points. Each point gets a particle
//! that flies in along one of eight choreographies and settles exactly on its
//! point, so the last frame shows the image again.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use particle_reveal::{
//!     config::Config,
//!     session::{run_export, DriveOutcome, RevealEngine},
//!     source::ImagePointSource,
//!     styles::MotionStyle,
//!     video::OutputFormat,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let mut config = Config::default();
//! config.animation.style = MotionStyle::Galactic;
//!
//! let mut engine = RevealEngine::new(config)?;
//! engine.load_source(ImagePointSource::open("qr.png")?)?;
//!
//! let (_cancel, cancelled) = tokio::sync::watch::channel(false);
//! if let DriveOutcome::Exported(artifact) =
//!     run_export(&mut engine, OutputFormat::Gif, cancelled).await?
//! {
//!     artifact.save_to(".")?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`source`] - Point sampling from images
//! - [`particles`] - The particle arena and per-frame kinematics
//! - [`styles`] - Motion styles, easing and the style dispatch table
//! - [`render`] - Projection and compositing onto a raster frame
//! - [`session`] - Preview/export state machine and frame loops
//! - [`video`] - Video sinks and export artifacts
//! - [`config`] - Configuration management

pub mod config;
pub mod error;
pub mod particles;
pub mod render;
pub mod session;
pub mod source;
pub mod styles;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{Result, RevealError},
    session::{AnimationStatus, RevealEngine},
    styles::{MotionStyle, StyleRegistry},
    video::{ExportArtifact, OutputFormat},
};
