//! # Motion Styles
//!
//! The eight choreographies a reveal can use. Each style is one row of the
//! [`StyleRegistry`] dispatch table: an initializer that decides where a
//! particle starts and when it begins to move, and a transform that places it
//! for a given local time.
//!
//! ## Built-in Styles
//!
//! - **Assemble**: random canvas positions, exponential settle
//! - **Elastic** / **Vortex**: in from the edges, springy or smooth
//! - **Galactic**: spiral in from a distant ring
//! - **Glitch**: jitter and flicker around the target
//! - **Liquid**: wavy bottom-up flow
//! - **Scanwave**: top-down scan line with a white flash
//! - **Stipple**: dive in from deep space with a 3D shimmer
//!
//! ## Usage
//!
//! ```rust
//! use particle_reveal::styles::{MotionStyle, StyleRegistry};
//!
//! let registry = StyleRegistry::new();
//! let galactic = registry.get(MotionStyle::Galactic).unwrap();
//! assert_eq!(galactic.style.name(), "galactic");
//! ```

pub mod easing;
pub mod registry;
pub mod traits;

mod assemble;
mod edge;
mod galactic;
mod glitch;
mod liquid;
mod scanwave;
mod stipple;

pub use easing::Easing;
pub use galactic::spiral_angle;
pub use glitch::GLITCH_CLEAR_ALPHA;
pub use registry::StyleRegistry;
pub use traits::{
    interpolate, mix, DepthRange, KinematicsTuning, Motion, MotionContext, MotionStyle, Spawn,
    SpawnContext, StyleEntry,
};
