//! # Rendering
//!
//! Perspective projection and compositing of particles onto the raster
//! surface.

pub mod compositor;
pub mod paint;
pub mod projector;
pub mod surface;

pub use compositor::{clear_alpha, Compositor};
pub use paint::{Blend, BlendMode, ColorMode, ColorSpec, Fill, Rgb};
pub use projector::{Projector, Sprite};
pub use surface::Frame;
