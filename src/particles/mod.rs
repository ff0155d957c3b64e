//! # Particles
//!
//! The particle arena and the per-frame kinematics that move it.

pub mod field;
pub mod kinematics;
pub mod types;

pub use field::ParticleField;
pub use kinematics::{local_time, FrameTime, Placement};
pub use types::{Canvas, Particle, Point, Shape, ShapeMode};
