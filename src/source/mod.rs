//! # Point Sources
//!
//! A point source turns an image into the ordered foreground points the
//! particle field is built from. The order is row-major and stable for a
//! given image, canvas and stride.
//!
//! A source may also offer a backdrop: the whole picture at canvas size,
//! foreground bright on black, which the compositor tints with the particle
//! fill and lays under the particles so the result stays scannable.

pub mod image;

pub use self::image::{ImagePointSource, ALPHA_THRESHOLD, LUMA_THRESHOLD};

use crate::{error::Result, particles::Point, render::Frame};

pub trait PointSource {
    /// Sample the source on a `width × height` canvas, keeping at most one
    /// point per `stride × stride` cell.
    fn sample(&self, width: u32, height: u32, stride: u32) -> Result<Vec<Point>>;

    /// The backdrop at `width × height`, if the source has a picture
    fn backdrop(&self, _width: u32, _height: u32) -> Result<Option<Frame>> {
        Ok(None)
    }
}

/// Points that were sampled elsewhere; returned as they are
impl PointSource for Vec<Point> {
    fn sample(&self, _width: u32, _height: u32, _stride: u32) -> Result<Vec<Point>> {
        Ok(self.clone())
    }
}
