use glam::{Vec2, Vec3};

use crate::particles::{Canvas, Placement, Shape};

/// Smallest `focal + z` denominator; keeps overshooting particles from
/// blowing up when they swing behind the image plane
const MIN_DEPTH: f32 = 1e-3;

/// Pinhole perspective around the canvas center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    focal_length: f32,
    center: Vec2,
}

/// A placement in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    /// Top-left corner in pixels
    pub position: Vec2,
    /// Edge length in pixels after perspective
    pub size: f32,
    pub shape: Shape,
    pub color: Option<[u8; 3]>,
}

impl Projector {
    pub fn new(focal_length: f32, canvas: Canvas) -> Self {
        Self {
            focal_length,
            center: canvas.center(),
        }
    }

    /// Perspective scale at depth `z`
    pub fn scale(&self, z: f32) -> f32 {
        if z == 0.0 {
            return 1.0;
        }
        self.focal_length / (self.focal_length + z).max(MIN_DEPTH)
    }

    /// Screen position and scale of `point`. Points on the image plane map
    /// to themselves.
    pub fn project_point(&self, point: Vec3) -> (Vec2, f32) {
        let scale = self.scale(point.z);
        if scale == 1.0 {
            return (point.truncate(), 1.0);
        }
        (self.center + (point.truncate() - self.center) * scale, scale)
    }

    pub fn project(&self, placement: &Placement) -> Sprite {
        let (position, scale) = self.project_point(placement.position);
        Sprite {
            position,
            size: placement.size * scale,
            shape: placement.shape,
            color: placement.color,
        }
    }
}
