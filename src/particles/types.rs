use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// A foreground sample produced by a point source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,

    /// Color of the sampled pixel, if the source recorded one
    pub color: Option<[u8; 3]>,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, color: None }
    }

    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = Some(color);
        self
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Rendered particle outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Square,
    Circle,
}

/// How shapes are assigned when the field is reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeMode {
    Square,
    Circle,
    /// Coin flip per particle
    Mixed,
}

impl Default for ShapeMode {
    fn default() -> Self {
        ShapeMode::Square
    }
}

/// One record of the particle arena
///
/// Particles have no identity beyond their index in the field and never
/// outlive a reset.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub start: Vec3,
    pub current: Vec3,
    /// Always on the image plane (`z = 0`)
    pub target: Vec3,

    /// `density × size multiplier`
    pub base_size: f32,
    /// Drawn once per reset from `[1 - variance/2, 1 + variance/2]`
    pub size_variation: f32,

    /// Normalized stagger offset; stable for the lifetime of the record
    pub delay: f32,
    pub shape: Shape,
    pub color: Option<[u8; 3]>,
}

impl Particle {
    /// Unprojected draw size in pixels
    pub fn size(&self) -> f32 {
        self.base_size * self.size_variation
    }
}

/// Canvas dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Distance from the center to a corner
    pub fn half_diagonal(&self) -> f32 {
        self.center().length()
    }

    /// Distance of `point` from the center, scaled so corners map to 1.0
    pub fn normalized_distance(&self, point: Vec2) -> f32 {
        let radius = self.half_diagonal();
        if radius <= 0.0 {
            return 0.0;
        }
        point.distance(self.center()) / radius
    }
}
