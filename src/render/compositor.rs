use tracing::debug;

use crate::{
    config::RenderConfig,
    error::Result,
    particles::{Canvas, Placement, Shape},
    render::{
        paint::{Blend, Fill, Rgb},
        projector::{Projector, Sprite},
        surface::Frame,
    },
    styles::StyleEntry,
};

/// Strongest trail clear, used when trails are off
pub const MAX_CLEAR_ALPHA: f32 = 0.4;

/// How much trail persistence reduces the clear alpha
const TRAIL_RESPONSE: f32 = 0.38;

/// Alpha of the black fill that fades the previous frame
///
/// Never drops below `floor`, so full persistence still lets trails die.
pub fn clear_alpha(trail_persistence: f32, floor: f32) -> f32 {
    (MAX_CLEAR_ALPHA - trail_persistence * TRAIL_RESPONSE)
        .max(floor)
        .min(MAX_CLEAR_ALPHA)
}

/// Draws projected particles onto a [`Frame`]
///
/// Built once per session from a frozen configuration. The settled frame of
/// an animation and [`Compositor::static_render`] are the same picture, so
/// handing off from one to the other does not flicker.
#[derive(Debug, Clone)]
pub struct Compositor {
    fill: Fill,
    blend: Blend,
    clear_alpha: f32,
    visibility_floor: f32,
    circle_threshold: f32,
    projector: Projector,
    canvas: Canvas,
    /// Source picture tinted with the fill
    backdrop: Option<Frame>,
    /// Zero when the backdrop is off
    backdrop_alpha: f32,
    backdrop_fade_start: f32,
}

impl Compositor {
    pub fn new(render: &RenderConfig, entry: &StyleEntry) -> Result<Self> {
        let canvas = Canvas::new(render.width, render.height);
        let clear_alpha = entry
            .clear_alpha
            .unwrap_or_else(|| clear_alpha(render.trail_persistence, render.clear_alpha_floor));

        let compositor = Self {
            fill: render.color.resolve()?,
            blend: Blend::from_glow(render.glow_intensity),
            clear_alpha,
            visibility_floor: render.visibility_floor,
            circle_threshold: render.circle_threshold,
            projector: Projector::new(render.focal_length, canvas),
            canvas,
            backdrop: None,
            backdrop_alpha: if render.backdrop { render.backdrop_alpha } else { 0.0 },
            backdrop_fade_start: render.backdrop_fade_start,
        };

        debug!(
            "Compositor for {}: clear alpha {:.3}, blend {:?}, fill {:?}",
            entry.style, compositor.clear_alpha, compositor.blend, compositor.fill
        );
        Ok(compositor)
    }

    /// Attach the source backdrop, tinted with the particle fill
    ///
    /// Skipped when the backdrop is off or does not match the canvas.
    pub fn with_backdrop(mut self, backdrop: Option<&Frame>) -> Self {
        self.backdrop = match backdrop {
            Some(_) if self.backdrop_alpha <= 0.0 => None,
            Some(picture)
                if picture.width() as f32 == self.canvas.width
                    && picture.height() as f32 == self.canvas.height =>
            {
                Some(tint(picture, self.fill, self.canvas))
            }
            Some(picture) => {
                debug!(
                    "Backdrop is {}x{}, canvas is {}x{}; skipped",
                    picture.width(),
                    picture.height(),
                    self.canvas.width,
                    self.canvas.height
                );
                None
            }
            None => None,
        };
        self
    }

    pub fn clear_alpha(&self) -> f32 {
        self.clear_alpha
    }

    /// Backdrop opacity at `progress`: nothing before the fade start, then a
    /// linear rise to the settled opacity at progress 1
    pub fn backdrop_alpha_at(&self, progress: f32) -> f32 {
        if progress <= self.backdrop_fade_start {
            return 0.0;
        }
        let ramp = (progress - self.backdrop_fade_start) / (1.0 - self.backdrop_fade_start);
        self.backdrop_alpha * ramp.min(1.0)
    }

    /// Composite one animation frame: fade the previous one, lay the backdrop
    /// once it is fading in, then draw every visible placement through the
    /// projector.
    pub fn draw_frame(&self, frame: &mut Frame, placements: &[Placement], progress: f32) {
        frame.fade(self.clear_alpha);
        self.draw_backdrop(frame, self.backdrop_alpha_at(progress));
        for placement in placements {
            let sprite = self.projector.project(placement);
            self.draw_sprite(frame, &sprite);
        }
    }

    /// Draw every placement at rest on a cleared frame over the settled
    /// backdrop, without perspective or trails.
    pub fn static_render<I>(&self, frame: &mut Frame, placements: I)
    where
        I: IntoIterator<Item = Placement>,
    {
        frame.clear();
        self.draw_backdrop(frame, self.backdrop_alpha);
        for placement in placements {
            let sprite = Sprite {
                position: placement.position.truncate(),
                size: placement.size,
                shape: placement.shape,
                color: placement.color,
            };
            self.draw_sprite(frame, &sprite);
        }
    }

    fn draw_backdrop(&self, frame: &mut Frame, alpha: f32) {
        if let Some(backdrop) = &self.backdrop {
            frame.blend_over(backdrop, alpha);
        }
    }

    fn draw_sprite(&self, frame: &mut Frame, sprite: &Sprite) {
        if sprite.size.is_nan() || sprite.size < self.visibility_floor {
            return;
        }

        let width = frame.width() as i64;
        let height = frame.height() as i64;
        let (x0, y0) = (sprite.position.x, sprite.position.y);
        let size = sprite.size;

        let min_x = (x0.floor() as i64).max(0);
        let min_y = (y0.floor() as i64).max(0);
        let max_x = ((x0 + size).ceil() as i64).min(width);
        let max_y = ((y0 + size).ceil() as i64).min(height);
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        let round = sprite.shape == Shape::Circle && size >= self.circle_threshold;
        let radius = size / 2.0;
        let (cx, cy) = (x0 + radius, y0 + radius);

        for py in min_y..max_y {
            for px in min_x..max_x {
                let coverage = if round {
                    let dx = px as f32 + 0.5 - cx;
                    let dy = py as f32 + 0.5 - cy;
                    (radius + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0)
                } else {
                    overlap(px as f32, x0, size) * overlap(py as f32, y0, size)
                };
                if coverage <= 0.0 {
                    continue;
                }

                let color = sprite.color.unwrap_or_else(|| {
                    self.fill.color_at(
                        px as f32 + 0.5,
                        py as f32 + 0.5,
                        self.canvas.width,
                        self.canvas.height,
                    )
                });
                self.blend
                    .apply(frame.get_pixel_mut(px as u32, py as u32), color, coverage);
            }
        }
    }
}

/// Multiply `picture` by the fill, pixel by pixel
fn tint(picture: &Frame, fill: Fill, canvas: Canvas) -> Frame {
    let multiply = |a: u8, b: u8| ((a as u32 * b as u32 + 127) / 255) as u8;
    picture.map_pixels(|x, y, [r, g, b]| {
        let color: Rgb = fill.color_at(x as f32 + 0.5, y as f32 + 0.5, canvas.width, canvas.height);
        [multiply(r, color[0]), multiply(g, color[1]), multiply(b, color[2])]
    })
}

/// Length of the overlap between pixel `[p, p + 1)` and span `[start, start + len)`
fn overlap(p: f32, start: f32, len: f32) -> f32 {
    ((p + 1.0).min(start + len) - p.max(start)).max(0.0)
}
