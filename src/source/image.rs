use std::borrow::Cow;
use std::path::Path;

use image::{imageops::FilterType, DynamicImage, RgbaImage};
use rayon::prelude::*;
use tracing::debug;

use crate::{
    error::{Result, SourceError},
    particles::Point,
    render::Frame,
    source::PointSource,
};

/// Pixels at or below this alpha are background
pub const ALPHA_THRESHOLD: u8 = 128;

/// Pixels whose mean channel value reaches this are background
pub const LUMA_THRESHOLD: u32 = 100;

/// Threshold sampler over a decoded image
///
/// Dark, opaque pixels are foreground, which suits QR codes and line art on
/// a light or transparent background.
#[derive(Debug, Clone)]
pub struct ImagePointSource {
    image: RgbaImage,
}

impl ImagePointSource {
    /// Load a PNG or JPEG file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| SourceError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        debug!("Loaded {:?}: {}x{}", path, image.width(), image.height());
        Ok(Self::from_image(image))
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgba8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The image stretched to the canvas; aspect ratio is not kept
    fn fit(&self, width: u32, height: u32) -> Cow<'_, RgbaImage> {
        if self.image.dimensions() == (width, height) {
            Cow::Borrowed(&self.image)
        } else {
            Cow::Owned(image::imageops::resize(&self.image, width, height, FilterType::Triangle))
        }
    }
}

impl PointSource for ImagePointSource {
    fn sample(&self, width: u32, height: u32, stride: u32) -> Result<Vec<Point>> {
        if stride == 0 {
            return Err(SourceError::InvalidStride { stride }.into());
        }

        let canvas = self.fit(width, height);

        let rows: Vec<u32> = (0..height).step_by(stride as usize).collect();
        let points: Vec<Point> = rows
            .par_iter()
            .map(|&y| {
                (0..width)
                    .step_by(stride as usize)
                    .filter_map(|x| {
                        let [r, g, b, a] = canvas.get_pixel(x, y).0;
                        let mean = (r as u32 + g as u32 + b as u32) / 3;
                        (a > ALPHA_THRESHOLD && mean < LUMA_THRESHOLD)
                            .then(|| Point::new(x as f32, y as f32).with_color([r, g, b]))
                    })
                    .collect::<Vec<_>>()
            })
            .flatten()
            .collect();

        debug!(
            "Sampled {} points at stride {} on a {}x{} canvas",
            points.len(),
            stride,
            width,
            height
        );
        Ok(points)
    }

    /// The image inverted and laid on black: dark foreground turns bright,
    /// light or transparent background goes black.
    fn backdrop(&self, width: u32, height: u32) -> Result<Option<Frame>> {
        let canvas = self.fit(width, height);
        let backdrop = Frame::new_black(width, height).map_pixels(|x, y, _| {
            let [r, g, b, a] = canvas.get_pixel(x, y).0;
            let invert = |c: u8| (((255 - c) as u32 * a as u32 + 127) / 255) as u8;
            [invert(r), invert(g), invert(b)]
        });
        Ok(Some(backdrop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use tempfile::tempdir;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> ImagePointSource {
        ImagePointSource::from_image(DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            width,
            height,
            Rgba(color),
        )))
    }

    #[test]
    fn test_density_scales_point_count_quadratically() {
        let source = solid(120, 120, [0, 0, 0, 255]);

        let fine = source.sample(120, 120, 1).unwrap();
        let coarse = source.sample(120, 120, 6).unwrap();
        assert_eq!(fine.len(), 14_400);
        assert_eq!(fine.len(), coarse.len() * 36);
    }

    #[test]
    fn test_threshold() {
        // Two columns: dark opaque on the left, light on the right, with a
        // transparent dark row at the bottom
        let image = ImageBuffer::from_fn(4, 3, |x, y| {
            if y == 2 {
                Rgba([0, 0, 0, 100])
            } else if x < 2 {
                Rgba([30, 60, 90, 255])
            } else {
                Rgba([200, 200, 200, 255])
            }
        });
        let source = ImagePointSource::from_image(DynamicImage::ImageRgba8(image));

        let points = source.sample(4, 3, 1).unwrap();
        assert_eq!(
            points,
            vec![
                Point::new(0.0, 0.0).with_color([30, 60, 90]),
                Point::new(1.0, 0.0).with_color([30, 60, 90]),
                Point::new(0.0, 1.0).with_color([30, 60, 90]),
                Point::new(1.0, 1.0).with_color([30, 60, 90]),
            ]
        );
    }

    #[test]
    fn test_backdrop_inverts_onto_black() {
        let image = ImageBuffer::from_fn(4, 3, |x, y| {
            if y == 2 {
                Rgba([0, 0, 0, 100])
            } else if x < 2 {
                Rgba([30, 60, 90, 255])
            } else {
                Rgba([200, 200, 200, 255])
            }
        });
        let source = ImagePointSource::from_image(DynamicImage::ImageRgba8(image));

        let backdrop = source.backdrop(4, 3).unwrap().unwrap();
        assert_eq!(backdrop.get_pixel(0, 0), [225, 195, 165]);
        assert_eq!(backdrop.get_pixel(3, 1), [55, 55, 55]);
        // Partly transparent pixels are weighted by their alpha
        assert_eq!(backdrop.get_pixel(1, 2), [100, 100, 100]);

        let resized = source.backdrop(8, 6).unwrap().unwrap();
        assert_eq!((resized.width(), resized.height()), (8, 6));
        assert!(vec![Point::new(1.0, 1.0)].backdrop(4, 3).unwrap().is_none());
    }

    #[test]
    fn test_points_are_row_major() {
        let source = solid(30, 30, [10, 10, 10, 255]);
        let points = source.sample(30, 30, 3).unwrap();

        assert!(points
            .windows(2)
            .all(|pair| (pair[0].y, pair[0].x) < (pair[1].y, pair[1].x)));
    }

    #[test]
    fn test_resize_to_canvas() {
        let source = solid(10, 10, [0, 0, 0, 255]);
        let points = source.sample(60, 40, 10).unwrap();

        assert_eq!(points.len(), 6 * 4);
        assert!(points.iter().all(|p| p.x < 60.0 && p.y < 40.0));
    }

    #[test]
    fn test_zero_stride_is_rejected() {
        let source = solid(4, 4, [0, 0, 0, 255]);
        assert!(matches!(
            source.sample(4, 4, 0),
            Err(crate::error::RevealError::Source(SourceError::InvalidStride { stride: 0 }))
        ));
    }

    #[test]
    fn test_open_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mark.png");
        ImageBuffer::from_pixel(8, 8, Rgba([0u8, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let source = ImagePointSource::open(&path).unwrap();
        assert_eq!((source.width(), source.height()), (8, 8));
        assert_eq!(source.sample(8, 8, 2).unwrap().len(), 16);

        assert!(ImagePointSource::open(dir.path().join("missing.png")).is_err());
    }
}
