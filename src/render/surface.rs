use image::{ImageBuffer, Rgb, RgbImage};
use rayon::prelude::*;

/// The raster surface particles are composited onto
///
/// A thin wrapper around an RGB image buffer with the operations the
/// compositor and the exporters need.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame with the given dimensions filled with black
    pub fn new_black(width: u32, height: u32) -> Self {
        Self {
            buffer: ImageBuffer::new(width, height),
        }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        Self {
            buffer: ImageBuffer::from_pixel(width, height, Rgb(color)),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    pub fn get_pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        &mut self.buffer.get_pixel_mut(x, y).0
    }

    /// Reset every pixel to black
    pub fn clear(&mut self) {
        let raw: &mut [u8] = &mut self.buffer;
        raw.fill(0);
    }

    /// Paint black over the whole frame at `alpha`
    ///
    /// Channels are floored after scaling, so any non-zero alpha strictly
    /// darkens every lit pixel and trails always die out.
    pub fn fade(&mut self, alpha: f32) {
        let keep = (1.0 - alpha).clamp(0.0, 1.0);
        if keep >= 1.0 {
            return;
        }
        let row_len = (self.buffer.width() * 3).max(1) as usize;
        let raw: &mut [u8] = &mut self.buffer;
        raw.par_chunks_mut(row_len).for_each(|row| {
            for channel in row.iter_mut() {
                *channel = (*channel as f32 * keep).floor() as u8;
            }
        });
    }

    /// Paint `top` over the frame at `alpha`
    ///
    /// A `top` of another size leaves the frame untouched.
    pub fn blend_over(&mut self, top: &Frame, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 || self.buffer.dimensions() != top.buffer.dimensions() {
            return;
        }
        let row_len = (self.buffer.width() * 3).max(1) as usize;
        let raw: &mut [u8] = &mut self.buffer;
        raw.par_chunks_mut(row_len)
            .zip(top.buffer.as_raw().par_chunks(row_len))
            .for_each(|(row, over)| {
                for (dst, &src) in row.iter_mut().zip(over) {
                    *dst = (*dst as f32 + (src as f32 - *dst as f32) * alpha).round() as u8;
                }
            });
    }

    /// A new frame with `f(x, y, pixel)` applied to every pixel
    pub fn map_pixels<F>(&self, f: F) -> Frame
    where
        F: Fn(u32, u32, [u8; 3]) -> [u8; 3] + Sync,
    {
        let mut out = self.clone();
        let row_len = (out.buffer.width() * 3).max(1) as usize;
        let raw: &mut [u8] = &mut out.buffer;
        raw.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
            for (x, pixel) in row.chunks_exact_mut(3).enumerate() {
                let mapped = f(x as u32, y as u32, [pixel[0], pixel[1], pixel[2]]);
                pixel.copy_from_slice(&mapped);
            }
        });
        out
    }

    /// True when every pixel is black
    pub fn is_black(&self) -> bool {
        self.buffer.as_raw().iter().all(|&c| c == 0)
    }

    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.buffer.as_raw().clone()
    }

    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_always_darkens() {
        let mut frame = Frame::new_filled(4, 3, [255, 10, 1]);
        frame.fade(0.02);
        assert_eq!(frame.get_pixel(2, 1), [249, 9, 0]);

        for _ in 0..400 {
            frame.fade(0.02);
        }
        assert!(frame.is_black());
    }

    #[test]
    fn test_zero_alpha_fade_is_noop() {
        let mut frame = Frame::new_filled(2, 2, [7, 8, 9]);
        frame.fade(0.0);
        assert_eq!(frame, Frame::new_filled(2, 2, [7, 8, 9]));
    }

    #[test]
    fn test_blend_over() {
        let mut frame = Frame::new_filled(3, 2, [100, 0, 200]);
        frame.blend_over(&Frame::new_filled(3, 2, [200, 50, 0]), 0.5);
        assert_eq!(frame.get_pixel(1, 1), [150, 25, 100]);

        // Wrong size or no opacity: untouched
        frame.blend_over(&Frame::new_filled(2, 2, [0, 0, 0]), 1.0);
        frame.blend_over(&Frame::new_black(3, 2), 0.0);
        assert_eq!(frame.get_pixel(0, 0), [150, 25, 100]);

        frame.blend_over(&Frame::new_black(3, 2), 1.0);
        assert!(frame.is_black());
    }

    #[test]
    fn test_map_pixels_sees_coordinates() {
        let frame = Frame::new_filled(4, 3, [10, 20, 30]);
        let mapped = frame.map_pixels(|x, y, [r, g, b]| [r + x as u8, g + y as u8, b]);
        assert_eq!(mapped.get_pixel(3, 2), [13, 22, 30]);
        assert_eq!(mapped.get_pixel(0, 0), [10, 20, 30]);
        assert_eq!(frame.get_pixel(3, 2), [10, 20, 30]);
    }

    #[test]
    fn test_clear_and_raw_bytes() {
        let mut frame = Frame::new_filled(3, 2, [1, 2, 3]);
        assert_eq!(frame.to_rgb_bytes(), [1, 2, 3].repeat(6));

        frame.clear();
        assert!(frame.is_black());
        assert_eq!(frame.as_rgb_bytes().len(), 18);
    }
}
