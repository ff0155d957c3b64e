//! Stream capture sink.
//!
//! Frames are compressed to PNG chunks as they arrive and kept in memory. The
//! container is only built when the recording stops: WebM through ffmpeg's
//! VP9 (or VP8) encoder, GIF through the `gif` crate with per-frame delays
//! taken from the frame timestamps.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    error::{ExportError, Result, RevealError},
    render::Frame,
    video::{
        ffmpeg::{self, FfmpegProcess},
        sink::VideoSink,
        types::{EncodeParams, OutputFormat},
    },
};

/// WebM encoders in order of preference
const WEBM_ENCODERS: [&str; 2] = ["libvpx-vp9", "libvpx"];

const WEBM_BITRATE: &str = "12M";

/// NeuQuant sampling factor, 1 (best) to 30 (fastest)
const GIF_QUANTIZE_SPEED: i32 = 10;

/// Shortest frame delay most GIF players honor, in centiseconds. Browsers
/// slow anything shorter down to a tenth of a second.
const GIF_MIN_DELAY: u16 = 2;

pub struct StreamRecorder {
    format: OutputFormat,
    params: EncodeParams,
    /// Chosen at open so a missing codec fails before recording starts
    webm_encoder: Option<&'static str>,
    chunks: Vec<Vec<u8>>,
    /// Logical time of each chunk in milliseconds
    timestamps: Vec<f64>,
}

impl StreamRecorder {
    pub fn open(format: OutputFormat, params: EncodeParams) -> Result<Self> {
        let webm_encoder = match format {
            OutputFormat::WebM => {
                let encoder = WEBM_ENCODERS
                    .into_iter()
                    .find(|encoder| ffmpeg::has_encoder(encoder))
                    .ok_or_else(|| ExportError::UnsupportedCodec {
                        format: format.to_string(),
                        codec: WEBM_ENCODERS.join(" or "),
                    })?;
                debug!("Using {} for WebM", encoder);
                Some(encoder)
            }
            OutputFormat::Gif => {
                if params.width > u16::MAX as u32 || params.height > u16::MAX as u32 {
                    return Err(ExportError::EncoderInitFailure {
                        reason: format!("{}x{} is too large for GIF", params.width, params.height),
                    }
                    .into());
                }
                None
            }
            OutputFormat::Mp4 => {
                return Err(ExportError::EncoderInitFailure {
                    reason: "MP4 is encoded incrementally, not captured".to_string(),
                }
                .into());
            }
        };

        Ok(Self {
            format,
            params,
            webm_encoder,
            chunks: Vec::new(),
            timestamps: Vec::new(),
        })
    }

    fn finish_webm(&self, encoder: &str) -> Result<Vec<u8>> {
        let input = vec![
            "-f".to_string(),
            "image2pipe".to_string(),
            "-c:v".to_string(),
            "png".to_string(),
            "-framerate".to_string(),
            self.params.fps.to_string(),
        ];
        let output = vec![
            "-c:v".to_string(),
            encoder.to_string(),
            "-b:v".to_string(),
            WEBM_BITRATE.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-f".to_string(),
            "webm".to_string(),
        ];

        let mut process = FfmpegProcess::spawn(&input, &output, OutputFormat::WebM.extension())?;
        for (index, chunk) in self.chunks.iter().enumerate() {
            process.write(index, chunk)?;
        }
        process.finish()
    }

    fn finish_gif(&self) -> Result<Vec<u8>> {
        let width = self.params.width as u16;
        let height = self.params.height as u16;
        let schedule = gif_schedule(&self.timestamps, self.params.frame_interval_ms());
        debug!(
            "GIF keeps {} of {} frames",
            schedule.len(),
            self.chunks.len()
        );

        // Quantization dominates; do it in parallel, then write in order
        let frames = schedule
            .par_iter()
            .map(|&(index, delay)| {
                let rgb = decode_chunk(index, &self.chunks[index])?;
                let mut frame = gif::Frame::from_rgb_speed(width, height, &rgb, GIF_QUANTIZE_SPEED);
                frame.delay = delay;
                Ok(frame)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut bytes = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut bytes, width, height, &[]).map_err(mux_error)?;
            encoder.set_repeat(gif::Repeat::Infinite).map_err(mux_error)?;
            for frame in &frames {
                encoder.write_frame(frame).map_err(mux_error)?;
            }
        }
        Ok(bytes)
    }
}

impl VideoSink for StreamRecorder {
    fn format(&self) -> OutputFormat {
        self.format
    }

    fn push_frame(&mut self, frame: &Frame, time_ms: f64) -> Result<()> {
        let index = self.chunks.len();
        if frame.width() != self.params.width || frame.height() != self.params.height {
            return Err(ExportError::EncodeFailure {
                frame: index,
                reason: format!(
                    "frame is {}x{}, recorder expects {}x{}",
                    frame.width(),
                    frame.height(),
                    self.params.width,
                    self.params.height
                ),
            }
            .into());
        }

        self.chunks.push(encode_chunk(index, frame)?);
        self.timestamps.push(time_ms);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        let captured: usize = self.chunks.iter().map(Vec::len).sum();
        debug!(
            "Finalizing {} from {} chunks ({} bytes captured)",
            self.format,
            self.chunks.len(),
            captured
        );

        let bytes = match self.webm_encoder {
            Some(encoder) => self.finish_webm(encoder)?,
            None => self.finish_gif()?,
        };

        info!(
            "Finalized {}: {} frames, {} bytes",
            self.format,
            self.chunks.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    fn abort(self: Box<Self>) {
        debug!("Discarding {} captured chunks", self.chunks.len());
    }

    fn frames_written(&self) -> usize {
        self.chunks.len()
    }
}

/// Pick the captured frames a GIF can show and how long each stays up
///
/// Delays are differences of the frame times rounded to centiseconds, so they
/// add up to the recorded span instead of drifting by a rounding error per
/// frame. Frames that would stay up for less than [`GIF_MIN_DELAY`] are
/// dropped. The last frame is always shown and held for one frame interval.
fn gif_schedule(timestamps: &[f64], interval_ms: f64) -> Vec<(usize, u16)> {
    let to_centis = |ms: f64| (ms.max(0.0) / 10.0).round() as u64;
    let min_delay = GIF_MIN_DELAY as u64;

    let mut kept: Vec<(usize, u64)> = Vec::with_capacity(timestamps.len());
    for (index, &time) in timestamps.iter().enumerate() {
        let start = to_centis(time);
        match kept.last() {
            Some(&(_, previous)) if start < previous + min_delay => {}
            _ => kept.push((index, start)),
        }
    }
    if let (Some(last), Some(final_index)) = (kept.last_mut(), timestamps.len().checked_sub(1)) {
        last.0 = final_index;
    }

    let hold = to_centis(interval_ms).max(min_delay);
    kept.iter()
        .enumerate()
        .map(|(slot, &(index, start))| {
            let delay = kept.get(slot + 1).map_or(hold, |&(_, next)| next - start);
            (index, delay.min(u16::MAX as u64) as u16)
        })
        .collect()
}

fn encode_chunk(index: usize, frame: &Frame) -> Result<Vec<u8>> {
    let encode_error = |e: png::EncodingError| -> RevealError {
        ExportError::EncodeFailure {
            frame: index,
            reason: e.to_string(),
        }
        .into()
    };

    let mut chunk = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut chunk, frame.width(), frame.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);

        let mut writer = encoder.write_header().map_err(encode_error)?;
        writer
            .write_image_data(frame.as_rgb_bytes())
            .map_err(encode_error)?;
        writer.finish().map_err(encode_error)?;
    }
    Ok(chunk)
}

fn decode_chunk(index: usize, chunk: &[u8]) -> Result<Vec<u8>> {
    let decode_error = |e: png::DecodingError| -> RevealError {
        ExportError::MuxFinalizeFailure {
            reason: format!("captured chunk {} is unreadable: {}", index, e),
        }
        .into()
    };

    let decoder = png::Decoder::new(chunk);
    let mut reader = decoder.read_info().map_err(decode_error)?;
    let mut rgb = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut rgb).map_err(decode_error)?;
    rgb.truncate(info.buffer_size());
    Ok(rgb)
}

fn mux_error(e: gif::EncodingError) -> RevealError {
    ExportError::MuxFinalizeFailure {
        reason: format!("GIF encoding failed: {}", e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(width: u32, height: u32) -> EncodeParams {
        EncodeParams {
            width,
            height,
            fps: 60,
            quality: 85,
        }
    }

    #[test]
    fn test_chunks_are_lossless() {
        let mut frame = Frame::new_black(5, 3);
        frame.get_pixel_mut(2, 1).copy_from_slice(&[9, 99, 199]);

        let chunk = encode_chunk(0, &frame).unwrap();
        assert_eq!(decode_chunk(0, &chunk).unwrap(), frame.to_rgb_bytes());
    }

    #[test]
    fn test_gif_decodes_back() {
        let mut recorder = Box::new(StreamRecorder::open(OutputFormat::Gif, params(6, 4)).unwrap());
        for (i, shade) in [0u8, 128, 255].into_iter().enumerate() {
            recorder
                .push_frame(&Frame::new_filled(6, 4, [shade; 3]), i as f64 * 20.0)
                .unwrap();
        }
        let bytes = recorder.finish().unwrap();

        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = options.read_info(bytes.as_slice()).unwrap();
        assert_eq!(decoder.width(), 6);
        assert_eq!(decoder.height(), 4);

        let mut count = 0;
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            assert_eq!(frame.delay, GIF_MIN_DELAY);
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn test_gif_delays_add_up_to_the_animation() {
        // 2500 ms at 60 fps: frames 0..=150 and a closing keyframe, both of
        // the last two at exactly 2500 ms
        let interval = params(4, 4).frame_interval_ms();
        let timestamps: Vec<f64> = (0..=151).map(|k| (k as f64 * interval).min(2500.0)).collect();

        let schedule = gif_schedule(&timestamps, interval);
        let total_ms: u64 = schedule.iter().map(|&(_, delay)| delay as u64 * 10).sum();

        assert!(
            total_ms.abs_diff(2500) <= 20,
            "GIF plays for {} ms instead of 2500",
            total_ms
        );
        assert!(schedule.iter().all(|&(_, delay)| delay >= GIF_MIN_DELAY));
        assert!(schedule.windows(2).all(|pair| pair[0].0 < pair[1].0));
        assert_eq!(schedule.first().map(|s| s.0), Some(0));
        assert_eq!(schedule.last().map(|s| s.0), Some(151));
    }

    #[test]
    fn test_gif_schedule_at_native_rate_keeps_every_frame() {
        let timestamps = [0.0, 40.0, 80.0, 120.0];
        let schedule = gif_schedule(&timestamps, 40.0);
        assert_eq!(schedule, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
        assert!(gif_schedule(&[], 40.0).is_empty());
    }

    #[test]
    fn test_mp4_is_not_captured() {
        assert!(StreamRecorder::open(OutputFormat::Mp4, params(4, 4)).is_err());
    }

    #[test]
    fn test_webm_when_available() {
        if !WEBM_ENCODERS.iter().any(|encoder| ffmpeg::has_encoder(encoder)) {
            println!("Skipping: no VP9/VP8 encoder available");
            return;
        }

        let mut recorder = Box::new(StreamRecorder::open(OutputFormat::WebM, params(16, 16)).unwrap());
        for i in 0..6u8 {
            recorder
                .push_frame(&Frame::new_filled(16, 16, [i * 40, 10, 10]), i as f64 * 1000.0 / 60.0)
                .unwrap();
        }
        let bytes = recorder.finish().unwrap();
        // EBML magic
        assert_eq!(&bytes[..4], &[0x1a, 0x45, 0xdf, 0xa3]);
    }
}
