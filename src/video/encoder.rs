use tracing::{debug, info};

use crate::{
    error::{ExportError, Result},
    render::Frame,
    video::{
        ffmpeg::{self, FfmpegProcess},
        sink::VideoSink,
        types::{EncodeParams, OutputFormat},
    },
};

const H264_ENCODER: &str = "libx264";

/// Incremental H.264/MP4 encoder
///
/// Every frame is handed to the encoder as soon as it is pushed; nothing is
/// buffered on this side beyond the pipe.
pub struct Mp4Encoder {
    params: EncodeParams,
    process: FfmpegProcess,
    frames: usize,
}

impl Mp4Encoder {
    pub fn open(params: EncodeParams) -> Result<Self> {
        if !ffmpeg::has_encoder(H264_ENCODER) {
            return Err(ExportError::UnsupportedCodec {
                format: OutputFormat::Mp4.to_string(),
                codec: H264_ENCODER.to_string(),
            }
            .into());
        }

        // yuv420p needs even dimensions
        if params.width % 2 != 0 || params.height % 2 != 0 {
            return Err(ExportError::EncoderInitFailure {
                reason: format!(
                    "H.264 needs even dimensions, got {}x{}",
                    params.width, params.height
                ),
            }
            .into());
        }

        let input = vec![
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            "rgb24".to_string(),
            "-s".to_string(),
            format!("{}x{}", params.width, params.height),
            "-r".to_string(),
            params.fps.to_string(),
        ];
        let output = vec![
            "-c:v".to_string(),
            H264_ENCODER.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-crf".to_string(),
            params.quality_to_crf().to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
        ];

        let process = FfmpegProcess::spawn(&input, &output, OutputFormat::Mp4.extension())?;
        debug!("H.264 encoder ready, crf {}", params.quality_to_crf());

        Ok(Self {
            params,
            process,
            frames: 0,
        })
    }
}

impl VideoSink for Mp4Encoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Mp4
    }

    fn push_frame(&mut self, frame: &Frame, _time_ms: f64) -> Result<()> {
        let bytes = frame.as_rgb_bytes();
        // rawvideo has no header; a short write would shear every later frame
        if bytes.len() != self.params.frame_len() {
            return Err(ExportError::EncodeFailure {
                frame: self.frames,
                reason: format!(
                    "frame is {}x{} ({} bytes), encoder expects {}x{} ({} bytes)",
                    frame.width(),
                    frame.height(),
                    bytes.len(),
                    self.params.width,
                    self.params.height,
                    self.params.frame_len()
                ),
            }
            .into());
        }

        self.process.write(self.frames, bytes)?;
        self.frames += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>> {
        let this = *self;
        let bytes = this.process.finish()?;
        info!("Finalized MP4: {} frames, {} bytes", this.frames, bytes.len());
        Ok(bytes)
    }

    fn abort(self: Box<Self>) {
        debug!("Aborting MP4 encoder after {} frames", self.frames);
        // Dropping the process kills it and removes the partial file
    }

    fn frames_written(&self) -> usize {
        self.frames
    }
}
