use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{ConfigError, RevealError, Result},
    styles::MotionStyle,
};

/// Container formats an export can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// VP9 (or VP8) WebM from captured chunks
    WebM,
    /// H.264 MP4 encoded frame by frame
    Mp4,
    /// Looping animated GIF from captured chunks
    Gif,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::WebM, OutputFormat::Mp4, OutputFormat::Gif];

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::WebM => "webm",
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Gif => "gif",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::WebM => "video/webm",
            OutputFormat::Mp4 => "video/mp4",
            OutputFormat::Gif => "image/gif",
        }
    }

    /// Whether frames are encoded as they are produced rather than captured
    /// and finalized on stop
    pub fn is_incremental(self) -> bool {
        matches!(self, OutputFormat::Mp4)
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::WebM
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

impl FromStr for OutputFormat {
    type Err = RevealError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('.').to_lowercase();
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.extension() == wanted)
            .ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: "export.format".to_string(),
                    value: s.to_string(),
                }
                .into()
            })
    }
}

/// Encoder parameters, fixed for the lifetime of a sink
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeParams {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Quality setting (0-100, higher is better)
    pub quality: u8,
}

impl EncodeParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            width: config.render.width,
            height: config.render.height,
            fps: config.export.fps,
            quality: config.export.quality,
        }
    }

    /// Duration of one frame in milliseconds
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.fps as f64
    }

    /// Bytes in one packed RGB frame
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    pub(crate) fn quality_to_crf(&self) -> u8 {
        (51 - ((self.quality as f32 / 100.0) * 51.0) as u8).clamp(0, 51)
    }
}

/// A finished export, held in memory until the caller saves it
#[derive(Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
    pub frame_count: usize,
}

impl ExportArtifact {
    pub fn new(prefix: &str, style: MotionStyle, format: OutputFormat, bytes: Vec<u8>, frame_count: usize) -> Self {
        Self {
            file_name: artifact_name(prefix, style, format),
            format,
            bytes,
            frame_count,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the artifact into `dir` under its own file name
    pub fn save_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

impl fmt::Debug for ExportArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportArtifact")
            .field("file_name", &self.file_name)
            .field("format", &self.format)
            .field("bytes", &self.bytes.len())
            .field("frame_count", &self.frame_count)
            .finish()
    }
}

/// `<prefix>-<style>.<extension>`, style in lowercase
pub fn artifact_name(prefix: &str, style: MotionStyle, format: OutputFormat) -> String {
    format!("{}-{}.{}", prefix, style.name(), format.extension())
}
