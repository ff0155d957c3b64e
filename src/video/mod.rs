//! # Video Export
//!
//! Two [`VideoSink`] paths share one trait:
//!
//! - [`Mp4Encoder`] encodes every frame as it is produced (H.264 in MP4).
//! - [`StreamRecorder`] captures compressed chunks and builds the container
//!   when the recording stops (WebM or GIF).
//!
//! Both need `ffmpeg` on the `PATH` except for GIF, which is pure Rust.

pub mod encoder;
pub mod ffmpeg;
pub mod recorder;
pub mod sink;
pub mod types;

pub use encoder::Mp4Encoder;
pub use ffmpeg::has_encoder;
pub use recorder::StreamRecorder;
pub use sink::{open_sink, VideoSink};
pub use types::{artifact_name, EncodeParams, ExportArtifact, OutputFormat};
