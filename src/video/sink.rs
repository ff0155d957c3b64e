use tracing::info;

use crate::{
    error::Result,
    render::Frame,
    video::{
        encoder::Mp4Encoder,
        recorder::StreamRecorder,
        types::{EncodeParams, OutputFormat},
    },
};

/// Destination of the frames of one recording session
///
/// Frames arrive in order, exactly once each, stamped with their logical
/// time. Constant-rate containers may ignore the stamp: the recording clock
/// spaces frames one interval apart. A sink is consumed either by
/// [`VideoSink::finish`], which yields the container bytes, or by
/// [`VideoSink::abort`], which releases everything it holds.
pub trait VideoSink: Send {
    fn format(&self) -> OutputFormat;

    fn push_frame(&mut self, frame: &Frame, time_ms: f64) -> Result<()>;

    fn finish(self: Box<Self>) -> Result<Vec<u8>>;

    fn abort(self: Box<Self>);

    fn frames_written(&self) -> usize;
}

/// Open the sink for `format`
///
/// MP4 goes through the incremental encoder, everything else through the
/// stream recorder. A missing codec fails here, before any frame is drawn.
pub fn open_sink(format: OutputFormat, params: EncodeParams) -> Result<Box<dyn VideoSink>> {
    let sink: Box<dyn VideoSink> = if format.is_incremental() {
        Box::new(Mp4Encoder::open(params)?)
    } else {
        Box::new(StreamRecorder::open(format, params)?)
    };

    info!(
        "Opened {} sink for {}x{} at {} fps",
        format, params.width, params.height, params.fps
    );
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gif_sink_roundtrip() {
        let params = EncodeParams {
            width: 8,
            height: 6,
            fps: 60,
            quality: 85,
        };
        let mut sink = open_sink(OutputFormat::Gif, params).unwrap();
        assert_eq!(sink.format(), OutputFormat::Gif);

        sink.push_frame(&Frame::new_black(8, 6), 0.0).unwrap();
        sink.push_frame(&Frame::new_filled(8, 6, [200, 40, 10]), 20.0).unwrap();
        assert_eq!(sink.frames_written(), 2);

        let bytes = sink.finish().unwrap();
        assert!(bytes.starts_with(b"GIF89a"));
    }

    #[test]
    fn test_mismatched_frame_is_rejected() {
        let params = EncodeParams {
            width: 8,
            height: 6,
            fps: 60,
            quality: 85,
        };
        let mut sink = open_sink(OutputFormat::Gif, params).unwrap();
        assert!(sink.push_frame(&Frame::new_black(4, 4), 0.0).is_err());
        sink.abort();
    }
}
