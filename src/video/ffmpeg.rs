//! Thin wrapper around an external `ffmpeg` process.
//!
//! The process reads frames on stdin and writes the container to a private
//! temporary file, which is read back into memory on finish.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

use crate::error::{ExportError, Result};

static NEXT_OUTPUT: AtomicUsize = AtomicUsize::new(0);

/// Whether the local ffmpeg build ships `encoder`
///
/// A missing ffmpeg binary counts as a missing encoder.
pub fn has_encoder(encoder: &str) -> bool {
    let output = match Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => return false,
    };

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|name| name == encoder)
}

/// A running encoder process
pub(crate) struct FfmpegProcess {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    output_path: PathBuf,
}

impl FfmpegProcess {
    /// Spawn ffmpeg with `input_args` describing stdin and `output_args`
    /// describing the encode; the output file name is appended last.
    pub(crate) fn spawn(input_args: &[String], output_args: &[String], extension: &str) -> Result<Self> {
        let output_path = std::env::temp_dir().join(format!(
            "temp_particle_reveal_{}_{}.{}",
            std::process::id(),
            NEXT_OUTPUT.fetch_add(1, Ordering::Relaxed),
            extension
        ));

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(input_args)
            .arg("-i")
            .arg("-")
            .args(output_args)
            .arg(&output_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        debug!("Spawning encoder: {:?}", cmd);
        let mut child = cmd.spawn().map_err(|e| ExportError::EncoderInitFailure {
            reason: format!("Failed to spawn FFmpeg process: {}", e),
        })?;

        let stdin = child.stdin.take().ok_or_else(|| ExportError::EncoderInitFailure {
            reason: "FFmpeg stdin is not available".to_string(),
        })?;

        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
            output_path,
        })
    }

    pub(crate) fn write(&mut self, frame: usize, bytes: &[u8]) -> Result<()> {
        let stdin = self.stdin.as_mut().ok_or_else(|| ExportError::EncodeFailure {
            frame,
            reason: "encoder input already closed".to_string(),
        })?;

        stdin.write_all(bytes).map_err(|e| ExportError::EncodeFailure {
            frame,
            reason: format!("FFmpeg rejected frame data: {}", e),
        })?;
        Ok(())
    }

    /// Close the input, wait for the encoder and read the container back
    pub(crate) fn finish(mut self) -> Result<Vec<u8>> {
        drop(self.stdin.take());
        let child = self.child.take().ok_or_else(|| ExportError::MuxFinalizeFailure {
            reason: "encoder process already reaped".to_string(),
        })?;

        let output = child.wait_with_output().map_err(|e| ExportError::MuxFinalizeFailure {
            reason: format!("FFmpeg execution failed: {}", e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::MuxFinalizeFailure {
                reason: format!("FFmpeg failed: {}", stderr.trim()),
            }
            .into());
        }

        let bytes = std::fs::read(&self.output_path).map_err(|e| ExportError::MuxFinalizeFailure {
            reason: format!("Cannot read encoded output: {}", e),
        })?;
        Ok(bytes)
    }

    fn cleanup(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }

        if self.output_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.output_path) {
                warn!("Failed to remove temporary output: {}", e);
            }
        }
    }
}

impl Drop for FfmpegProcess {
    fn drop(&mut self) {
        self.cleanup();
    }
}
