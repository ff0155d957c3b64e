use thiserror::Error;

/// Main error type for the particle-reveal library
#[derive(Error, Debug)]
pub enum RevealError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Point source error: {0}")]
    Source(#[from] SourceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Animation session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No image loaded: load a point cloud before starting a session")]
    NoImageLoaded,

    /// Raised internally when a recording is already running. Public triggers
    /// turn this into a silent no-op.
    #[error("A recording session is already in progress")]
    ConcurrentSessionRejected,
}

/// Video export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported codec: {format} output needs {codec}, which is not available on this host")]
    UnsupportedCodec { format: String, codec: String },

    #[error("Encoder initialization failed: {reason}")]
    EncoderInitFailure { reason: String },

    #[error("Encoding failed at frame {frame}: {reason}")]
    EncodeFailure { frame: usize, reason: String },

    #[error("Container finalization failed: {reason}")]
    MuxFinalizeFailure { reason: String },
}

/// Point source errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to load image: {path} - {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Invalid sampling stride: {stride} (must be at least 1)")]
    InvalidStride { stride: u32 },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using RevealError
pub type Result<T> = std::result::Result<T, RevealError>;

impl RevealError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Source(SourceError::LoadFailed { .. }) => true,
            // A crashed encoder process may succeed on a second attempt
            Self::Export(ExportError::EncodeFailure { .. }) => true,
            Self::Export(ExportError::MuxFinalizeFailure { .. }) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Session(SessionError::NoImageLoaded) => {
                "Load an image before starting a preview or export.".to_string()
            }
            Self::Export(ExportError::UnsupportedCodec { format, codec }) => {
                format!(
                    "Cannot export {} on this machine: the {} encoder is missing. Try the WebM or GIF format instead.",
                    format, codec
                )
            }
            Self::Source(SourceError::LoadFailed { path, .. }) => {
                format!("Could not load image '{}'. Please check the file exists and is a PNG or JPEG.", path)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_rollup() {
        let err: RevealError = ExportError::EncodeFailure {
            frame: 12,
            reason: "broken pipe".to_string(),
        }
        .into();

        assert!(err.is_recoverable());
        assert!(err.to_string().contains("frame 12"));
    }

    #[test]
    fn test_unsupported_codec_message_names_alternatives() {
        let err: RevealError = ExportError::UnsupportedCodec {
            format: "MP4".to_string(),
            codec: "libx264".to_string(),
        }
        .into();

        assert!(!err.is_recoverable());
        assert!(err.user_message().contains("libx264"));
        assert!(err.user_message().contains("WebM"));
    }
}
