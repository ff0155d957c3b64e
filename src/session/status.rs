use std::fmt;

use serde::Serialize;

/// Externally visible state of the reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationStatus {
    Idle,
    Playing,
    Recording,
    /// A preview ran to completion; the last frame stays on the surface
    Finished,
}

impl AnimationStatus {
    pub fn is_busy(self) -> bool {
        matches!(self, AnimationStatus::Playing | AnimationStatus::Recording)
    }
}

impl fmt::Display for AnimationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnimationStatus::Idle => "idle",
            AnimationStatus::Playing => "playing",
            AnimationStatus::Recording => "recording",
            AnimationStatus::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// One entry of the status stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: AnimationStatus,
    /// Set when the transition was caused by a failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusUpdate {
    pub fn new(status: AnimationStatus) -> Self {
        Self { status, error: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: AnimationStatus::Idle,
            error: Some(message.into()),
        }
    }
}
