use thiserror::Error;

use super::state::Transport;

/// Errors surfaced by capture, playback, and clip storage.
///
/// Every variant is terminal for the run that produced it: the loop that
/// hit it has already released its device and file handles by the time
/// the error reaches the caller. No retry is attempted anywhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("playback failed: {0}")]
    PlaybackFailed(String),

    #[error("clip file access failed: {0}")]
    FileAccessFailed(String),

    #[error("recorder busy: {0}")]
    Busy(Transport),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
