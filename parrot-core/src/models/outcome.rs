use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::config::AudioConfig;

/// Summary returned when a capture run completes successfully.
///
/// Serializable so it can double as the clip's JSON sidecar: the clip
/// file itself is headerless, and this record is where a consumer learns
/// the sample rate, channel count, and integrity checksum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingOutcome {
    /// Random id distinguishing this take from earlier ones at the same path.
    pub id: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
    /// Hex-encoded SHA-256 of the clip file.
    pub checksum: String,
    /// RFC 3339 timestamp taken when the capture loop started.
    pub recorded_at: String,
}

impl RecordingOutcome {
    pub fn new(
        path: &Path,
        bytes: u64,
        config: &AudioConfig,
        checksum: String,
        recorded_at: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            path: path.to_path_buf(),
            bytes,
            duration_secs: config.duration_secs(bytes),
            sample_rate: config.sample_rate,
            channels: config.channels,
            checksum,
            recorded_at,
        }
    }
}

/// Summary returned when a playback run finishes or is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackOutcome {
    pub bytes: u64,
    pub duration_secs: f64,
}

impl PlaybackOutcome {
    pub fn new(bytes: u64, config: &AudioConfig) -> Self {
        Self {
            bytes,
            duration_secs: config.duration_secs(bytes),
        }
    }

    /// True when the clip was missing or empty and nothing was played.
    pub fn is_empty(&self) -> bool {
        self.bytes == 0
    }
}
