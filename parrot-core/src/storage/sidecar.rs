use std::fs;
use std::path::Path;

use crate::models::error::AudioError;
use crate::models::outcome::RecordingOutcome;

/// Write the recording outcome as a JSON sidecar next to the clip.
///
/// Creates `{clip_path}.meta.json` (extension replaced). The clip itself
/// is headerless, so the sidecar is the only on-disk record of its
/// sample rate, channel count, and checksum.
pub fn write_sidecar(outcome: &RecordingOutcome, clip_path: &Path) -> Result<(), AudioError> {
    let sidecar_path = clip_path.with_extension("meta.json");
    let json = serde_json::to_string_pretty(outcome)
        .map_err(|e| AudioError::FileAccessFailed(format!("failed to serialize sidecar: {}", e)))?;
    fs::write(&sidecar_path, json)
        .map_err(|e| AudioError::FileAccessFailed(format!("failed to write sidecar: {}", e)))?;
    Ok(())
}

/// Read a previously written sidecar for the clip at `clip_path`.
pub fn read_sidecar(clip_path: &Path) -> Result<RecordingOutcome, AudioError> {
    let sidecar_path = clip_path.with_extension("meta.json");
    let json = fs::read_to_string(&sidecar_path)
        .map_err(|e| AudioError::FileAccessFailed(format!("failed to read sidecar: {}", e)))?;
    let outcome: RecordingOutcome = serde_json::from_str(&json)
        .map_err(|e| AudioError::FileAccessFailed(format!("failed to parse sidecar: {}", e)))?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::AudioConfig;
    use std::path::PathBuf;

    fn temp_clip_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("parrot_sidecar_test_{}", name))
    }

    #[test]
    fn sidecar_round_trip() {
        let clip_path = temp_clip_path("round_trip.pcm");
        let config = AudioConfig::default();
        let outcome = RecordingOutcome::new(
            &clip_path,
            88200,
            &config,
            "ab".repeat(32),
            chrono::Utc::now().to_rfc3339(),
        );

        write_sidecar(&outcome, &clip_path).unwrap();
        let loaded = read_sidecar(&clip_path).unwrap();
        assert_eq!(loaded, outcome);
        assert_eq!(loaded.sample_rate, 44100);
        assert_eq!(loaded.channels, 1);

        fs::remove_file(clip_path.with_extension("meta.json")).ok();
    }

    #[test]
    fn read_missing_sidecar_fails() {
        let clip_path = temp_clip_path("absent.pcm");
        fs::remove_file(clip_path.with_extension("meta.json")).ok();
        assert!(matches!(
            read_sidecar(&clip_path),
            Err(AudioError::FileAccessFailed(_))
        ));
    }
}
