use serde::{Deserialize, Serialize};

/// Bytes per sample: signed 16-bit little-endian PCM, always.
///
/// The clip file is headerless, so the sample encoding can never vary —
/// a reader has no way to discover a different width.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Fixed stream configuration shared by capture and playback.
///
/// The clip file has no header, so whichever configuration wrote it must
/// be byte-for-byte identical to the one reading it back. The recorder
/// holds a single `AudioConfig` and hands the same value to both device
/// opens to make that impossible to get wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 44100).
    pub sample_rate: u32,

    /// Number of interleaved channels (default: 1, mono).
    pub channels: u16,
}

impl AudioConfig {
    /// Bytes occupied by one frame (one sample per channel).
    pub fn bytes_per_frame(&self) -> usize {
        self.channels as usize * BYTES_PER_SAMPLE
    }

    /// Bytes of audio produced or consumed per second.
    pub fn byte_rate(&self) -> usize {
        self.sample_rate as usize * self.bytes_per_frame()
    }

    /// Wall-clock seconds represented by `bytes` of this stream.
    pub fn duration_secs(&self, bytes: u64) -> f64 {
        bytes as f64 / self.byte_rate() as f64
    }

    /// Minimum transfer buffer: 100 ms of audio, rounded to whole frames.
    ///
    /// Large enough to keep a default device queue fed, small enough to
    /// bound stop latency to a fraction of a second.
    pub fn min_buffer_len(&self) -> usize {
        let len = self.byte_rate() / 10;
        len - len % self.bytes_per_frame()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if ![1, 2].contains(&self.channels) {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        Ok(())
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_is_mono_44100() {
        let config = AudioConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.channels, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn byte_math_mono() {
        let config = AudioConfig::default();
        assert_eq!(config.bytes_per_frame(), 2);
        assert_eq!(config.byte_rate(), 88200);
        assert_eq!(config.min_buffer_len(), 8820);
        assert_eq!(config.min_buffer_len() % config.bytes_per_frame(), 0);
    }

    #[test]
    fn duration_from_bytes() {
        let config = AudioConfig::default();
        assert_relative_eq!(config.duration_secs(88200), 1.0);
        assert_relative_eq!(config.duration_secs(150), 150.0 / 88200.0);
        assert_relative_eq!(config.duration_secs(0), 0.0);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let zero_rate = AudioConfig {
            sample_rate: 0,
            channels: 1,
        };
        assert!(zero_rate.validate().is_err());

        let five_channels = AudioConfig {
            sample_rate: 44100,
            channels: 5,
        };
        assert!(five_channels.validate().is_err());
    }
}
