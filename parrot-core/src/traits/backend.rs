use crate::models::config::AudioConfig;
use crate::models::error::AudioError;
use crate::traits::device::{CaptureDevice, PlaybackDevice};

/// Factory for platform audio streams.
///
/// Implemented by `parrot-cpal` for real hardware and by mock backends
/// in tests. The recorder shares one backend across its worker threads
/// and opens each device inside the thread that will use it, so device
/// types themselves need not be `Send`.
pub trait AudioBackend: Send + Sync {
    type Capture: CaptureDevice;
    type Playback: PlaybackDevice;

    /// Open a microphone stream at exactly `config`.
    ///
    /// Fails with `DeviceUnavailable` when no input device exists or
    /// none can run at the requested configuration.
    fn open_capture(&self, config: &AudioConfig) -> Result<Self::Capture, AudioError>;

    /// Open a speaker stream at exactly `config`, failing analogously.
    fn open_playback(&self, config: &AudioConfig) -> Result<Self::Playback, AudioError>;
}
