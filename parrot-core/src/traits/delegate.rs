use crate::models::error::AudioError;
use crate::models::outcome::{PlaybackOutcome, RecordingOutcome};
use crate::models::state::Transport;

/// Event observer for recorder activity.
///
/// All methods are called from the loop worker threads, not the thread
/// that issued the command. Implementations should marshal to their own
/// context if needed and must not call back into the recorder.
pub trait RecorderDelegate: Send + Sync {
    /// Called whenever the transport changes hands (idle ⇄ recording,
    /// idle ⇄ playing).
    fn on_transport_changed(&self, transport: Transport);

    /// Called when a capture run completes and the clip is finalized.
    fn on_capture_finished(&self, outcome: &RecordingOutcome);

    /// Called when a playback run finishes, including cancelled and
    /// empty-clip runs.
    fn on_playback_finished(&self, outcome: &PlaybackOutcome);

    /// Called when a loop aborts with an error. The same error is also
    /// returned from `finish`/`wait` on the session.
    fn on_error(&self, error: &AudioError);
}
