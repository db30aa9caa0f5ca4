use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::TransportClaim;
use crate::models::config::AudioConfig;
use crate::models::error::AudioError;
use crate::models::outcome::PlaybackOutcome;
use crate::pipeline::{pump_playback, StopFlag};
use crate::storage::clip::ClipReader;
use crate::traits::backend::AudioBackend;
use crate::traits::delegate::RecorderDelegate;
use crate::traits::device::PlaybackDevice;

/// A playback run in progress.
///
/// Runs to completion on its own; `wait` collects the outcome, `cancel`
/// asks the loop to end at its next read/write boundary. Dropping the
/// session cancels and joins, so playback never outlives its handle.
pub struct PlaybackSession {
    cancel: StopFlag,
    worker: Option<JoinHandle<Result<PlaybackOutcome, AudioError>>>,
}

impl PlaybackSession {
    pub(crate) fn spawn<B: AudioBackend + 'static>(
        backend: Arc<B>,
        config: AudioConfig,
        clip_path: PathBuf,
        delegate: Option<Arc<dyn RecorderDelegate>>,
        claim: TransportClaim,
    ) -> Self {
        let cancel = StopFlag::new();
        let token = cancel.clone();

        let worker = thread::Builder::new()
            .name("playback-loop".into())
            .spawn(move || {
                let result = run_playback(&*backend, &config, &clip_path, &token);
                match &result {
                    Ok(outcome) => {
                        if outcome.is_empty() {
                            log::info!("no clip to play at {}", clip_path.display());
                        } else {
                            log::info!(
                                "playback finished: {} bytes ({:.2}s)",
                                outcome.bytes,
                                outcome.duration_secs
                            );
                        }
                        if let Some(ref delegate) = delegate {
                            delegate.on_playback_finished(outcome);
                        }
                    }
                    Err(e) => {
                        log::error!("playback aborted: {}", e);
                        if let Some(ref delegate) = delegate {
                            delegate.on_error(e);
                        }
                    }
                }
                drop(claim);
                result
            })
            .expect("failed to spawn playback thread");

        Self {
            cancel,
            worker: Some(worker),
        }
    }

    /// Request cancellation; the loop honors it at its next iteration
    /// boundary and still flushes what the device already accepted.
    pub fn cancel(&self) {
        self.cancel.set();
    }

    /// Whether the playback loop is still running.
    pub fn is_active(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Wait for the run to finish (or honor a cancel) and return how
    /// much was played.
    pub fn wait(mut self) -> Result<PlaybackOutcome, AudioError> {
        match self.worker.take() {
            Some(worker) => join_playback(worker),
            None => Err(AudioError::PlaybackFailed("session already waited".into())),
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.cancel.set();
            if let Err(e) = join_playback(worker) {
                log::warn!("playback session dropped with error: {}", e);
            }
        }
    }
}

fn join_playback(
    worker: JoinHandle<Result<PlaybackOutcome, AudioError>>,
) -> Result<PlaybackOutcome, AudioError> {
    match worker.join() {
        Ok(result) => result,
        Err(_) => Err(AudioError::PlaybackFailed("playback thread panicked".into())),
    }
}

/// The playback run itself, from the worker thread.
///
/// A missing clip means nothing was ever recorded: the run completes
/// empty without opening any device. A present clip, even a zero-byte
/// one, goes through the full open/start/stop sequence.
fn run_playback<B: AudioBackend>(
    backend: &B,
    config: &AudioConfig,
    clip_path: &Path,
    cancel: &StopFlag,
) -> Result<PlaybackOutcome, AudioError> {
    let Some(mut source) = ClipReader::open(clip_path)? else {
        return Ok(PlaybackOutcome::default());
    };

    let mut device = backend.open_playback(config)?;
    let mut scratch = vec![0u8; device.min_buffer_len().max(1)];

    let bytes = pump_playback(&mut source, &mut device, cancel, &mut scratch)?;
    Ok(PlaybackOutcome::new(bytes, config))
}
