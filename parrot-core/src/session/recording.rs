use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::TransportClaim;
use crate::models::config::AudioConfig;
use crate::models::error::AudioError;
use crate::models::outcome::RecordingOutcome;
use crate::pipeline::{pump_capture, StopFlag};
use crate::storage::clip::ClipWriter;
use crate::storage::sidecar;
use crate::traits::backend::AudioBackend;
use crate::traits::delegate::RecorderDelegate;
use crate::traits::device::CaptureDevice;

/// A capture run in progress.
///
/// Owns the stop flag and the worker thread for exactly one recording;
/// the device and sink live inside the worker. `finish` is the
/// end-capture command: it signals the flag and collects the outcome.
/// Dropping an unfinished session stops and joins the same way, so a
/// session can never leak a running capture.
pub struct RecordingSession {
    stop: StopFlag,
    worker: Option<JoinHandle<Result<RecordingOutcome, AudioError>>>,
    started: Instant,
}

impl RecordingSession {
    pub(crate) fn spawn<B: AudioBackend + 'static>(
        backend: Arc<B>,
        config: AudioConfig,
        clip_path: PathBuf,
        delegate: Option<Arc<dyn RecorderDelegate>>,
        claim: TransportClaim,
    ) -> Self {
        let stop = StopFlag::new();
        let loop_stop = stop.clone();

        let worker = thread::Builder::new()
            .name("capture-loop".into())
            .spawn(move || {
                let result = run_capture(&*backend, &config, &clip_path, &loop_stop);
                match &result {
                    Ok(outcome) => {
                        log::info!(
                            "capture finished: {} bytes ({:.2}s) at {}",
                            outcome.bytes,
                            outcome.duration_secs,
                            outcome.path.display()
                        );
                        if let Some(ref delegate) = delegate {
                            delegate.on_capture_finished(outcome);
                        }
                    }
                    Err(e) => {
                        log::error!("capture aborted: {}", e);
                        if let Some(ref delegate) = delegate {
                            delegate.on_error(e);
                        }
                    }
                }
                // Transport returns to idle only now, with the device
                // and sink already released.
                drop(claim);
                result
            })
            .expect("failed to spawn capture thread");

        Self {
            stop,
            worker: Some(worker),
            started: Instant::now(),
        }
    }

    /// Signal the loop to stop at its next iteration boundary and wait
    /// for it to close the clip, returning what was recorded.
    pub fn finish(mut self) -> Result<RecordingOutcome, AudioError> {
        self.stop.set();
        match self.worker.take() {
            Some(worker) => join_capture(worker),
            None => Err(AudioError::CaptureFailed("session already finished".into())),
        }
    }

    /// Whether the capture loop is still running. A loop that failed
    /// early reads as inactive before `finish` is ever called.
    pub fn is_active(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Wall-clock time since the session was accepted.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.stop.set();
            if let Err(e) = join_capture(worker) {
                log::warn!("capture session dropped with error: {}", e);
            }
        }
    }
}

fn join_capture(
    worker: JoinHandle<Result<RecordingOutcome, AudioError>>,
) -> Result<RecordingOutcome, AudioError> {
    match worker.join() {
        Ok(result) => result,
        Err(_) => Err(AudioError::CaptureFailed("capture thread panicked".into())),
    }
}

/// The capture run itself, from the worker thread: truncate-open the
/// clip, open the device, pump until stopped, finalize clip + sidecar.
///
/// The sink is opened before the device so a file-system problem
/// surfaces without ever touching the hardware; both are released by
/// drop on every error path.
fn run_capture<B: AudioBackend>(
    backend: &B,
    config: &AudioConfig,
    clip_path: &Path,
    stop: &StopFlag,
) -> Result<RecordingOutcome, AudioError> {
    let recorded_at = chrono::Utc::now().to_rfc3339();

    let mut sink = ClipWriter::create(clip_path)?;
    let mut device = backend.open_capture(config)?;
    let mut scratch = vec![0u8; device.min_buffer_len().max(1)];

    let bytes = pump_capture(&mut device, &mut sink, stop, &mut scratch)?;
    let checksum = sink.finish()?;

    let outcome = RecordingOutcome::new(clip_path, bytes, config, checksum, recorded_at);
    if let Err(e) = sidecar::write_sidecar(&outcome, clip_path) {
        // The clip itself is complete; a missing sidecar is not worth
        // failing the recording over.
        log::warn!("failed to write clip sidecar: {}", e);
    }
    Ok(outcome)
}
