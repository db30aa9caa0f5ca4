use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{PlaybackSession, RecordingSession, TransportClaim};
use crate::models::config::AudioConfig;
use crate::models::error::AudioError;
use crate::models::state::Transport;
use crate::traits::backend::AudioBackend;
use crate::traits::delegate::RecorderDelegate;
use crate::traits::gate::{AllowAll, PermissionGate};

/// Record-and-replay facade over one clip path.
///
/// Owns the fixed stream configuration, the clip location, the
/// permission gate, and the transport lock that keeps capture and
/// playback mutually exclusive — the two loops touch the same file, so
/// at most one session exists at a time and a second start is refused
/// with [`AudioError::Busy`].
///
/// `begin_capture` and `begin_playback` return session values that own
/// their run; the recorder itself holds no per-run state and can be
/// shared behind an `Arc` across threads.
pub struct Recorder<B: AudioBackend> {
    backend: Arc<B>,
    config: AudioConfig,
    clip_path: PathBuf,
    gate: Arc<dyn PermissionGate>,
    delegate: Option<Arc<dyn RecorderDelegate>>,
    transport: Arc<Mutex<Transport>>,
}

impl<B: AudioBackend + 'static> Recorder<B> {
    /// Create a recorder for `clip_path` with the given fixed stream
    /// configuration. The permission gate defaults to [`AllowAll`].
    pub fn new(
        backend: B,
        config: AudioConfig,
        clip_path: impl Into<PathBuf>,
    ) -> Result<Self, AudioError> {
        config.validate().map_err(AudioError::InvalidConfig)?;
        Ok(Self {
            backend: Arc::new(backend),
            config,
            clip_path: clip_path.into(),
            gate: Arc::new(AllowAll),
            delegate: None,
            transport: Arc::new(Mutex::new(Transport::Idle)),
        })
    }

    pub fn set_gate(&mut self, gate: Arc<dyn PermissionGate>) {
        self.gate = gate;
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn RecorderDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    pub fn clip_path(&self) -> &Path {
        &self.clip_path
    }

    /// Current transport state. `Recording` from the moment a capture
    /// is accepted (before its device is confirmed open) until the
    /// capture loop has fully released everything; likewise `Playing`.
    pub fn transport(&self) -> Transport {
        *self.transport.lock()
    }

    /// Begin recording: truncate the clip and capture from the
    /// microphone until the returned session is finished.
    ///
    /// Refuses with `PermissionDenied` when the gate says no and with
    /// `Busy` while another session runs. The device is opened inside
    /// the worker, so open failures surface from
    /// [`RecordingSession::finish`], not here.
    pub fn begin_capture(&self) -> Result<RecordingSession, AudioError> {
        match self.gate.microphone_allowed() {
            Ok(true) => {}
            Ok(false) => return Err(AudioError::PermissionDenied),
            Err(e) => return Err(e),
        }

        let claim = TransportClaim::acquire(
            &self.transport,
            Transport::Recording,
            self.delegate.clone(),
        )?;
        log::info!("capture starting (clip: {})", self.clip_path.display());

        Ok(RecordingSession::spawn(
            Arc::clone(&self.backend),
            self.config,
            self.clip_path.clone(),
            self.delegate.clone(),
            claim,
        ))
    }

    /// Begin playing the clip through the speaker. Runs to completion
    /// on its own; the returned session can `wait` or `cancel`.
    ///
    /// Refuses with `Busy` while another session runs. A missing clip
    /// is not an error: the session completes immediately with an
    /// empty outcome.
    pub fn begin_playback(&self) -> Result<PlaybackSession, AudioError> {
        let claim = TransportClaim::acquire(
            &self.transport,
            Transport::Playing,
            self.delegate.clone(),
        )?;
        log::info!("playback starting (clip: {})", self.clip_path.display());

        Ok(PlaybackSession::spawn(
            Arc::clone(&self.backend),
            self.config,
            self.clip_path.clone(),
            self.delegate.clone(),
            claim,
        ))
    }
}
