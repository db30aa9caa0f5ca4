//! # parrot-core
//!
//! Backend-agnostic record-and-replay core library.
//!
//! Provides the capture and playback loops, raw PCM clip storage, and
//! session orchestration for a single fixed-format clip. Audio backends
//! (cpal, test mocks) implement the `AudioBackend` trait and plug into
//! the generic `Recorder`.
//!
//! ## Architecture
//!
//! ```text
//! parrot-core (this crate)
//! ├── traits/       ← AudioBackend, CaptureDevice, PlaybackDevice, RecorderDelegate, PermissionGate
//! ├── models/       ← AudioError, Transport, AudioConfig, RecordingOutcome, PlaybackOutcome
//! ├── pipeline/     ← pump_capture, pump_playback, StopFlag
//! ├── processing/   ← PCM sample conversion and mono downmix
//! ├── session/      ← Recorder, RecordingSession, PlaybackSession
//! └── storage/      ← ClipWriter, ClipReader, metadata sidecar
//! ```

pub mod models;
pub mod pipeline;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::{AudioConfig, BYTES_PER_SAMPLE};
pub use models::error::AudioError;
pub use models::outcome::{PlaybackOutcome, RecordingOutcome};
pub use models::state::Transport;
pub use pipeline::StopFlag;
pub use session::{PlaybackSession, Recorder, RecordingSession};
pub use storage::clip::{ClipReader, ClipWriter};
pub use traits::backend::AudioBackend;
pub use traits::delegate::RecorderDelegate;
pub use traits::device::{CaptureDevice, PlaybackDevice};
pub use traits::gate::{AllowAll, PermissionGate};
