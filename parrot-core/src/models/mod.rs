//! Data model: stream configuration, transport state, errors, run outcomes.

pub mod config;
pub mod error;
pub mod outcome;
pub mod state;

pub use config::{AudioConfig, BYTES_PER_SAMPLE};
pub use error::AudioError;
pub use outcome::{PlaybackOutcome, RecordingOutcome};
pub use state::Transport;
