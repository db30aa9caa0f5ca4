//! The two transfer loops and their cancellation primitive.
//!
//! `pump_capture` and `pump_playback` are deliberately free functions
//! over the device traits plus `std::io` — everything they do is
//! observable through mocks, which is where the behavioral guarantees
//! (ordering, stop latency, exact chunk sizes, failure cleanup) are
//! pinned down.

pub mod capture;
pub mod playback;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use capture::pump_capture;
pub use playback::pump_playback;

/// Cooperative stop signal shared between the commanding thread and a
/// loop worker.
///
/// One side sets, the other polls at iteration boundaries; `SeqCst`
/// ordering makes a set visible to the very next poll, so stop latency
/// is bounded by a single blocking device call. Cloning hands out
/// another handle to the same flag. Serves both as the capture stop
/// flag and the playback cancellation token.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the loop end at its next iteration boundary.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
