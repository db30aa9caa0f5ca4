//! Session orchestration: the recorder facade, the session values it
//! hands out, and the transport claim that keeps capture and playback
//! mutually exclusive.

pub mod playback;
pub mod recorder;
pub mod recording;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::AudioError;
use crate::models::state::Transport;
use crate::traits::delegate::RecorderDelegate;

pub use playback::PlaybackSession;
pub use recorder::Recorder;
pub use recording::RecordingSession;

/// Exclusive ownership of the transport for one loop run.
///
/// Acquiring moves the transport out of `Idle`; anyone else asking
/// meanwhile gets `Busy`. The claim travels into the worker thread and
/// releases on drop, so the transport can only return to `Idle` once
/// the loop — and the device handle it owns — is completely done, even
/// if the worker panics.
pub(crate) struct TransportClaim {
    transport: Arc<Mutex<Transport>>,
    delegate: Option<Arc<dyn RecorderDelegate>>,
}

impl TransportClaim {
    pub(crate) fn acquire(
        transport: &Arc<Mutex<Transport>>,
        desired: Transport,
        delegate: Option<Arc<dyn RecorderDelegate>>,
    ) -> Result<Self, AudioError> {
        {
            let mut current = transport.lock();
            if !current.is_idle() {
                return Err(AudioError::Busy(*current));
            }
            *current = desired;
        }
        // Notify outside the lock; delegates must not re-enter the
        // recorder anyway, but there is no reason to hold it here.
        if let Some(ref delegate) = delegate {
            delegate.on_transport_changed(desired);
        }
        Ok(Self {
            transport: Arc::clone(transport),
            delegate,
        })
    }
}

impl Drop for TransportClaim {
    fn drop(&mut self) {
        *self.transport.lock() = Transport::Idle;
        if let Some(ref delegate) = self.delegate {
            delegate.on_transport_changed(Transport::Idle);
        }
    }
}
