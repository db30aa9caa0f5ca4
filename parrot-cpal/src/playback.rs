//! Blocking playback device over a cpal output stream.

use std::sync::Arc;
use std::time::Duration;

use cpal::traits::StreamTrait;

use parrot_core::{AudioError, PlaybackDevice};

use crate::pipe::PlaybackPipe;

/// Extra drain time on top of the queued audio's own duration, to
/// cover the callback buffers cpal holds beyond the pipe.
const DRAIN_MARGIN: Duration = Duration::from_millis(500);

/// Speaker handle backed by a cpal output stream.
///
/// `write` queues encoded mono S16LE bytes into the pipe and blocks
/// while the pipe is full; the stream's callback drains it at the
/// device's pace. Like the capture side, the held `cpal::Stream` is
/// not `Send` and stays on the opening thread.
pub struct CpalPlaybackDevice {
    stream: Option<cpal::Stream>,
    pipe: Arc<PlaybackPipe>,
    byte_rate: usize,
    min_buffer_len: usize,
}

impl CpalPlaybackDevice {
    pub(crate) fn new(
        stream: cpal::Stream,
        pipe: Arc<PlaybackPipe>,
        byte_rate: usize,
        min_buffer_len: usize,
    ) -> Self {
        Self {
            stream: Some(stream),
            pipe,
            byte_rate,
            min_buffer_len,
        }
    }

    fn teardown(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
            drop(stream);
        }
        self.pipe.close();
    }
}

impl PlaybackDevice for CpalPlaybackDevice {
    fn start(&mut self) -> Result<(), AudioError> {
        match &self.stream {
            Some(stream) => stream
                .play()
                .map_err(|e| AudioError::PlaybackFailed(format!("failed to start output stream: {}", e))),
            None => Err(AudioError::PlaybackFailed("output stream already stopped".into())),
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), AudioError> {
        self.pipe.write_blocking(buf)
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        // Flush: give the callback time proportional to what is queued.
        let queued = self.pipe.queued();
        let timeout =
            Duration::from_secs_f64(queued as f64 / self.byte_rate.max(1) as f64) + DRAIN_MARGIN;
        let drained = self.pipe.drain_blocking(timeout);

        if let Some(msg) = self.pipe.failure() {
            self.teardown();
            return Err(AudioError::PlaybackFailed(msg));
        }
        if !drained {
            log::warn!(
                "output stream left {} bytes undrained after {:?}",
                self.pipe.queued(),
                timeout
            );
        }
        self.teardown();
        Ok(())
    }

    fn min_buffer_len(&self) -> usize {
        self.min_buffer_len
    }
}
