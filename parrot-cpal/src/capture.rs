//! Blocking capture device over a cpal input stream.

use std::sync::Arc;

use cpal::traits::StreamTrait;

use parrot_core::{AudioError, CaptureDevice};

use crate::pipe::CapturePipe;

/// Microphone handle backed by a cpal input stream.
///
/// The stream's callback pushes encoded mono S16LE bytes into the
/// pipe; `read` drains the pipe with a blocking wait. `cpal::Stream`
/// is not `Send`, so the device must stay on the thread that opened
/// it, which is how the capture loop uses it.
pub struct CpalCaptureDevice {
    stream: Option<cpal::Stream>,
    pipe: Arc<CapturePipe>,
    min_buffer_len: usize,
}

impl CpalCaptureDevice {
    pub(crate) fn new(
        stream: cpal::Stream,
        pipe: Arc<CapturePipe>,
        min_buffer_len: usize,
    ) -> Self {
        Self {
            stream: Some(stream),
            pipe,
            min_buffer_len,
        }
    }
}

impl CaptureDevice for CpalCaptureDevice {
    fn start(&mut self) -> Result<(), AudioError> {
        match &self.stream {
            Some(stream) => stream
                .play()
                .map_err(|e| AudioError::CaptureFailed(format!("failed to start input stream: {}", e))),
            None => Err(AudioError::CaptureFailed("input stream already stopped".into())),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, AudioError> {
        self.pipe.read_blocking(buf)
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        if let Some(stream) = self.stream.take() {
            drop(stream);
        }
        self.pipe.close();
        Ok(())
    }

    fn min_buffer_len(&self) -> usize {
        self.min_buffer_len
    }
}
