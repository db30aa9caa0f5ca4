use crate::models::error::AudioError;

/// A microphone input stream delivering raw PCM bytes on demand.
///
/// Handles are exclusive hardware resources: the recorder opens at most
/// one at a time, uses it from a single worker thread, and drops it when
/// the run ends.
pub trait CaptureDevice {
    /// Transition the stream into the active state.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Fill up to `buf.len()` bytes of captured audio.
    ///
    /// Blocks until at least one byte is available. Returns `Ok(0)` only
    /// when the producer side has closed the stream — not expected in
    /// normal microphone operation. A failure of the underlying stream
    /// surfaces as `CaptureFailed` from this call onward.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, AudioError>;

    /// Transition the stream out of the active state and release it.
    fn stop(&mut self) -> Result<(), AudioError>;

    /// Smallest transfer size that keeps this device fed without
    /// underrunning; callers size their scratch buffers from it.
    fn min_buffer_len(&self) -> usize;
}

/// A speaker output stream accepting raw PCM bytes.
pub trait PlaybackDevice {
    /// Transition the stream into the active state.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Enqueue exactly `buf` for output.
    ///
    /// Blocks while the device queue is full — backpressure is implicit
    /// in the blocking call. A failure of the underlying stream surfaces
    /// as `PlaybackFailed`.
    fn write(&mut self, buf: &[u8]) -> Result<(), AudioError>;

    /// Flush any queued audio, then stop and release the stream.
    ///
    /// Must not return while enqueued audio is still pending, so a
    /// caller that writes the last chunk and immediately stops still
    /// hears the whole clip.
    fn stop(&mut self) -> Result<(), AudioError>;

    /// Preferred transfer size for `write` calls.
    fn min_buffer_len(&self) -> usize;
}
