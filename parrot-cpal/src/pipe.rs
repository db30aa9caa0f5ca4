//! Byte pipes between cpal callback threads and the blocking device API.
//!
//! cpal delivers and consumes audio on its own realtime threads; the
//! core capture and playback loops want plain blocking reads and
//! writes. Each pipe is a bounded byte queue guarded by a mutex and
//! condvars: the callback side locks briefly and never waits, the
//! loop side blocks until data, room, or a terminal state.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use parrot_core::AudioError;

struct PipeState {
    buf: VecDeque<u8>,
    closed: bool,
    failed: Option<String>,
}

impl PipeState {
    fn new() -> Self {
        Self {
            buf: VecDeque::new(),
            closed: false,
            failed: None,
        }
    }
}

/// Capture-side pipe: the cpal input callback pushes encoded bytes,
/// the capture loop takes them out with a blocking read.
///
/// Overflow drops the oldest bytes so a stalled consumer hears a gap
/// instead of wedging the audio callback. Capacity and pushed chunks
/// are whole frames, so drops stay frame-aligned.
pub struct CapturePipe {
    state: Mutex<PipeState>,
    readable: Condvar,
    capacity: usize,
}

impl CapturePipe {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(PipeState::new()),
            readable: Condvar::new(),
            capacity,
        }
    }

    /// Append bytes from the input callback. Never blocks; drops the
    /// oldest buffered bytes once `capacity` is exceeded.
    pub fn push(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        if bytes.len() >= self.capacity {
            state.buf.clear();
            state.buf.extend(&bytes[bytes.len() - self.capacity..]);
        } else {
            let overflow = (state.buf.len() + bytes.len()).saturating_sub(self.capacity);
            if overflow > 0 {
                state.buf.drain(..overflow);
            }
            state.buf.extend(bytes);
        }
        drop(state);
        self.readable.notify_all();
    }

    /// Block until at least one byte is available, the producer closes,
    /// or the stream reports an error.
    ///
    /// Returns `Ok(0)` only after `close` with nothing left to drain. A
    /// stream failure surfaces as `CaptureFailed` ahead of any bytes
    /// still buffered.
    pub fn read_blocking(&self, out: &mut [u8]) -> Result<usize, AudioError> {
        let mut state = self.state.lock();
        loop {
            if let Some(msg) = &state.failed {
                return Err(AudioError::CaptureFailed(msg.clone()));
            }
            if !state.buf.is_empty() {
                let take = out.len().min(state.buf.len());
                for slot in out.iter_mut().take(take) {
                    // Cannot fail: take <= buf.len() is held under the lock.
                    *slot = state.buf.pop_front().unwrap_or_default();
                }
                return Ok(take);
            }
            if state.closed {
                return Ok(0);
            }
            self.readable.wait(&mut state);
        }
    }

    /// Mark the producer as finished; readers drain what is buffered
    /// and then see `Ok(0)`.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.readable.notify_all();
    }

    /// Record a stream error. The first failure wins; readers are
    /// woken to observe it.
    pub fn fail(&self, message: String) {
        let mut state = self.state.lock();
        if state.failed.is_none() {
            state.failed = Some(message);
        }
        drop(state);
        self.readable.notify_all();
    }

    #[cfg(test)]
    fn buffered(&self) -> usize {
        self.state.lock().buf.len()
    }
}

/// Playback-side pipe: the playback loop pushes encoded bytes with a
/// blocking write, the cpal output callback takes them out.
///
/// A full pipe blocks the writer until the callback makes room, which
/// is what paces the playback loop to the speaker.
pub struct PlaybackPipe {
    state: Mutex<PipeState>,
    writable: Condvar,
    capacity: usize,
}

impl PlaybackPipe {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(PipeState::new()),
            writable: Condvar::new(),
            capacity,
        }
    }

    /// Block until every byte of `bytes` is queued, or the stream
    /// reports an error.
    pub fn write_blocking(&self, bytes: &[u8]) -> Result<(), AudioError> {
        let mut written = 0;
        let mut state = self.state.lock();
        while written < bytes.len() {
            if let Some(msg) = &state.failed {
                return Err(AudioError::PlaybackFailed(msg.clone()));
            }
            if state.closed {
                return Err(AudioError::PlaybackFailed(
                    "output stream closed mid-clip".into(),
                ));
            }
            let room = self.capacity - state.buf.len();
            if room == 0 {
                self.writable.wait(&mut state);
                continue;
            }
            let take = room.min(bytes.len() - written);
            state.buf.extend(&bytes[written..written + take]);
            written += take;
        }
        Ok(())
    }

    /// Move up to `out.len()` bytes into the output callback's buffer.
    /// Never blocks; the caller zero-fills whatever is not covered.
    pub fn pop_into(&self, out: &mut [u8]) -> usize {
        let mut state = self.state.lock();
        let take = out.len().min(state.buf.len());
        for slot in out.iter_mut().take(take) {
            *slot = state.buf.pop_front().unwrap_or_default();
        }
        drop(state);
        if take > 0 {
            self.writable.notify_all();
        }
        take
    }

    /// Block until the queue is empty, a failure is recorded, or the
    /// deadline passes. Returns whether the queue fully drained.
    pub fn drain_blocking(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if state.buf.is_empty() {
                return true;
            }
            if state.failed.is_some() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.writable.wait_for(&mut state, deadline - now);
        }
    }

    /// Bytes currently queued and not yet taken by the callback.
    pub fn queued(&self) -> usize {
        self.state.lock().buf.len()
    }

    pub fn close(&self) {
        self.state.lock().closed = true;
        self.writable.notify_all();
    }

    /// Record a stream error and unblock any waiting writer.
    pub fn fail(&self, message: String) {
        let mut state = self.state.lock();
        if state.failed.is_none() {
            state.failed = Some(message);
        }
        drop(state);
        self.writable.notify_all();
    }

    /// The recorded stream error, if any.
    pub fn failure(&self) -> Option<String> {
        self.state.lock().failed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn capture_read_returns_pushed_bytes_in_order() {
        let pipe = CapturePipe::new(64);
        pipe.push(&[1, 2, 3]);
        pipe.push(&[4, 5]);

        let mut out = [0u8; 8];
        let n = pipe.read_blocking(&mut out).unwrap();
        assert_eq!(&out[..n], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn capture_read_blocks_until_data_arrives() {
        let pipe = Arc::new(CapturePipe::new(64));
        let producer = Arc::clone(&pipe);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.push(&[7, 8, 9]);
        });

        let mut out = [0u8; 4];
        let n = pipe.read_blocking(&mut out).unwrap();
        assert_eq!(&out[..n], &[7, 8, 9]);
        handle.join().unwrap();
    }

    #[test]
    fn capture_close_drains_then_signals_end() {
        let pipe = CapturePipe::new(64);
        pipe.push(&[1, 2]);
        pipe.close();

        let mut out = [0u8; 4];
        assert_eq!(pipe.read_blocking(&mut out).unwrap(), 2);
        assert_eq!(pipe.read_blocking(&mut out).unwrap(), 0);
    }

    #[test]
    fn capture_overflow_drops_oldest() {
        let pipe = CapturePipe::new(4);
        pipe.push(&[1, 2, 3]);
        pipe.push(&[4, 5, 6]);

        assert_eq!(pipe.buffered(), 4);
        let mut out = [0u8; 8];
        let n = pipe.read_blocking(&mut out).unwrap();
        assert_eq!(&out[..n], &[3, 4, 5, 6]);
    }

    #[test]
    fn capture_push_larger_than_capacity_keeps_tail() {
        let pipe = CapturePipe::new(3);
        pipe.push(&[1, 2, 3, 4, 5]);

        let mut out = [0u8; 8];
        let n = pipe.read_blocking(&mut out).unwrap();
        assert_eq!(&out[..n], &[3, 4, 5]);
    }

    #[test]
    fn capture_failure_beats_buffered_data() {
        let pipe = CapturePipe::new(64);
        pipe.push(&[1, 2, 3]);
        pipe.fail("device unplugged".into());

        let mut out = [0u8; 4];
        assert_eq!(
            pipe.read_blocking(&mut out),
            Err(AudioError::CaptureFailed("device unplugged".into()))
        );
    }

    #[test]
    fn capture_failure_wakes_a_blocked_reader() {
        let pipe = Arc::new(CapturePipe::new(64));
        let failer = Arc::clone(&pipe);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            failer.fail("stream died".into());
        });

        let mut out = [0u8; 4];
        assert_eq!(
            pipe.read_blocking(&mut out),
            Err(AudioError::CaptureFailed("stream died".into()))
        );
        handle.join().unwrap();
    }

    #[test]
    fn playback_pop_takes_written_bytes() {
        let pipe = PlaybackPipe::new(64);
        pipe.write_blocking(&[1, 2, 3, 4]).unwrap();

        let mut out = [0u8; 3];
        assert_eq!(pipe.pop_into(&mut out), 3);
        assert_eq!(out, [1, 2, 3]);
        assert_eq!(pipe.queued(), 1);
    }

    #[test]
    fn playback_pop_from_empty_is_zero() {
        let pipe = PlaybackPipe::new(64);
        let mut out = [0u8; 4];
        assert_eq!(pipe.pop_into(&mut out), 0);
    }

    #[test]
    fn playback_write_blocks_until_consumer_makes_room() {
        let pipe = Arc::new(PlaybackPipe::new(4));
        pipe.write_blocking(&[1, 2, 3, 4]).unwrap();

        let consumer = Arc::clone(&pipe);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let mut out = [0u8; 4];
            consumer.pop_into(&mut out);
        });

        // Pipe is full; this returns only after the consumer pops.
        pipe.write_blocking(&[5, 6]).unwrap();
        handle.join().unwrap();

        let mut out = [0u8; 4];
        let n = pipe.pop_into(&mut out);
        assert_eq!(&out[..n], &[5, 6]);
    }

    #[test]
    fn playback_failure_unblocks_a_full_writer() {
        let pipe = Arc::new(PlaybackPipe::new(2));
        pipe.write_blocking(&[1, 2]).unwrap();

        let failer = Arc::clone(&pipe);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            failer.fail("underrun".into());
        });

        assert_eq!(
            pipe.write_blocking(&[3, 4]),
            Err(AudioError::PlaybackFailed("underrun".into()))
        );
        handle.join().unwrap();
    }

    #[test]
    fn playback_drain_completes_once_consumed() {
        let pipe = Arc::new(PlaybackPipe::new(64));
        pipe.write_blocking(&[1, 2, 3, 4]).unwrap();

        let consumer = Arc::clone(&pipe);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let mut out = [0u8; 4];
            while consumer.pop_into(&mut out) > 0 {}
        });

        assert!(pipe.drain_blocking(Duration::from_secs(5)));
        handle.join().unwrap();
    }

    #[test]
    fn playback_drain_times_out_without_a_consumer() {
        let pipe = PlaybackPipe::new(64);
        pipe.write_blocking(&[1, 2, 3, 4]).unwrap();

        assert!(!pipe.drain_blocking(Duration::from_millis(20)));
        assert_eq!(pipe.queued(), 4);
    }
}
