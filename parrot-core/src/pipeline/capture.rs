use std::io::Write;

use super::StopFlag;
use crate::models::error::AudioError;
use crate::traits::device::CaptureDevice;

/// Run one capture pass: start the device, copy audio to the sink until
/// the stop flag is set or the producer closes, then stop the device.
///
/// Per-iteration contract:
/// - the stop flag is polled at the top, before any `read` — once a set
///   is observed the device is never read again;
/// - `read` blocks for at least one byte; `Ok(0)` means the producer
///   closed and ends the run cleanly;
/// - exactly the bytes returned by `read` are appended to the sink, in
///   order, before the next read — nothing buffered is lost on stop.
///
/// A `read` failure aborts the run with `CaptureFailed`; a sink failure
/// aborts with `FileAccessFailed`. Either way the device is stopped
/// before the error is returned, so no cleanup is left pending. The
/// sink itself is released by the caller dropping it.
///
/// Returns the total bytes appended.
pub fn pump_capture<D, W>(
    device: &mut D,
    sink: &mut W,
    stop: &StopFlag,
    scratch: &mut [u8],
) -> Result<u64, AudioError>
where
    D: CaptureDevice,
    W: Write,
{
    device.start()?;
    let run = copy_captured(device, sink, stop, scratch);
    if let Err(e) = device.stop() {
        // The audio already written is intact, so a teardown failure
        // is not worth failing the run over.
        log::warn!("capture device stop failed: {}", e);
    }
    run
}

fn copy_captured<D, W>(
    device: &mut D,
    sink: &mut W,
    stop: &StopFlag,
    scratch: &mut [u8],
) -> Result<u64, AudioError>
where
    D: CaptureDevice,
    W: Write,
{
    let mut total: u64 = 0;
    while !stop.is_set() {
        let read = device.read(scratch)?;
        if read == 0 {
            break;
        }
        sink.write_all(&scratch[..read])
            .map_err(|e| AudioError::FileAccessFailed(format!("failed to append to clip: {}", e)))?;
        total += read as u64;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    /// Capture device fed from a script of reads. `Ok(bytes)` fills the
    /// buffer, `Err` fails the call, an exhausted script reads as the
    /// producer closing. Optionally flips a stop flag during the Nth
    /// read, emulating an external stop arriving mid-block.
    struct ScriptedMic {
        script: VecDeque<Result<Vec<u8>, AudioError>>,
        reads: usize,
        started: bool,
        stopped: bool,
        flip_during_read: Option<(usize, StopFlag)>,
    }

    impl ScriptedMic {
        fn new(script: Vec<Result<Vec<u8>, AudioError>>) -> Self {
            Self {
                script: script.into(),
                reads: 0,
                started: false,
                stopped: false,
                flip_during_read: None,
            }
        }

        fn chunks(chunks: &[&[u8]]) -> Self {
            Self::new(chunks.iter().map(|c| Ok(c.to_vec())).collect())
        }
    }

    impl CaptureDevice for ScriptedMic {
        fn start(&mut self) -> Result<(), AudioError> {
            self.started = true;
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, AudioError> {
            assert!(self.started && !self.stopped, "read outside start/stop");
            self.reads += 1;
            if let Some((nth, flag)) = &self.flip_during_read {
                if self.reads == *nth {
                    flag.set();
                }
            }
            match self.script.pop_front() {
                Some(Ok(bytes)) => {
                    assert!(bytes.len() <= buf.len(), "script chunk exceeds scratch");
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }

        fn stop(&mut self) -> Result<(), AudioError> {
            self.stopped = true;
            Ok(())
        }

        fn min_buffer_len(&self) -> usize {
            128
        }
    }

    /// Sink recording each write's size alongside the accumulated bytes.
    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<usize>,
        data: Vec<u8>,
    }

    impl Write for RecordingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes.push(buf.len());
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn appends_chunks_in_order_until_producer_closes() {
        let first = pattern(100);
        let second = pattern(50);
        let mut mic = ScriptedMic::chunks(&[&first, &second]);
        let mut sink = RecordingSink::default();
        let mut scratch = vec![0u8; 128];

        let bytes = pump_capture(&mut mic, &mut sink, &StopFlag::new(), &mut scratch).unwrap();

        assert_eq!(bytes, 150);
        assert_eq!(sink.writes, vec![100, 50]);
        let mut expected = first;
        expected.extend_from_slice(&second);
        assert_eq!(sink.data, expected);
        // Two data reads plus the closing zero read.
        assert_eq!(mic.reads, 3);
        assert!(mic.started && mic.stopped);
    }

    #[test]
    fn stop_observed_without_another_read() {
        let mut mic = ScriptedMic::chunks(&[&pattern(64), &pattern(64), &pattern(64), &pattern(64)]);
        let flag = StopFlag::new();
        // The stop arrives while the second read is blocked in the device.
        mic.flip_during_read = Some((2, flag.clone()));
        let mut sink = RecordingSink::default();
        let mut scratch = vec![0u8; 64];

        let bytes = pump_capture(&mut mic, &mut sink, &flag, &mut scratch).unwrap();

        // The in-flight read completes and its bytes are persisted, then
        // the flag is seen at the next iteration boundary — no third read.
        assert_eq!(mic.reads, 2);
        assert_eq!(bytes, 128);
        assert_eq!(sink.writes, vec![64, 64]);
        assert!(mic.stopped);
    }

    #[test]
    fn flag_already_set_reads_nothing() {
        let mut mic = ScriptedMic::chunks(&[&pattern(64)]);
        let flag = StopFlag::new();
        flag.set();
        let mut sink = RecordingSink::default();
        let mut scratch = vec![0u8; 64];

        let bytes = pump_capture(&mut mic, &mut sink, &flag, &mut scratch).unwrap();

        assert_eq!(bytes, 0);
        assert_eq!(mic.reads, 0);
        assert!(sink.writes.is_empty());
        assert!(mic.started && mic.stopped);
    }

    #[test]
    fn third_read_failure_stops_after_two_writes() {
        let mut mic = ScriptedMic::new(vec![
            Ok(pattern(10)),
            Ok(pattern(10)),
            Err(AudioError::CaptureFailed("stream died".into())),
        ]);
        let mut sink = RecordingSink::default();
        let mut scratch = vec![0u8; 32];

        let result = pump_capture(&mut mic, &mut sink, &StopFlag::new(), &mut scratch);

        assert_eq!(
            result,
            Err(AudioError::CaptureFailed("stream died".into()))
        );
        assert_eq!(sink.writes.len(), 2);
        assert!(mic.stopped, "device must be released on failure");
    }

    #[test]
    fn sink_failure_surfaces_file_access_failed() {
        let mut mic = ScriptedMic::chunks(&[&pattern(16)]);
        let mut sink = FailingSink;
        let mut scratch = vec![0u8; 32];

        let result = pump_capture(&mut mic, &mut sink, &StopFlag::new(), &mut scratch);

        assert!(matches!(result, Err(AudioError::FileAccessFailed(_))));
        assert!(mic.stopped, "device must be released on sink failure");
    }
}
