use std::io::Read;

use super::StopFlag;
use crate::models::error::AudioError;
use crate::traits::device::PlaybackDevice;

/// Run one playback pass: start the device, copy the source to it until
/// exhaustion or cancellation, then stop the device (which flushes).
///
/// Per-iteration contract:
/// - the cancellation token is polled at the top, mirroring the capture
///   loop, so a cancel takes effect at the next read/write boundary;
/// - each `read` fills at most the scratch buffer and each `write`
///   carries exactly the bytes read — the final write of a clip whose
///   length is not a multiple of the scratch size is the exact
///   remainder, never padded;
/// - a zero read means the source is exhausted and ends the run.
///
/// On success (including cancellation) `stop` must flush what the
/// device already accepted, and its failure fails the run as
/// `PlaybackFailed` — silence where audio was promised is an error. On
/// a mid-run failure the device is stopped best-effort and the original
/// error wins.
///
/// Returns the total bytes handed to the device.
pub fn pump_playback<R, D>(
    source: &mut R,
    device: &mut D,
    cancel: &StopFlag,
    scratch: &mut [u8],
) -> Result<u64, AudioError>
where
    R: Read,
    D: PlaybackDevice,
{
    device.start()?;
    match copy_clip(source, device, cancel, scratch) {
        Ok(bytes) => {
            device.stop()?;
            Ok(bytes)
        }
        Err(run_err) => {
            if let Err(e) = device.stop() {
                log::warn!("playback device stop failed during abort: {}", e);
            }
            Err(run_err)
        }
    }
}

fn copy_clip<R, D>(
    source: &mut R,
    device: &mut D,
    cancel: &StopFlag,
    scratch: &mut [u8],
) -> Result<u64, AudioError>
where
    R: Read,
    D: PlaybackDevice,
{
    let mut total: u64 = 0;
    while !cancel.is_set() {
        let read = source
            .read(scratch)
            .map_err(|e| AudioError::FileAccessFailed(format!("failed to read clip: {}", e)))?;
        if read == 0 {
            break;
        }
        device.write(&scratch[..read])?;
        total += read as u64;
    }
    Ok(total)
}
