//! cpal host and stream plumbing behind the `AudioBackend` trait.
//!
//! Devices are resolved and streams built inside each `open_*` call,
//! on the calling thread, because `cpal::Stream` is not `Send`. The
//! capture and playback loops open their device on their own worker
//! thread and keep it there.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};

use parrot_core::processing::pcm;
use parrot_core::{AudioBackend, AudioConfig, AudioError};

use crate::capture::CpalCaptureDevice;
use crate::pipe::{CapturePipe, PlaybackPipe};
use crate::playback::CpalPlaybackDevice;

/// Seconds of audio the capture pipe holds before dropping oldest.
const CAPTURE_PIPE_SECS: usize = 5;

/// Seconds of audio the playback pipe queues ahead of the device.
/// Writers block beyond this, which paces the playback loop.
const PLAYBACK_PIPE_SECS: usize = 1;

/// Audio backend over the system's default cpal host.
///
/// Devices may be pinned by name; `None` selects the system default at
/// open time, so a default-device change between runs is picked up
/// without rebuilding the backend.
pub struct CpalBackend {
    input_name: Option<String>,
    output_name: Option<String>,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self {
            input_name: None,
            output_name: None,
        }
    }

    /// Pin capture and/or playback to named devices.
    pub fn with_devices(input: Option<String>, output: Option<String>) -> Self {
        Self {
            input_name: input,
            output_name: output,
        }
    }

    fn input_device(&self) -> Result<cpal::Device, AudioError> {
        let host = cpal::default_host();
        match &self.input_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| {
                    AudioError::DeviceUnavailable(format!(
                        "failed to enumerate input devices: {}",
                        e
                    ))
                })?
                .find(|d| d.name().ok().as_deref() == Some(name.as_str()))
                .ok_or_else(|| {
                    AudioError::DeviceUnavailable(format!("input device not found: {}", name))
                }),
            None => host
                .default_input_device()
                .ok_or_else(|| AudioError::DeviceUnavailable("no default input device".into())),
        }
    }

    fn output_device(&self) -> Result<cpal::Device, AudioError> {
        let host = cpal::default_host();
        match &self.output_name {
            Some(name) => host
                .output_devices()
                .map_err(|e| {
                    AudioError::DeviceUnavailable(format!(
                        "failed to enumerate output devices: {}",
                        e
                    ))
                })?
                .find(|d| d.name().ok().as_deref() == Some(name.as_str()))
                .ok_or_else(|| {
                    AudioError::DeviceUnavailable(format!("output device not found: {}", name))
                }),
            None => host
                .default_output_device()
                .ok_or_else(|| AudioError::DeviceUnavailable("no default output device".into())),
        }
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for CpalBackend {
    type Capture = CpalCaptureDevice;
    type Playback = CpalPlaybackDevice;

    fn open_capture(&self, config: &AudioConfig) -> Result<CpalCaptureDevice, AudioError> {
        let device = self.input_device()?;
        let ranges = device.supported_input_configs().map_err(|e| {
            AudioError::DeviceUnavailable(format!("failed to query input configs: {}", e))
        })?;
        let shape = pick_shape(ranges, config.sample_rate)?;
        log::info!(
            "opening input device {} ({:?}, {} ch at {} Hz)",
            device.name().unwrap_or_else(|_| "unknown".into()),
            shape.format,
            shape.channels,
            config.sample_rate
        );

        let stream_config = StreamConfig {
            channels: shape.channels,
            sample_rate: SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        let pipe = Arc::new(CapturePipe::new(config.byte_rate() * CAPTURE_PIPE_SECS));
        let channels = shape.channels as usize;

        let data_pipe = Arc::clone(&pipe);
        let err_pipe = Arc::clone(&pipe);
        let err_fn = move |err: cpal::StreamError| {
            log::error!("input stream error: {}", err);
            err_pipe.fail(err.to_string());
        };

        let stream = match shape.format {
            SampleFormat::I16 => device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let mono = pcm::downmix_i16(data, channels);
                    data_pipe.push(&pcm::encode_i16_le(&mono));
                },
                err_fn,
                None,
            ),
            SampleFormat::F32 => device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mono = pcm::downmix_f32(data, channels);
                    data_pipe.push(&pcm::encode_f32_le(&mono));
                },
                err_fn,
                None,
            ),
            other => {
                return Err(AudioError::DeviceUnavailable(format!(
                    "unsupported input sample format: {:?}",
                    other
                )))
            }
        };
        let stream = stream.map_err(|e| {
            AudioError::DeviceUnavailable(format!("failed to build input stream: {}", e))
        })?;

        Ok(CpalCaptureDevice::new(stream, pipe, config.min_buffer_len()))
    }

    fn open_playback(&self, config: &AudioConfig) -> Result<CpalPlaybackDevice, AudioError> {
        let device = self.output_device()?;
        let ranges = device.supported_output_configs().map_err(|e| {
            AudioError::DeviceUnavailable(format!("failed to query output configs: {}", e))
        })?;
        let shape = pick_shape(ranges, config.sample_rate)?;
        log::info!(
            "opening output device {} ({:?}, {} ch at {} Hz)",
            device.name().unwrap_or_else(|_| "unknown".into()),
            shape.format,
            shape.channels,
            config.sample_rate
        );

        let stream_config = StreamConfig {
            channels: shape.channels,
            sample_rate: SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        let pipe = Arc::new(PlaybackPipe::new(config.byte_rate() * PLAYBACK_PIPE_SECS));
        let channels = shape.channels as usize;

        let data_pipe = Arc::clone(&pipe);
        let err_pipe = Arc::clone(&pipe);
        let err_fn = move |err: cpal::StreamError| {
            log::error!("output stream error: {}", err);
            err_pipe.fail(err.to_string());
        };

        let stream = match shape.format {
            SampleFormat::I16 => device.build_output_stream(
                &stream_config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    render_i16(&data_pipe, data, channels);
                },
                err_fn,
                None,
            ),
            SampleFormat::F32 => device.build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    render_f32(&data_pipe, data, channels);
                },
                err_fn,
                None,
            ),
            other => {
                return Err(AudioError::DeviceUnavailable(format!(
                    "unsupported output sample format: {:?}",
                    other
                )))
            }
        };
        let stream = stream.map_err(|e| {
            AudioError::DeviceUnavailable(format!("failed to build output stream: {}", e))
        })?;

        Ok(CpalPlaybackDevice::new(
            stream,
            pipe,
            config.byte_rate(),
            config.min_buffer_len(),
        ))
    }
}

/// The stream format and channel count to open a device with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StreamShape {
    format: SampleFormat,
    channels: u16,
}

/// Choose the best supported config for the fixed sample rate.
///
/// Mono beats multi-channel (no downmix or duplication needed), and
/// i16 beats f32 (the clip's native width). There is no resampling, so
/// a device that cannot run at the requested rate is unavailable.
fn pick_shape(
    ranges: impl Iterator<Item = cpal::SupportedStreamConfigRange>,
    sample_rate: u32,
) -> Result<StreamShape, AudioError> {
    let mut best: Option<(u16, u8, SampleFormat)> = None;
    for range in ranges {
        let rank = match range.sample_format() {
            SampleFormat::I16 => 0u8,
            SampleFormat::F32 => 1u8,
            _ => continue,
        };
        if range.min_sample_rate().0 > sample_rate || range.max_sample_rate().0 < sample_rate {
            continue;
        }
        let channels = range.channels();
        if channels == 0 {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_channels, best_rank, _)) => (channels, rank) < (best_channels, best_rank),
        };
        if better {
            best = Some((channels, rank, range.sample_format()));
        }
    }
    best.map(|(channels, _, format)| StreamShape { format, channels })
        .ok_or_else(|| {
            AudioError::DeviceUnavailable(format!(
                "no supported stream configuration at {} Hz",
                sample_rate
            ))
        })
}

/// Fill an i16 output buffer from the pipe, duplicating the mono clip
/// across channels and zero-filling once the pipe runs dry.
fn render_i16(pipe: &PlaybackPipe, out: &mut [i16], channels: usize) {
    let frames = out.len() / channels.max(1);
    let mut bytes = vec![0u8; frames * 2];
    let got = pipe.pop_into(&mut bytes);
    let samples = pcm::decode_i16_le(&bytes[..got]);
    for (frame, chunk) in out.chunks_mut(channels.max(1)).enumerate() {
        let sample = samples.get(frame).copied().unwrap_or(0);
        chunk.fill(sample);
    }
}

/// f32 variant of [`render_i16`].
fn render_f32(pipe: &PlaybackPipe, out: &mut [f32], channels: usize) {
    let frames = out.len() / channels.max(1);
    let mut bytes = vec![0u8; frames * 2];
    let got = pipe.pop_into(&mut bytes);
    let samples = pcm::decode_i16_le(&bytes[..got]);
    for (frame, chunk) in out.chunks_mut(channels.max(1)).enumerate() {
        let sample = samples.get(frame).map(|&s| pcm::i16_to_f32(s)).unwrap_or(0.0);
        chunk.fill(sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(
        channels: u16,
        min_rate: u32,
        max_rate: u32,
        format: SampleFormat,
    ) -> cpal::SupportedStreamConfigRange {
        cpal::SupportedStreamConfigRange::new(
            channels,
            SampleRate(min_rate),
            SampleRate(max_rate),
            cpal::SupportedBufferSize::Unknown,
            format,
        )
    }

    #[test]
    fn shape_prefers_mono_i16() {
        let ranges = vec![
            range(2, 8000, 96000, SampleFormat::F32),
            range(1, 44100, 44100, SampleFormat::I16),
            range(2, 8000, 96000, SampleFormat::I16),
        ];
        let shape = pick_shape(ranges.into_iter(), 44100).unwrap();
        assert_eq!(
            shape,
            StreamShape {
                format: SampleFormat::I16,
                channels: 1
            }
        );
    }

    #[test]
    fn shape_falls_back_to_stereo_f32() {
        let ranges = vec![range(2, 8000, 96000, SampleFormat::F32)];
        let shape = pick_shape(ranges.into_iter(), 44100).unwrap();
        assert_eq!(
            shape,
            StreamShape {
                format: SampleFormat::F32,
                channels: 2
            }
        );
    }

    #[test]
    fn shape_rejects_rate_outside_every_range() {
        let ranges = vec![
            range(1, 8000, 16000, SampleFormat::I16),
            range(2, 48000, 96000, SampleFormat::F32),
        ];
        let err = pick_shape(ranges.into_iter(), 44100).unwrap_err();
        assert_eq!(
            err,
            AudioError::DeviceUnavailable("no supported stream configuration at 44100 Hz".into())
        );
    }

    #[test]
    fn shape_mono_f32_beats_stereo_i16() {
        let ranges = vec![
            range(2, 8000, 96000, SampleFormat::I16),
            range(1, 8000, 96000, SampleFormat::F32),
        ];
        let shape = pick_shape(ranges.into_iter(), 44100).unwrap();
        assert_eq!(
            shape,
            StreamShape {
                format: SampleFormat::F32,
                channels: 1
            }
        );
    }

    #[test]
    fn render_i16_duplicates_mono_and_pads() {
        let pipe = PlaybackPipe::new(64);
        pipe.write_blocking(&pcm::encode_i16_le(&[100, -200])).unwrap();

        let mut out = [99i16; 6]; // 3 stereo frames, one more than queued
        render_i16(&pipe, &mut out, 2);
        assert_eq!(out, [100, 100, -200, -200, 0, 0]);
    }

    #[test]
    fn render_f32_scales_back_to_unit_range() {
        let pipe = PlaybackPipe::new(64);
        pipe.write_blocking(&pcm::encode_i16_le(&[i16::MAX, 0])).unwrap();

        let mut out = [9.9f32; 2];
        render_f32(&pipe, &mut out, 1);
        assert!((out[0] - 1.0).abs() < 1e-4);
        assert_eq!(out[1], 0.0);
    }

    #[test]
    fn render_from_empty_pipe_is_silence() {
        let pipe = PlaybackPipe::new(64);
        let mut out = [7i16; 4];
        render_i16(&pipe, &mut out, 2);
        assert_eq!(out, [0; 4]);
    }
}
