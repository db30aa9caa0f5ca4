//! # parrot-cpal
//!
//! cpal backend for parrot-core.
//!
//! Provides:
//! - `CpalBackend` — opens capture and playback devices on the default host
//! - `CpalCaptureDevice` / `CpalPlaybackDevice` — blocking device handles over cpal streams
//! - `devices` — input/output device enumeration
//! - `MicProbeGate` — best-effort microphone access probe
//!
//! ## Usage
//! ```ignore
//! use parrot_core::{AudioConfig, Recorder};
//! use parrot_cpal::CpalBackend;
//!
//! let backend = CpalBackend::new();
//! let recorder = Recorder::new(backend, AudioConfig::default(), "clip.pcm").unwrap();
//! let session = recorder.begin_capture().unwrap();
//! ```

pub mod backend;
pub mod capture;
pub mod devices;
pub mod gate;
pub mod pipe;
pub mod playback;

pub use backend::CpalBackend;
pub use capture::CpalCaptureDevice;
pub use devices::{list_input_devices, list_output_devices, DeviceInfo};
pub use gate::MicProbeGate;
pub use playback::CpalPlaybackDevice;
