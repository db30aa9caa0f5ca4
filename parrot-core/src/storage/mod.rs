//! Clip file IO: the raw PCM clip itself and its JSON sidecar.

pub mod clip;
pub mod sidecar;

pub use clip::{sha256_file, ClipReader, ClipWriter};
pub use sidecar::{read_sidecar, write_sidecar};
