//! Platform-free sample processing.

pub mod pcm;
