use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::AudioError;

/// Truncating writer for the raw PCM clip file.
///
/// The clip lives at one fixed path and is rewritten from scratch on
/// every recording, so `create` always truncates. Bytes land in file
/// order exactly as written; `finish` flushes and returns the SHA-256
/// of the completed file.
pub struct ClipWriter {
    path: PathBuf,
    file: File,
    bytes_written: u64,
}

impl ClipWriter {
    /// Create (or truncate) the clip file, creating parent directories
    /// as needed.
    pub fn create(path: &Path) -> Result<Self, AudioError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AudioError::FileAccessFailed(format!("failed to create directory: {}", e))
                })?;
            }
        }

        let file = File::create(path)
            .map_err(|e| AudioError::FileAccessFailed(format!("failed to create clip: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            bytes_written: 0,
        })
    }

    /// Total bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, close, and return the hex SHA-256 of the written file.
    pub fn finish(mut self) -> Result<String, AudioError> {
        self.file
            .flush()
            .map_err(|e| AudioError::FileAccessFailed(format!("flush failed: {}", e)))?;
        drop(self.file);
        sha256_file(&self.path)
    }
}

impl Write for ClipWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.file.write(buf)?;
        self.bytes_written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Sequential reader for the clip file.
///
/// A missing clip is not an error: nothing was ever recorded, and
/// playback simply has nothing to do. `open` distinguishes "absent"
/// (`Ok(None)`) from genuine access failures.
pub struct ClipReader {
    file: File,
}

impl ClipReader {
    pub fn open(path: &Path) -> Result<Option<Self>, AudioError> {
        match File::open(path) {
            Ok(file) => Ok(Some(Self { file })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AudioError::FileAccessFailed(format!(
                "failed to open clip: {}",
                e
            ))),
        }
    }

    /// Length of the clip in bytes.
    pub fn len(&self) -> Result<u64, AudioError> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| AudioError::FileAccessFailed(format!("failed to stat clip: {}", e)))
    }
}

impl Read for ClipReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

/// Compute SHA-256 hex digest of a file.
pub fn sha256_file(path: &Path) -> Result<String, AudioError> {
    let data = fs::read(path).map_err(|e| {
        AudioError::FileAccessFailed(format!("failed to read file for checksum: {}", e))
    })?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_clip_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("parrot_clip_test_{}", name))
    }

    #[test]
    fn write_counts_bytes_and_checksums() {
        let path = temp_clip_path("counts.pcm");

        let mut writer = ClipWriter::create(&path).unwrap();
        writer.write_all(&[1u8, 2, 3, 4]).unwrap();
        writer.write_all(&[5u8, 6]).unwrap();
        assert_eq!(writer.bytes_written(), 6);

        let checksum = writer.finish().unwrap();
        assert_eq!(checksum.len(), 64);
        assert_eq!(checksum, sha256_file(&path).unwrap());
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3, 4, 5, 6]);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn create_truncates_previous_clip() {
        let path = temp_clip_path("truncates.pcm");

        let mut writer = ClipWriter::create(&path).unwrap();
        writer.write_all(&[0xAA; 32]).unwrap();
        writer.finish().unwrap();

        let writer = ClipWriter::create(&path).unwrap();
        writer.finish().unwrap();
        assert_eq!(fs::read(&path).unwrap().len(), 0);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn reader_distinguishes_missing_from_failing() {
        let path = temp_clip_path("never_written.pcm");
        fs::remove_file(&path).ok();
        assert!(ClipReader::open(&path).unwrap().is_none());
    }

    #[test]
    fn reader_round_trips_written_bytes() {
        let path = temp_clip_path("round_trip.pcm");

        let mut writer = ClipWriter::create(&path).unwrap();
        writer.write_all(&[9u8, 8, 7]).unwrap();
        writer.finish().unwrap();

        let mut reader = ClipReader::open(&path).unwrap().unwrap();
        assert_eq!(reader.len().unwrap(), 3);
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, vec![9, 8, 7]);

        fs::remove_file(&path).ok();
    }
}
