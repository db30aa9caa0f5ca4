//! Pure sample math for the fixed S16LE stream format.
//!
//! Backends capture and render in whatever native format their device
//! offers (i16 or f32, one or more channels) and use these helpers to
//! bring the data to and from the clip's mono 16-bit little-endian byte
//! stream. No platform dependencies.

/// Convert one f32 sample in `[-1.0, 1.0]` to 16-bit PCM, clamping
/// out-of-range values.
pub fn f32_to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    (clamped * i16::MAX as f32) as i16
}

/// Inverse of [`f32_to_i16`]; full-scale i16 maps back to ±1.0.
pub fn i16_to_f32(sample: i16) -> f32 {
    sample as f32 / i16::MAX as f32
}

/// Pack i16 samples into little-endian bytes. Output length =
/// `samples.len() * 2`.
pub fn encode_i16_le(samples: &[i16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

/// Convert f32 samples straight to 16-bit little-endian PCM bytes.
pub fn encode_f32_le(samples: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        data.extend_from_slice(&f32_to_i16(sample).to_le_bytes());
    }
    data
}

/// Unpack little-endian bytes into i16 samples. A trailing odd byte,
/// which a well-formed clip never contains, is ignored.
pub fn decode_i16_le(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Downmix interleaved multi-channel i16 audio to mono by averaging
/// channels per frame.
pub fn downmix_i16(samples: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let frame_count = samples.len() / channels;
    let mut mono = Vec::with_capacity(frame_count);
    for frame in 0..frame_count {
        let mut sum = 0i32;
        for ch in 0..channels {
            sum += samples[frame * channels + ch] as i32;
        }
        mono.push((sum / channels as i32) as i16);
    }
    mono
}

/// Downmix interleaved multi-channel f32 audio to mono by averaging
/// channels per frame.
pub fn downmix_f32(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let frame_count = samples.len() / channels;
    let scale = 1.0 / channels as f32;
    let mut mono = Vec::with_capacity(frame_count);
    for frame in 0..frame_count {
        let mut sum = 0.0f32;
        for ch in 0..channels {
            sum += samples[frame * channels + ch];
        }
        mono.push(sum * scale);
    }
    mono
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn f32_conversion_clamps() {
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(f32_to_i16(1.0), i16::MAX);
        assert_eq!(f32_to_i16(2.5), i16::MAX);
        assert_eq!(f32_to_i16(-2.5), -i16::MAX);
    }

    #[test]
    fn f32_round_trip_is_near_identity() {
        for &sample in &[-1.0f32, -0.5, 0.0, 0.25, 1.0] {
            let back = i16_to_f32(f32_to_i16(sample));
            assert_relative_eq!(back, sample, epsilon = 1e-4);
        }
    }

    #[test]
    fn encode_i16_is_little_endian() {
        let bytes = encode_i16_le(&[0x0102, -2]);
        assert_eq!(bytes, vec![0x02, 0x01, 0xFE, 0xFF]);
    }

    #[test]
    fn decode_inverts_encode() {
        let samples = vec![0, 1, -1, i16::MAX, i16::MIN, 12345];
        assert_eq!(decode_i16_le(&encode_i16_le(&samples)), samples);
    }

    #[test]
    fn decode_drops_trailing_odd_byte() {
        assert_eq!(decode_i16_le(&[0x02, 0x01, 0x07]), vec![0x0102]);
    }

    #[test]
    fn encode_f32_full_scale() {
        let bytes = encode_f32_le(&[1.0, -1.0]);
        assert_eq!(decode_i16_le(&bytes), vec![i16::MAX, -i16::MAX]);
    }

    #[test]
    fn downmix_i16_averages_pairs() {
        let stereo = [100, 300, -50, 50];
        assert_eq!(downmix_i16(&stereo, 2), vec![200, 0]);
    }

    #[test]
    fn downmix_f32_averages_pairs() {
        let stereo = [0.2, 0.8, 0.4, 0.6];
        let mono = downmix_f32(&stereo, 2);
        assert_eq!(mono.len(), 2);
        assert_relative_eq!(mono[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(mono[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn downmix_mono_passthrough() {
        let samples = vec![1i16, 2, 3];
        assert_eq!(downmix_i16(&samples, 1), samples);
        let samples = vec![0.1f32, 0.2, 0.3];
        assert_eq!(downmix_f32(&samples, 1), samples);
    }
}
