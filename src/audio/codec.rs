//! PCM payload decoding and validation.
//!
//! Inbound audio is little-endian 32-bit float mono PCM, optionally
//! base64-wrapped for transport. All functions here are pure and safe to
//! call concurrently.

use crate::defaults;
use crate::error::{Result, SottoError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Decodes a raw little-endian float32 mono PCM payload.
///
/// Returns the samples and their duration in seconds. Duration is computed
/// from the caller-supplied capture sample rate — resampling happens
/// downstream and must not corrupt window timing.
pub fn decode_pcm(bytes: &[u8], sample_rate: u32) -> Result<(Vec<f32>, f64)> {
    validate_sample_rate(sample_rate)?;

    if bytes.len() % 4 != 0 {
        return Err(SottoError::AudioDecode {
            message: format!(
                "PCM payload length ({} bytes) is not a multiple of 4 (float32 size)",
                bytes.len()
            ),
        });
    }

    let samples: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    validate_range(&samples)?;

    let duration = samples.len() as f64 / f64::from(sample_rate);
    Ok((samples, duration))
}

/// Decodes a base64-wrapped float32 mono PCM payload.
pub fn decode_pcm_base64(pcm_b64: &str, sample_rate: u32) -> Result<(Vec<f32>, f64)> {
    let bytes = BASE64
        .decode(pcm_b64)
        .map_err(|e| SottoError::AudioDecode {
            message: format!("failed to decode base64: {}", e),
        })?;
    decode_pcm(&bytes, sample_rate)
}

/// Encodes samples as little-endian float32 PCM bytes.
pub fn encode_pcm(samples: &[f32]) -> Result<Vec<u8>> {
    validate_range(samples)?;
    let mut bytes = Vec::with_capacity(samples.len() * 4);
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    Ok(bytes)
}

/// Encodes samples as a base64-wrapped PCM payload.
pub fn encode_pcm_base64(samples: &[f32]) -> Result<String> {
    Ok(BASE64.encode(encode_pcm(samples)?))
}

/// Validates that samples fall within [-1.0, 1.0] plus a small tolerance.
///
/// Empty input is valid. Rejecting out-of-range samples guards against
/// mis-scaled PCM (e.g. int16 values passed as floats).
pub fn validate_range(samples: &[f32]) -> Result<()> {
    if samples.is_empty() {
        return Ok(());
    }

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &s in samples {
        min = min.min(s);
        max = max.max(s);
    }

    let tol = defaults::RANGE_TOLERANCE;
    if min < -1.0 - tol || max > 1.0 + tol {
        return Err(SottoError::AudioRange { min, max });
    }
    Ok(())
}

/// Validates that a claimed sample rate is within [8000, 96000] Hz.
pub fn validate_sample_rate(sample_rate: u32) -> Result<()> {
    if !(defaults::MIN_SAMPLE_RATE..=defaults::MAX_SAMPLE_RATE).contains(&sample_rate) {
        return Err(SottoError::SampleRate { rate: sample_rate });
    }
    Ok(())
}
