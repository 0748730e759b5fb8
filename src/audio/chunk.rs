//! Validated in-memory audio chunk.

use serde::{Deserialize, Serialize};

/// Where a chunk of audio came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    /// Microphone input.
    Input,
    /// System/loopback output.
    Output,
    /// Mixed capture (e.g. screen-capture audio tap).
    Capture,
}

impl Default for SourceTag {
    fn default() -> Self {
        SourceTag::Capture
    }
}

/// One validated chunk of mono float32 PCM.
///
/// Ephemeral: owned by exactly one buffer at a time, never persisted, and
/// dropped as soon as its samples are folded into a transcription buffer.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Mono samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate the audio was captured at. Durations are always derived
    /// from this rate, never from a model's internal rate.
    pub sample_rate: u32,
    /// Caller-supplied capture timestamp (seconds since an arbitrary epoch).
    pub capture_timestamp: f64,
    /// Source of the audio.
    pub source: SourceTag,
}

impl AudioChunk {
    /// Creates a chunk from already-validated samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32, capture_timestamp: f64) -> Self {
        Self {
            samples,
            sample_rate,
            capture_timestamp,
            source: SourceTag::default(),
        }
    }

    /// Sets the source tag.
    pub fn with_source(mut self, source: SourceTag) -> Self {
        self.source = source;
        self
    }

    /// Duration in seconds, computed from the capture sample rate.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_capture_rate() {
        let chunk = AudioChunk::new(vec![0.0; 16000], 16000, 0.0);
        assert_eq!(chunk.duration_secs(), 1.0);

        let chunk = AudioChunk::new(vec![0.0; 16000], 48000, 0.0);
        assert!((chunk.duration_secs() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_source_is_capture() {
        let chunk = AudioChunk::new(vec![], 16000, 0.0);
        assert_eq!(chunk.source, SourceTag::Capture);
    }

    #[test]
    fn test_with_source() {
        let chunk = AudioChunk::new(vec![], 16000, 0.0).with_source(SourceTag::Input);
        assert_eq!(chunk.source, SourceTag::Input);
    }

    #[test]
    fn test_source_tag_serde() {
        assert_eq!(
            serde_json::to_string(&SourceTag::Output).unwrap(),
            "\"output\""
        );
        let tag: SourceTag = serde_json::from_str("\"input\"").unwrap();
        assert_eq!(tag, SourceTag::Input);
    }
}
