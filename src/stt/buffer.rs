//! Per-session transcription buffer.
//!
//! Converts a stream of arbitrarily-sized audio chunks into well-sized
//! transcription requests. Audio accumulates until a minimum duration is
//! reached, then the whole buffer is transcribed and discarded. A maximum
//! duration bounds worst-case latency regardless of how the minimum is
//! tuned.
//!
//! Single-writer per session: the owning session's lock serializes `feed`
//! and `flush`. Raw samples never outlive one transcription attempt.

use crate::defaults;
use crate::report::ErrorReporter;
use crate::stt::transcriber::Transcriber;
use std::sync::Arc;

/// Configuration for the transcription buffer.
#[derive(Debug, Clone)]
pub struct TranscriptionBufferConfig {
    /// Minimum seconds of audio to accumulate before transcribing.
    pub min_secs: f64,
    /// Maximum seconds of audio to hold before forcing a transcription.
    pub max_secs: f64,
    /// Capture sample rate used for all duration arithmetic.
    pub sample_rate: u32,
}

impl Default for TranscriptionBufferConfig {
    fn default() -> Self {
        Self {
            min_secs: defaults::STT_MIN_BUFFER_SECS,
            max_secs: defaults::STT_MAX_BUFFER_SECS,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

/// Accumulates audio samples and invokes the transcriber at duration
/// thresholds.
pub struct TranscriptionBuffer {
    config: TranscriptionBufferConfig,
    transcriber: Arc<dyn Transcriber>,
    reporter: Arc<dyn ErrorReporter>,
    /// Samples waiting to be transcribed, in arrival order.
    pending: Vec<f32>,
}

impl TranscriptionBuffer {
    /// Creates a buffer feeding the given transcriber.
    pub fn new(
        config: TranscriptionBufferConfig,
        transcriber: Arc<dyn Transcriber>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            config,
            transcriber,
            reporter,
            pending: Vec::new(),
        }
    }

    /// Seconds of audio currently buffered.
    pub fn buffered_seconds(&self) -> f64 {
        self.pending.len() as f64 / f64::from(self.config.sample_rate)
    }

    /// Feeds one audio chunk into the buffer.
    ///
    /// Returns transcribed text once enough audio has accumulated, or an
    /// empty string while still buffering (the common, allocation-cheap
    /// case). Crossing `max_secs` forces a transcription even when
    /// `min_secs` would otherwise suppress it.
    pub fn feed(&mut self, samples: &[f32]) -> String {
        self.pending.extend_from_slice(samples);

        let buffered = self.buffered_seconds();
        if buffered < self.config.min_secs && buffered <= self.config.max_secs {
            return String::new();
        }

        self.transcribe_pending()
    }

    /// Transcribes whatever is buffered, even below the minimum threshold.
    ///
    /// Called once at session stop so trailing sub-threshold audio is not
    /// lost. Returns an empty string when nothing is buffered.
    pub fn flush(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        self.transcribe_pending()
    }

    /// Transcribes and unconditionally clears the pending samples.
    ///
    /// The buffer is cleared even when transcription fails: a single bad
    /// chunk must not abort the session or let the buffer grow without
    /// bound. Failures are reported and become "no text produced".
    fn transcribe_pending(&mut self) -> String {
        let samples = std::mem::take(&mut self.pending);

        match self
            .transcriber
            .transcribe(&samples, self.config.sample_rate)
        {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                self.reporter
                    .report("stt", &format!("transcription failed: {}", e));
                String::new()
            }
        }
    }
}
