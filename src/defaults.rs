//! Default configuration constants for sotto.
//!
//! This module provides shared constants used across different configuration
//! types to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Lowest sample rate accepted from callers.
pub const MIN_SAMPLE_RATE: u32 = 8000;

/// Highest sample rate accepted from callers.
pub const MAX_SAMPLE_RATE: u32 = 96000;

/// Tolerance applied when validating the [-1.0, 1.0] PCM sample range.
///
/// Guards against floating point error in correctly scaled audio while still
/// rejecting mis-scaled PCM (e.g. int16 values passed as floats).
pub const RANGE_TOLERANCE: f32 = 1e-6;

/// Minimum seconds of audio to accumulate before invoking the transcriber.
///
/// Longer buffers (3-5s) give the STT model more context and fewer word
/// cutoffs; shorter buffers lower latency but fragment the transcript.
pub const STT_MIN_BUFFER_SECS: f64 = 3.0;

/// Maximum seconds of audio the transcription buffer may hold.
///
/// Crossing this bound forces a transcription regardless of the minimum,
/// which caps worst-case latency no matter how the minimum is tuned.
pub const STT_MAX_BUFFER_SECS: f64 = 10.0;

/// Default transcript window duration in seconds (one map-reduce chunk).
///
/// Each window of transcript is condensed into one intermediate summary;
/// 5 minutes keeps chunk summaries coherent without letting raw text
/// accumulate for long.
pub const WINDOW_SECS: u64 = 300;

/// Maximum transcript segments retained in the diagnostics ring buffer.
///
/// Oldest segments are discarded first. The ring is never summarization
/// input; it exists for stats and the low-content check at stop time.
pub const MAX_BUFFER_SEGMENTS: usize = 2000;

/// Max tokens for individual chunk summaries (MAP phase, concise).
pub const CHUNK_SUMMARY_MAX_TOKENS: u32 = 300;

/// Max tokens for the final summary (REDUCE phase, 3-5 paragraphs).
pub const FINAL_SUMMARY_MAX_TOKENS: u32 = 1200;

/// Max tokens for the structured-extraction pass.
pub const EXTRACTION_MAX_TOKENS: u32 = 2000;

/// Below this many words of total transcript a stopped session is judged
/// to have insufficient content and the LLM is not invoked.
pub const LOW_CONTENT_MIN_WORDS: usize = 10;

/// Below this many characters of total transcript a stopped session is
/// judged to have insufficient content and the LLM is not invoked.
pub const LOW_CONTENT_MIN_CHARS: usize = 50;

/// Default speech-to-text model identifier.
pub const DEFAULT_STT_MODEL: &str = "base.en";

/// Default text-generation model identifier.
pub const DEFAULT_LLM_MODEL: &str = "qwen3:4b-instruct";

/// Canned final summary used when a session stops with essentially no
/// captured speech.
pub const INSUFFICIENT_CONTENT_SUMMARY: &str =
    "No usable audio was captured for this session. Check your capture configuration.";

/// Fixed REDUCE result when no intermediate summaries exist.
pub const NO_CONTENT_MESSAGE: &str =
    "No content to summarize. No intermediate summaries available.";
