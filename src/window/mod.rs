//! Time-windowed transcript accumulation.
//!
//! Transcribed text lands here as segments. Segments collect into the
//! current window; once the window duration elapses the window is
//! finalized into a single chunk of text and queued for summarization.
//! A bounded ring of recent segments supports stats and live display.

use crate::audio::SourceTag;
use crate::defaults;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

/// Trait for time operations, allowing mock time in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Real system clock using `std::time::Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// One transcribed utterance with its arrival time and origin.
#[derive(Debug, Clone)]
pub struct TranscriptSegment {
    pub text: String,
    pub received_at: Instant,
    pub source: SourceTag,
}

/// Configuration for transcript windowing.
#[derive(Debug, Clone, Copy)]
pub struct WindowConfig {
    /// Wall-clock duration of one summarization window, in seconds.
    pub window_secs: u64,
    /// Maximum segments retained in the observability ring.
    pub max_segments: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_secs: defaults::WINDOW_SECS,
            max_segments: defaults::MAX_BUFFER_SEGMENTS,
        }
    }
}

/// Point-in-time view of the window state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Segments currently held in the ring.
    pub segment_count: usize,
    /// Finalized window chunks awaiting summarization.
    pub pending_chunks: usize,
    /// Total characters across ring segments.
    pub total_chars: usize,
    /// Ring occupancy in `[0.0, 1.0]`.
    pub buffer_usage: f64,
}

/// Accumulates transcript segments and emits window-sized text chunks.
pub struct TranscriptWindow {
    config: WindowConfig,
    clock: Arc<dyn Clock>,
    /// Bounded ring of recent segments. Oldest evicted first.
    segments: VecDeque<TranscriptSegment>,
    /// Texts belonging to the window currently being filled.
    current: Vec<String>,
    /// Finalized window texts queued for summarization, oldest first.
    pending: VecDeque<String>,
    window_start: Instant,
}

impl TranscriptWindow {
    /// Creates a window using the real system clock.
    pub fn new(config: WindowConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a window with an injected clock.
    pub fn with_clock(config: WindowConfig, clock: Arc<dyn Clock>) -> Self {
        let window_start = clock.now();
        Self {
            config,
            clock,
            segments: VecDeque::new(),
            current: Vec::new(),
            pending: VecDeque::new(),
            window_start,
        }
    }

    /// Adds one transcript segment.
    ///
    /// If the window duration has elapsed, the current window — including
    /// this segment — is finalized into a pending chunk and a fresh window
    /// starts now. Blank text is ignored.
    pub fn add_segment(&mut self, text: &str, source: SourceTag) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let now = self.clock.now();
        if self.segments.len() >= self.config.max_segments {
            self.segments.pop_front();
        }
        self.segments.push_back(TranscriptSegment {
            text: text.to_string(),
            received_at: now,
            source,
        });
        self.current.push(text.to_string());

        if now.duration_since(self.window_start).as_secs() >= self.config.window_secs {
            self.finalize_current();
            self.window_start = now;
        }
    }

    /// Whether a finalized chunk is waiting to be summarized.
    pub fn should_summarize(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Takes the oldest pending chunk, if any.
    pub fn next_chunk(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    /// Finalizes the partially-filled window and returns its text directly,
    /// bypassing the pending queue.
    ///
    /// Used at session stop so the tail of the conversation is summarized
    /// without waiting for the window timer. Returns `None` when the
    /// current window is empty; calling again is a no-op.
    pub fn force_finalize(&mut self) -> Option<String> {
        if self.current.is_empty() {
            return None;
        }
        let text = self.current.join(" ");
        self.current.clear();
        self.window_start = self.clock.now();
        Some(text)
    }

    /// Full text of the retained ring, space-joined in arrival order.
    pub fn snapshot(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The last `n` segment texts, oldest first.
    pub fn recent_segments(&self, n: usize) -> Vec<String> {
        let skip = self.segments.len().saturating_sub(n);
        self.segments
            .iter()
            .skip(skip)
            .map(|s| s.text.clone())
            .collect()
    }

    pub fn stats(&self) -> WindowStats {
        let total_chars = self.segments.iter().map(|s| s.text.len()).sum();
        WindowStats {
            segment_count: self.segments.len(),
            pending_chunks: self.pending.len(),
            total_chars,
            buffer_usage: self.segments.len() as f64 / self.config.max_segments as f64,
        }
    }

    /// Discards all retained transcript text.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.current.clear();
        self.pending.clear();
        self.window_start = self.clock.now();
    }

    fn finalize_current(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let text = self.current.join(" ");
        self.current.clear();
        self.pending.push_back(text);
    }
}
