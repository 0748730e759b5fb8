//! Session lifecycle: per-session pipeline state and the manager that
//! owns it.
//!
//! A session wires one transcription buffer, one transcript window, and
//! one map-reduce summarizer together. The manager serializes ingest and
//! stop per session and enforces the single-active-session policy.

pub mod artifacts;
pub mod manager;

pub use manager::SessionManager;

use crate::audio::{AudioChunk, SourceTag};
use crate::config::Config;
use crate::defaults;
use crate::llm::{LlmBackend, PromptSet};
use crate::stt::{SttBackend, TranscriptionBuffer};
use crate::summarize::{MapReduceSummarizer, MeetingData};
use crate::window::{TranscriptWindow, WindowStats};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::str::FromStr;

/// Lifecycle state of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Accepting audio.
    Active,
    /// Stop in progress; audio is rejected.
    Processing,
    /// Finished. Terminal; ids are never reused.
    Stopped,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Processing => "processing",
            SessionStatus::Stopped => "stopped",
        }
    }
}

/// Everything a session needs at creation time.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub session_id: String,
    pub stt_backend: SttBackend,
    pub stt_model: String,
    pub capture_sample_rate: u32,
    pub llm_backend: LlmBackend,
    pub llm_model: String,
    pub prompts: PromptSet,
    pub output_dir: PathBuf,
    pub csv_path: PathBuf,
    pub append_csv: bool,
    pub window_secs: u64,
    pub max_buffer_segments: usize,
    pub chunk_summary_max_tokens: u32,
    pub final_summary_max_tokens: u32,
    pub stt_min_buffer_secs: f64,
    pub stt_max_buffer_secs: f64,
}

impl SessionConfig {
    /// A config with library defaults for everything but the id.
    pub fn new(session_id: &str) -> Self {
        Self::from_config(session_id, &Config::default())
    }

    /// Builds a session config from the crate configuration.
    ///
    /// Unknown backend strings fall back to the defaults; the config
    /// should have been validated before reaching here.
    pub fn from_config(session_id: &str, config: &Config) -> Self {
        let prompts = PromptSet {
            chunk_summary: config
                .summary
                .chunk_summary_prompt
                .clone()
                .unwrap_or_else(|| PromptSet::default().chunk_summary),
            final_summary: config
                .summary
                .final_summary_prompt
                .clone()
                .unwrap_or_else(|| PromptSet::default().final_summary),
            data_extraction: config
                .summary
                .data_extraction_prompt
                .clone()
                .unwrap_or_else(|| PromptSet::default().data_extraction),
        };

        Self {
            session_id: session_id.to_string(),
            stt_backend: SttBackend::from_str(&config.stt.backend)
                .unwrap_or(SttBackend::Whisper),
            stt_model: config.stt.model.clone(),
            capture_sample_rate: config.audio.sample_rate,
            llm_backend: LlmBackend::from_str(&config.llm.backend)
                .unwrap_or(LlmBackend::Ollama),
            llm_model: config.llm.model.clone(),
            prompts,
            output_dir: config.output.dir.clone(),
            csv_path: config.output.csv_path.clone(),
            append_csv: config.output.append_csv,
            window_secs: config.summary.window_secs,
            max_buffer_segments: config.summary.max_buffer_segments,
            chunk_summary_max_tokens: config.llm.chunk_summary_max_tokens,
            final_summary_max_tokens: config.llm.final_summary_max_tokens,
            stt_min_buffer_secs: config.stt.min_buffer_secs,
            stt_max_buffer_secs: config.stt.max_buffer_secs,
        }
    }
}

/// Returned from each audio submission.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReceipt {
    /// Text transcribed by this submission, empty while still buffering.
    pub transcript: String,
    /// Seconds of audio awaiting transcription.
    pub buffered_seconds: f64,
    /// Transcript segments currently retained; callers use this as a
    /// backpressure signal.
    pub queue_depth: usize,
}

/// How a stop call concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopStatus {
    /// Artifacts written from real content.
    Completed,
    /// Too little transcript to summarize; canned summary written.
    InsufficientContent,
    /// Session was already stopped; nothing recomputed.
    AlreadyStopped,
}

impl StopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopStatus::Completed => "completed",
            StopStatus::InsufficientContent => "insufficient_content",
            StopStatus::AlreadyStopped => "already_stopped",
        }
    }
}

/// Result of stopping a session.
#[derive(Debug, Clone, PartialEq)]
pub struct StopOutcome {
    pub status: StopStatus,
    pub summary_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
    pub csv_path: Option<PathBuf>,
}

impl StopOutcome {
    pub(crate) fn already_stopped() -> Self {
        Self {
            status: StopStatus::AlreadyStopped,
            summary_path: None,
            data_path: None,
            csv_path: None,
        }
    }
}

/// Point-in-time session statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub session_id: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub audio_chunks_received: u64,
    pub total_audio_duration: f64,
    pub window: WindowStats,
    pub intermediate_summaries: usize,
}

/// One live session's pipeline state. Accessed only under the session
/// lock held by the manager.
pub(crate) struct Session {
    pub(crate) config: SessionConfig,
    pub(crate) status: SessionStatus,
    created_at: DateTime<Utc>,
    buffer: TranscriptionBuffer,
    window: TranscriptWindow,
    summarizer: MapReduceSummarizer,
    audio_chunks_received: u64,
    total_audio_duration: f64,
}

impl Session {
    pub(crate) fn new(
        config: SessionConfig,
        buffer: TranscriptionBuffer,
        window: TranscriptWindow,
        summarizer: MapReduceSummarizer,
    ) -> Self {
        Self {
            config,
            status: SessionStatus::Active,
            created_at: Utc::now(),
            buffer,
            window,
            summarizer,
            audio_chunks_received: 0,
            total_audio_duration: 0.0,
        }
    }

    /// Feeds one audio chunk through the pipeline.
    ///
    /// Transcription and MAP summarization happen inline, so the caller's
    /// submission rate is naturally limited by pipeline throughput.
    pub(crate) fn ingest(&mut self, chunk: &AudioChunk) -> IngestReceipt {
        self.audio_chunks_received += 1;
        self.total_audio_duration += chunk.duration_secs();

        let transcript = self.buffer.feed(&chunk.samples);
        if !transcript.is_empty() {
            self.window.add_segment(&transcript, chunk.source);
        }
        self.drain_pending_windows();

        IngestReceipt {
            transcript,
            buffered_seconds: self.buffer.buffered_seconds(),
            queue_depth: self.window.stats().segment_count,
        }
    }

    /// Runs the stop protocol up to (not including) persistence.
    ///
    /// Returns the final summary text, the structured data, and whether
    /// the session had enough content to summarize.
    pub(crate) fn finish(&mut self) -> (String, MeetingData, StopStatus) {
        // Trailing audio below the buffering threshold still counts.
        let tail = self.buffer.flush();
        if !tail.is_empty() {
            self.window.add_segment(&tail, SourceTag::Capture);
        }
        self.drain_pending_windows();

        // Low-content gate runs before any stop-path LLM call: a session
        // with essentially no transcript must not reach the model at all.
        if self.summarizer.intermediate_count() == 0 && self.is_low_content() {
            return (
                defaults::INSUFFICIENT_CONTENT_SUMMARY.to_string(),
                MeetingData::default(),
                StopStatus::InsufficientContent,
            );
        }

        // The partial window at stop time becomes one last intermediate.
        if let Some(text) = self.window.force_finalize() {
            let summary = self.summarizer.summarize_chunk(&text);
            self.summarizer.add_intermediate_summary(&summary);
        }

        if self.summarizer.intermediate_count() == 0 {
            // Some content but no intermediate survived: synthesize one
            // from the snapshot so reduce/extract still read only
            // summaries.
            let snapshot = self.window.snapshot();
            let summary = self.summarizer.summarize_chunk(&snapshot);
            self.summarizer.add_intermediate_summary(&summary);
        }

        let final_summary = self.summarizer.generate_final_summary();
        let data = self.summarizer.extract_structured_data();
        (final_summary, data, StopStatus::Completed)
    }

    /// Drops all retained transcript and summary state. Called after
    /// artifacts are persisted.
    pub(crate) fn clear(&mut self) {
        self.window.clear();
        self.summarizer.clear_intermediate_summaries();
    }

    pub(crate) fn stats(&self) -> SessionStats {
        SessionStats {
            session_id: self.config.session_id.clone(),
            status: self.status,
            created_at: self.created_at,
            audio_chunks_received: self.audio_chunks_received,
            total_audio_duration: self.total_audio_duration,
            window: self.window.stats(),
            intermediate_summaries: self.summarizer.intermediate_count(),
        }
    }

    pub(crate) fn audio_chunks_received(&self) -> u64 {
        self.audio_chunks_received
    }

    pub(crate) fn total_audio_duration(&self) -> f64 {
        self.total_audio_duration
    }

    /// Whether the full retained transcript is too short to summarize.
    fn is_low_content(&self) -> bool {
        let snapshot = self.window.snapshot();
        let word_count = snapshot.split_whitespace().count();
        snapshot.len() < defaults::LOW_CONTENT_MIN_CHARS
            || word_count < defaults::LOW_CONTENT_MIN_WORDS
    }

    /// MAP stage for every finalized window waiting in the queue.
    fn drain_pending_windows(&mut self) {
        while let Some(chunk_text) = self.window.next_chunk() {
            let summary = self.summarizer.summarize_chunk(&chunk_text);
            self.summarizer.add_intermediate_summary(&summary);
        }
    }
}
