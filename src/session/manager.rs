//! Session table and lifecycle orchestration.

use crate::audio::AudioChunk;
use crate::audio::codec;
use crate::error::{Result, SottoError};
use crate::llm::{GeneratorFactory, MockGenerator, TextGenerator};
use crate::report::{ErrorReporter, StderrReporter};
use crate::session::artifacts;
use crate::session::{
    IngestReceipt, Session, SessionConfig, SessionStats, SessionStatus, StopOutcome, StopStatus,
};
use crate::stt::{
    MockTranscriber, RuntimeMode, Transcriber, TranscriberFactory, TranscriptionBuffer,
    TranscriptionBufferConfig,
};
use crate::summarize::{MapReduceSummarizer, SummarizerConfig};
use crate::window::{TranscriptWindow, WindowConfig};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Owns all sessions and serializes access to each.
///
/// Two levels of locking: the table lock guards id lookup, insertion, and
/// the active-session policy; a per-session lock serializes ingest against
/// stop for that session while distinct sessions proceed in parallel.
pub struct SessionManager {
    sessions: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
    runtime_mode: RuntimeMode,
    allow_concurrent: bool,
    transcriber_factory: Arc<dyn TranscriberFactory>,
    generator_factory: Arc<dyn GeneratorFactory>,
    reporter: Arc<dyn ErrorReporter>,
}

impl SessionManager {
    pub fn new(
        transcriber_factory: Arc<dyn TranscriberFactory>,
        generator_factory: Arc<dyn GeneratorFactory>,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            runtime_mode: RuntimeMode::Prod,
            allow_concurrent: false,
            transcriber_factory,
            generator_factory,
            reporter: Arc::new(StderrReporter),
        }
    }

    /// Dev mode substitutes mock backends when construction fails.
    pub fn with_runtime_mode(mut self, mode: RuntimeMode) -> Self {
        self.runtime_mode = mode;
        self
    }

    /// Permits more than one active session at a time.
    pub fn with_concurrent_sessions(mut self) -> Self {
        self.allow_concurrent = true;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Creates a session and starts accepting audio for it.
    ///
    /// Session ids are never reused, even after a stop. With concurrency
    /// disabled (the default) a second active session is refused.
    pub fn create_session(&self, config: SessionConfig) -> Result<()> {
        let transcriber = self.create_transcriber(&config)?;
        let generator = self.create_generator(&config)?;

        let mut sessions = self.lock_table();
        if sessions.contains_key(&config.session_id) {
            return Err(SottoError::DuplicateSessionId {
                session_id: config.session_id.clone(),
            });
        }
        if !self.allow_concurrent {
            for (id, session) in sessions.iter() {
                if lock_session(session).status == SessionStatus::Active {
                    return Err(SottoError::SessionAlreadyActive {
                        session_id: id.clone(),
                    });
                }
            }
        }

        let buffer = TranscriptionBuffer::new(
            TranscriptionBufferConfig {
                min_secs: config.stt_min_buffer_secs,
                max_secs: config.stt_max_buffer_secs,
                sample_rate: config.capture_sample_rate,
            },
            transcriber,
            self.reporter.clone(),
        );
        let window = TranscriptWindow::new(WindowConfig {
            window_secs: config.window_secs,
            max_segments: config.max_buffer_segments,
        });
        let summarizer = MapReduceSummarizer::new(
            SummarizerConfig {
                prompts: config.prompts.clone(),
                chunk_summary_max_tokens: config.chunk_summary_max_tokens,
                final_summary_max_tokens: config.final_summary_max_tokens,
            },
            generator,
            self.reporter.clone(),
        );

        let session_id = config.session_id.clone();
        let session = Session::new(config, buffer, window, summarizer);
        sessions.insert(session_id, Arc::new(Mutex::new(session)));
        Ok(())
    }

    /// Submits one decoded audio chunk to an active session.
    ///
    /// Validation failures and unknown/inactive sessions are the caller's
    /// errors; transcription and summarization failures are absorbed into
    /// the receipt (empty transcript, error-marker summaries).
    pub fn add_audio_chunk(&self, session_id: &str, chunk: &AudioChunk) -> Result<IngestReceipt> {
        codec::validate_sample_rate(chunk.sample_rate)?;
        codec::validate_range(&chunk.samples)?;

        let session = self.get_session(session_id)?;
        let mut session = lock_session(&session);
        if session.status != SessionStatus::Active {
            return Err(SottoError::SessionNotFound {
                session_id: session_id.to_string(),
            });
        }
        Ok(session.ingest(chunk))
    }

    /// Decodes a base64-wrapped PCM payload and submits it in one step.
    ///
    /// Convenience for transport layers that ship audio as base64 text.
    pub fn submit_audio_base64(
        &self,
        session_id: &str,
        pcm_b64: &str,
        timestamp: f64,
        sample_rate: u32,
    ) -> Result<IngestReceipt> {
        let (samples, _duration) = codec::decode_pcm_base64(pcm_b64, sample_rate)?;
        let chunk = AudioChunk::new(samples, sample_rate, timestamp);
        self.add_audio_chunk(session_id, &chunk)
    }

    /// Stops a session, producing and persisting its artifacts.
    ///
    /// Idempotent: stopping a stopped session returns `AlreadyStopped`
    /// without recomputing or rewriting anything. The call is synchronous
    /// and holds the session lock for the whole summarize-and-persist
    /// sequence, so concurrent ingest for the same session cannot
    /// interleave.
    pub fn stop_session(&self, session_id: &str) -> Result<StopOutcome> {
        let session = self.get_session(session_id)?;
        let mut session = lock_session(&session);

        if session.status == SessionStatus::Stopped {
            return Ok(StopOutcome::already_stopped());
        }
        session.status = SessionStatus::Processing;

        let (final_summary, data, status) = session.finish();

        let paths = artifacts::persist(
            &session.config,
            &final_summary,
            &data,
            session.total_audio_duration(),
            session.audio_chunks_received(),
            self.reporter.as_ref(),
        )?;

        session.status = SessionStatus::Stopped;
        // Retention contract: transcript and summary state is dropped only
        // after the artifacts are on disk.
        session.clear();

        Ok(StopOutcome {
            status,
            summary_path: Some(paths.summary_path),
            data_path: Some(paths.data_path),
            csv_path: paths.csv_path,
        })
    }

    /// Statistics for one session, in any state.
    pub fn session_stats(&self, session_id: &str) -> Result<SessionStats> {
        let session = self.get_session(session_id)?;
        let session = lock_session(&session);
        Ok(session.stats())
    }

    /// All known session ids with their current status.
    pub fn list_sessions(&self) -> Vec<(String, SessionStatus)> {
        let sessions = self.lock_table();
        let mut listing: Vec<(String, SessionStatus)> = sessions
            .iter()
            .map(|(id, session)| (id.clone(), lock_session(session).status))
            .collect();
        listing.sort_by(|a, b| a.0.cmp(&b.0));
        listing
    }

    fn get_session(&self, session_id: &str) -> Result<Arc<Mutex<Session>>> {
        let sessions = self.lock_table();
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| SottoError::SessionNotFound {
                session_id: session_id.to_string(),
            })
    }

    fn lock_table(&self) -> MutexGuard<'_, HashMap<String, Arc<Mutex<Session>>>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn create_transcriber(&self, config: &SessionConfig) -> Result<Arc<dyn Transcriber>> {
        match self
            .transcriber_factory
            .create(config.stt_backend, &config.stt_model)
        {
            Ok(transcriber) => Ok(transcriber),
            Err(e) if self.runtime_mode == RuntimeMode::Dev => {
                self.reporter.report(
                    "session",
                    &format!("stt backend unavailable, using mock: {}", e),
                );
                Ok(Arc::new(MockTranscriber::new(&config.stt_model)))
            }
            Err(e) => Err(e),
        }
    }

    fn create_generator(&self, config: &SessionConfig) -> Result<Arc<dyn TextGenerator>> {
        match self
            .generator_factory
            .create(config.llm_backend, &config.llm_model)
        {
            Ok(generator) => Ok(generator),
            Err(e) if self.runtime_mode == RuntimeMode::Dev => {
                self.reporter.report(
                    "session",
                    &format!("llm backend unavailable, using mock: {}", e),
                );
                Ok(Arc::new(MockGenerator::new(&config.llm_model)))
            }
            Err(e) => Err(e),
        }
    }
}

fn lock_session(session: &Arc<Mutex<Session>>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(|e| e.into_inner())
}
