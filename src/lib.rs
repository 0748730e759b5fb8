//! sotto - On-device meeting transcription and summarization core
//!
//! Streams captured audio through a local STT model, windows the
//! transcript, and condenses it with map-reduce summarization. Raw audio
//! and transcript text never leave the process; only the final summary
//! and structured meeting data are persisted.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod config;
pub mod defaults;
pub mod error;
pub mod llm;
pub mod report;
pub mod session;
pub mod stt;
pub mod summarize;
pub mod window;

// Core traits (ingest → transcribe → summarize)
pub use llm::{GeneratorFactory, TextGenerator};
pub use report::{ErrorReporter, NullReporter, StderrReporter};
pub use stt::{Transcriber, TranscriberFactory};

// Session lifecycle
pub use session::{
    IngestReceipt, SessionConfig, SessionManager, SessionStats, SessionStatus, StopOutcome,
    StopStatus,
};

// Audio ingestion
pub use audio::{AudioChunk, SourceTag};

// Summarization
pub use summarize::{Company, Contact, Deal, MapReduceSummarizer, MeetingData, SummarizerPhase};

// Error handling
pub use error::{Result, SottoError};

// Config
pub use config::Config;

// Backend selection
pub use llm::{LlmBackend, MockGenerator, MockGeneratorFactory, UnavailableGeneratorFactory};
pub use stt::{
    MockTranscriber, MockTranscriberFactory, RuntimeMode, SttBackend,
    UnavailableTranscriberFactory,
};

/// Build version string with optional git commit hash.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
