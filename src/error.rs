//! Error types for sotto.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SottoError {
    // Audio format/validation errors — caller bugs, surfaced immediately
    #[error("Failed to decode audio payload: {message}")]
    AudioDecode { message: String },

    #[error("Audio sample range [{min:.4}, {max:.4}] exceeds allowed range [-1.0, 1.0]")]
    AudioRange { min: f32, max: f32 },

    #[error("Sample rate {rate} Hz is outside valid range [8000, 96000]")]
    SampleRate { rate: u32 },

    // Session state errors
    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("Session already active: {session_id}")]
    SessionAlreadyActive { session_id: String },

    #[error("Session ID already exists: {session_id}")]
    DuplicateSessionId { session_id: String },

    #[error("Backend unavailable: {backend}: {message}")]
    BackendUnavailable { backend: String, message: String },

    // Backend transient errors — absorbed below the session-manager boundary
    #[error("Transcription error: {message}")]
    Transcription { message: String },

    #[error("Generation error: {message}")]
    Generation { message: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O and serialization errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SottoError>;
