//! STT backend selection.
//!
//! Backends are selected by an enumerated tag through a factory injected at
//! session-manager construction. Whether a missing backend is a hard error
//! or a mock fallback depends on the runtime mode: production must never
//! silently serve mock transcripts under a real session id.

use crate::error::{Result, SottoError};
use crate::stt::transcriber::{MockTranscriber, Transcriber};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Supported speech-to-text backend families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SttBackend {
    Whisper,
    Parakeet,
}

impl SttBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SttBackend::Whisper => "whisper",
            SttBackend::Parakeet => "parakeet",
        }
    }
}

impl fmt::Display for SttBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SttBackend {
    type Err = SottoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "whisper" => Ok(SttBackend::Whisper),
            "parakeet" => Ok(SttBackend::Parakeet),
            other => Err(SottoError::ConfigInvalidValue {
                key: "stt.backend".to_string(),
                message: format!("unknown backend '{}', expected whisper or parakeet", other),
            }),
        }
    }
}

/// Runtime mode gating mock fallback behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    /// Mock backends are never substituted; construction failures are
    /// surfaced as `BackendUnavailable`.
    #[default]
    Prod,
    /// Construction failures fall back to mock backends (reported).
    Dev,
}

/// Factory for constructing transcribers at session-creation time.
///
/// Embedders implement this to wire in real model engines; the core never
/// links against one directly.
pub trait TranscriberFactory: Send + Sync {
    /// Constructs a transcriber for the given backend and model identifier.
    fn create(&self, backend: SttBackend, model: &str) -> Result<Arc<dyn Transcriber>>;
}

/// Factory that always fails, for deployments with no STT engine compiled
/// in. Under `RuntimeMode::Dev` the session manager substitutes a mock.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableTranscriberFactory;

impl TranscriberFactory for UnavailableTranscriberFactory {
    fn create(&self, backend: SttBackend, model: &str) -> Result<Arc<dyn Transcriber>> {
        Err(SottoError::BackendUnavailable {
            backend: backend.as_str().to_string(),
            message: format!("no transcriber engine available for model '{}'", model),
        })
    }
}

/// Factory producing mock transcribers, for tests and dev tooling.
#[derive(Debug, Clone, Default)]
pub struct MockTranscriberFactory {
    response: Option<String>,
}

impl MockTranscriberFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// All produced mocks return this response.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }
}

impl TranscriberFactory for MockTranscriberFactory {
    fn create(&self, _backend: SttBackend, model: &str) -> Result<Arc<dyn Transcriber>> {
        let mut mock = MockTranscriber::new(model);
        if let Some(ref response) = self.response {
            mock = mock.with_response(response);
        }
        Ok(Arc::new(mock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("whisper".parse::<SttBackend>().unwrap(), SttBackend::Whisper);
        assert_eq!(
            "Parakeet".parse::<SttBackend>().unwrap(),
            SttBackend::Parakeet
        );
        assert!("vosk".parse::<SttBackend>().is_err());
    }

    #[test]
    fn test_backend_display() {
        assert_eq!(SttBackend::Whisper.to_string(), "whisper");
        assert_eq!(SttBackend::Parakeet.to_string(), "parakeet");
    }

    #[test]
    fn test_unavailable_factory_fails_typed() {
        let factory = UnavailableTranscriberFactory;
        match factory.create(SttBackend::Whisper, "base.en") {
            Err(SottoError::BackendUnavailable { backend, .. }) => {
                assert_eq!(backend, "whisper");
            }
            _ => panic!("Expected BackendUnavailable"),
        }
    }

    #[test]
    fn test_mock_factory_produces_working_transcriber() {
        let factory = MockTranscriberFactory::new().with_response("hello");
        let transcriber = factory.create(SttBackend::Parakeet, "tdt-0.6b").unwrap();
        assert_eq!(transcriber.model_name(), "tdt-0.6b");
        assert_eq!(transcriber.transcribe(&[], 16000).unwrap(), "hello");
    }

    #[test]
    fn test_runtime_mode_default_is_prod() {
        assert_eq!(RuntimeMode::default(), RuntimeMode::Prod);
    }
}
