//! Text generation trait and backend selection.
//!
//! Generation backends live behind [`TextGenerator`] so the summarization
//! engine never knows which model server (if any) is running. Structured
//! generation constrains the model output to a JSON schema.

use crate::error::{Result, SottoError};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Interface for local text generation.
pub trait TextGenerator: Send + Sync {
    /// Generates free-form text for a prompt, bounded by `max_tokens`.
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    /// Generates JSON constrained to the given schema, bounded by
    /// `max_tokens`.
    fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
        max_tokens: u32,
    ) -> Result<serde_json::Value>;

    /// Model identifier, for diagnostics.
    fn model_name(&self) -> &str;

    /// Whether the backend is loaded and able to serve requests.
    fn is_ready(&self) -> bool;
}

impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        (**self).generate(prompt, max_tokens)
    }

    fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
        max_tokens: u32,
    ) -> Result<serde_json::Value> {
        (**self).generate_structured(prompt, schema, max_tokens)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Supported generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    /// Local Ollama server.
    #[default]
    Ollama,
}

impl LlmBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmBackend::Ollama => "ollama",
        }
    }
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmBackend {
    type Err = SottoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmBackend::Ollama),
            other => Err(SottoError::ConfigInvalidValue {
                key: "llm.backend".to_string(),
                message: format!("unknown backend '{}'", other),
            }),
        }
    }
}

/// Creates generators for a backend/model pair.
///
/// The factory is the seam where real model runtimes plug in. The core
/// crate ships only factories useful for embedding and testing.
pub trait GeneratorFactory: Send + Sync {
    fn create(&self, backend: LlmBackend, model: &str) -> Result<Arc<dyn TextGenerator>>;
}

/// Factory that always fails. Default in builds without a model runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableGeneratorFactory;

impl GeneratorFactory for UnavailableGeneratorFactory {
    fn create(&self, backend: LlmBackend, model: &str) -> Result<Arc<dyn TextGenerator>> {
        Err(SottoError::BackendUnavailable {
            backend: backend.to_string(),
            message: format!("no generation runtime linked for model '{}'", model),
        })
    }
}

/// Mock generator returning canned responses, with call counters so tests
/// can assert the engine never reached the model.
pub struct MockGenerator {
    model_name: String,
    response: Option<String>,
    structured_response: Option<serde_json::Value>,
    should_fail: bool,
    generate_calls: std::sync::atomic::AtomicUsize,
    structured_calls: std::sync::atomic::AtomicUsize,
}

impl MockGenerator {
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: None,
            structured_response: None,
            should_fail: false,
            generate_calls: std::sync::atomic::AtomicUsize::new(0),
            structured_calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }

    pub fn with_structured_response(mut self, response: serde_json::Value) -> Self {
        self.structured_response = Some(response);
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Number of free-form generation calls observed.
    pub fn generate_calls(&self) -> usize {
        self.generate_calls
            .load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of structured generation calls observed.
    pub fn structured_calls(&self) -> usize {
        self.structured_calls
            .load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl TextGenerator for MockGenerator {
    fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
        self.generate_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.should_fail {
            return Err(SottoError::Generation {
                message: "mock generation failure".to_string(),
            });
        }
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| format!("[mock summary of {} chars]", prompt.len())))
    }

    fn generate_structured(
        &self,
        _prompt: &str,
        _schema: &serde_json::Value,
        _max_tokens: u32,
    ) -> Result<serde_json::Value> {
        self.structured_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.should_fail {
            return Err(SottoError::Generation {
                message: "mock generation failure".to_string(),
            });
        }
        Ok(self.structured_response.clone().unwrap_or_else(
            || serde_json::json!({ "contacts": [], "companies": [], "deals": [] }),
        ))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        true
    }
}

/// Factory producing [`MockGenerator`] instances. Used in dev mode and in
/// tests.
#[derive(Debug, Clone, Default)]
pub struct MockGeneratorFactory {
    response: Option<String>,
}

impl MockGeneratorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }
}

impl GeneratorFactory for MockGeneratorFactory {
    fn create(&self, _backend: LlmBackend, model: &str) -> Result<Arc<dyn TextGenerator>> {
        let mut generator = MockGenerator::new(model);
        if let Some(response) = &self.response {
            generator = generator.with_response(response);
        }
        Ok(Arc::new(generator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_round_trip() {
        assert_eq!("ollama".parse::<LlmBackend>().unwrap(), LlmBackend::Ollama);
        assert_eq!(LlmBackend::Ollama.to_string(), "ollama");
    }

    #[test]
    fn test_backend_parse_rejects_unknown() {
        let err = "gpt9".parse::<LlmBackend>().unwrap_err();
        assert!(err.to_string().contains("gpt9"));
    }

    #[test]
    fn test_unavailable_factory_always_errors() {
        let factory = UnavailableGeneratorFactory;
        let err = factory.create(LlmBackend::Ollama, "qwen3:4b-instruct");
        assert!(matches!(
            err,
            Err(SottoError::BackendUnavailable { .. })
        ));
    }

    #[test]
    fn test_mock_generator_counts_calls() {
        let generator = MockGenerator::new("m").with_response("hi");
        assert_eq!(generator.generate("p", 100).unwrap(), "hi");
        assert_eq!(generator.generate_calls(), 1);
        assert_eq!(generator.structured_calls(), 0);
    }

    #[test]
    fn test_mock_generator_structured_default() {
        let generator = MockGenerator::new("m");
        let value = generator
            .generate_structured("p", &serde_json::json!({}), 100)
            .unwrap();
        assert!(value["contacts"].as_array().unwrap().is_empty());
        assert_eq!(generator.structured_calls(), 1);
    }

    #[test]
    fn test_mock_generator_failure() {
        let generator = MockGenerator::new("m").with_failure();
        assert!(generator.generate("p", 100).is_err());
        assert!(generator
            .generate_structured("p", &serde_json::json!({}), 100)
            .is_err());
    }
}
