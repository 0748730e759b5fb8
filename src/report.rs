//! Error reporting for pipeline components.
//!
//! Backend transient failures (STT or LLM calls) are absorbed where they
//! occur and surfaced through an injected reporter instead of a global
//! logger, so embedders decide where diagnostics go.

/// Trait for reporting absorbed component errors.
pub trait ErrorReporter: Send + Sync {
    /// Reports an absorbed error from a component.
    fn report(&self, component: &str, message: &str);
}

/// Simple error reporter that logs to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrReporter;

impl ErrorReporter for StderrReporter {
    fn report(&self, component: &str, message: &str) {
        eprintln!("[{}] {}", component, message);
    }
}

/// Reporter that discards everything. Useful in tests and embedders that
/// surface errors through their own channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl ErrorReporter for NullReporter {
    fn report(&self, _component: &str, _message: &str) {}
}
