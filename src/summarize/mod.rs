//! Map-reduce summarization engine.
//!
//! MAP: each finalized transcript window is summarized into a short
//! intermediate summary. REDUCE: the intermediates — and only the
//! intermediates, never raw transcript — are merged into the final
//! summary. EXTRACT: structured meeting data is pulled from the same
//! intermediates with schema-constrained generation.
//!
//! Stage failures degrade instead of aborting: a failed chunk becomes an
//! inline error marker, a failed extraction becomes empty data. Stopping
//! a session must always produce artifacts.

pub mod extract;

pub use extract::{Company, Contact, Deal, MeetingData};

use crate::defaults;
use crate::llm::{PromptSet, TextGenerator};
use crate::report::ErrorReporter;
use chrono::{DateTime, Local, Utc};
use std::sync::{Arc, Mutex};

/// Where the engine is in the session's summarization lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummarizerPhase {
    #[default]
    Idle,
    Mapping,
    Reducing,
    Extracting,
    Done,
}

/// Summarization parameters for one session.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub prompts: PromptSet,
    pub chunk_summary_max_tokens: u32,
    pub final_summary_max_tokens: u32,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            prompts: PromptSet::default(),
            chunk_summary_max_tokens: defaults::CHUNK_SUMMARY_MAX_TOKENS,
            final_summary_max_tokens: defaults::FINAL_SUMMARY_MAX_TOKENS,
        }
    }
}

/// One MAP-stage result held for the REDUCE stage.
#[derive(Debug, Clone)]
struct IntermediateSummary {
    text: String,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct SummarizerState {
    intermediates: Vec<IntermediateSummary>,
    phase: SummarizerPhase,
}

/// Map-reduce summarizer over time-windowed transcript chunks.
pub struct MapReduceSummarizer {
    generator: Arc<dyn TextGenerator>,
    reporter: Arc<dyn ErrorReporter>,
    config: SummarizerConfig,
    state: Mutex<SummarizerState>,
}

impl MapReduceSummarizer {
    pub fn new(
        config: SummarizerConfig,
        generator: Arc<dyn TextGenerator>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            generator,
            reporter,
            config,
            state: Mutex::new(SummarizerState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SummarizerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SummarizerPhase {
        self.state().phase
    }

    /// Number of intermediate summaries held.
    pub fn intermediate_count(&self) -> usize {
        self.state().intermediates.len()
    }

    /// MAP stage: summarizes one window of transcript text.
    ///
    /// Blank input returns an empty string without touching the model. A
    /// generation failure is reported and returned as an inline error
    /// marker so the final summary still reflects that the window existed.
    pub fn summarize_chunk(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        self.state().phase = SummarizerPhase::Mapping;

        let prompt = self.config.prompts.render_chunk(text);
        match self
            .generator
            .generate(&prompt, self.config.chunk_summary_max_tokens)
        {
            Ok(summary) => summary.trim().to_string(),
            Err(e) => {
                self.reporter
                    .report("summarize", &format!("chunk summary failed: {}", e));
                format!("[Error summarizing chunk: {}]", e)
            }
        }
    }

    /// Stores a MAP-stage result for the REDUCE stage. Blank summaries are
    /// ignored.
    pub fn add_intermediate_summary(&self, summary: &str) {
        if summary.trim().is_empty() {
            return;
        }
        self.state().intermediates.push(IntermediateSummary {
            text: summary.trim().to_string(),
            created_at: Utc::now(),
        });
    }

    /// REDUCE stage: merges all intermediate summaries into the final
    /// summary.
    ///
    /// Only intermediates are read; raw transcript never reaches this
    /// stage. With no intermediates, returns a fixed no-content message
    /// without invoking the model.
    pub fn generate_final_summary(&self) -> String {
        let summaries_text = {
            let mut state = self.state();
            if state.intermediates.is_empty() {
                return defaults::NO_CONTENT_MESSAGE.to_string();
            }
            state.phase = SummarizerPhase::Reducing;
            numbered_blocks(&state.intermediates, |i| format!("[{}]", i))
        };
        let segments = self.intermediate_count();

        let prompt = self.config.prompts.render_final(&summaries_text);
        match self
            .generator
            .generate(&prompt, self.config.final_summary_max_tokens)
        {
            Ok(summary) => {
                let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
                format!(
                    "Summary Generated: {}\nNumber of Segments: {}\n\n{}\n",
                    timestamp,
                    segments,
                    summary.trim()
                )
            }
            Err(e) => {
                self.reporter
                    .report("summarize", &format!("final summary failed: {}", e));
                format!("[Error generating final summary: {}]", e)
            }
        }
    }

    /// EXTRACT stage: pulls structured meeting data from the intermediate
    /// summaries via schema-constrained generation.
    ///
    /// Any failure — generation or schema mismatch — is reported and
    /// yields empty data so artifact persistence proceeds.
    pub fn extract_structured_data(&self) -> MeetingData {
        let summaries_text = {
            let mut state = self.state();
            if state.intermediates.is_empty() {
                state.phase = SummarizerPhase::Done;
                return MeetingData::default();
            }
            state.phase = SummarizerPhase::Extracting;
            numbered_blocks(&state.intermediates, |i| format!("[Segment {}]", i))
        };

        let schema = MeetingData::schema();
        let prompt = self
            .config
            .prompts
            .render_extraction(&summaries_text, &schema);

        let data = match self.generator.generate_structured(
            &prompt,
            &schema,
            defaults::EXTRACTION_MAX_TOKENS,
        ) {
            Ok(value) => match serde_json::from_value::<MeetingData>(value) {
                Ok(data) => data,
                Err(e) => {
                    self.reporter
                        .report("summarize", &format!("extraction schema mismatch: {}", e));
                    MeetingData::default()
                }
            },
            Err(e) => {
                self.reporter
                    .report("summarize", &format!("data extraction failed: {}", e));
                MeetingData::default()
            }
        };

        self.state().phase = SummarizerPhase::Done;
        data
    }

    /// Drops all intermediate summaries and resets the lifecycle phase.
    /// Called as the last step of session teardown.
    pub fn clear_intermediate_summaries(&self) {
        let mut state = self.state();
        state.intermediates.clear();
        state.phase = SummarizerPhase::Idle;
    }
}

/// Formats intermediates as labeled blocks separated by blank lines,
/// numbering from 1.
fn numbered_blocks(
    intermediates: &[IntermediateSummary],
    label: impl Fn(usize) -> String,
) -> String {
    intermediates
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{} {}", label(i + 1), s.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockGenerator;
    use crate::report::NullReporter;

    fn summarizer_with(generator: Arc<MockGenerator>) -> MapReduceSummarizer {
        MapReduceSummarizer::new(
            SummarizerConfig::default(),
            generator,
            Arc::new(NullReporter),
        )
    }

    #[test]
    fn test_blank_chunk_skips_generation() {
        let generator = Arc::new(MockGenerator::new("m"));
        let summarizer = summarizer_with(generator.clone());

        assert_eq!(summarizer.summarize_chunk("   "), "");
        assert_eq!(generator.generate_calls(), 0);
    }

    #[test]
    fn test_chunk_summary_trims_response() {
        let generator = Arc::new(MockGenerator::new("m").with_response("  a summary \n"));
        let summarizer = summarizer_with(generator.clone());

        assert_eq!(summarizer.summarize_chunk("some transcript"), "a summary");
        assert_eq!(generator.generate_calls(), 1);
        assert_eq!(summarizer.phase(), SummarizerPhase::Mapping);
    }

    #[test]
    fn test_chunk_failure_becomes_inline_marker() {
        let generator = Arc::new(MockGenerator::new("m").with_failure());
        let summarizer = summarizer_with(generator);

        let result = summarizer.summarize_chunk("text");
        assert!(result.starts_with("[Error summarizing chunk:"));
    }

    #[test]
    fn test_final_summary_without_intermediates_skips_generation() {
        let generator = Arc::new(MockGenerator::new("m"));
        let summarizer = summarizer_with(generator.clone());

        let summary = summarizer.generate_final_summary();
        assert_eq!(summary, defaults::NO_CONTENT_MESSAGE);
        assert_eq!(generator.generate_calls(), 0);
    }

    #[test]
    fn test_final_summary_carries_metadata_header() {
        let generator = Arc::new(MockGenerator::new("m").with_response("merged summary"));
        let summarizer = summarizer_with(generator);

        summarizer.add_intermediate_summary("first");
        summarizer.add_intermediate_summary("second");
        summarizer.add_intermediate_summary("third");

        let summary = summarizer.generate_final_summary();
        assert!(summary.starts_with("Summary Generated: "));
        assert!(summary.contains("Number of Segments: 3"));
        assert!(summary.contains("merged summary"));
    }

    #[test]
    fn test_reduce_reads_only_intermediates() {
        // The reduce prompt carries numbered intermediate blocks, not raw
        // transcript.
        let generator = Arc::new(MockGenerator::new("m").with_response("final"));
        let summarizer = summarizer_with(generator.clone());

        summarizer.summarize_chunk("raw transcript window one");
        summarizer.add_intermediate_summary("alpha");
        summarizer.add_intermediate_summary("beta");

        summarizer.generate_final_summary();
        // One call for the chunk, one for the reduce.
        assert_eq!(generator.generate_calls(), 2);
        assert_eq!(summarizer.intermediate_count(), 2);
    }

    #[test]
    fn test_blank_intermediates_ignored() {
        let generator = Arc::new(MockGenerator::new("m"));
        let summarizer = summarizer_with(generator);

        summarizer.add_intermediate_summary("");
        summarizer.add_intermediate_summary("  ");
        assert_eq!(summarizer.intermediate_count(), 0);
    }

    #[test]
    fn test_extraction_without_intermediates_skips_generation() {
        let generator = Arc::new(MockGenerator::new("m"));
        let summarizer = summarizer_with(generator.clone());

        let data = summarizer.extract_structured_data();
        assert_eq!(data, MeetingData::default());
        assert_eq!(generator.structured_calls(), 0);
        assert_eq!(summarizer.phase(), SummarizerPhase::Done);
    }

    #[test]
    fn test_extraction_parses_structured_response() {
        let response = serde_json::json!({
            "contacts": [{"name": "Ada", "role": "CIO"}],
            "companies": [],
            "deals": []
        });
        let generator =
            Arc::new(MockGenerator::new("m").with_structured_response(response));
        let summarizer = summarizer_with(generator.clone());

        summarizer.add_intermediate_summary("met with Ada, CIO");
        let data = summarizer.extract_structured_data();
        assert_eq!(data.contacts.len(), 1);
        assert_eq!(data.contacts[0].name.as_deref(), Some("Ada"));
        assert_eq!(generator.structured_calls(), 1);
    }

    #[test]
    fn test_extraction_failure_yields_empty_data() {
        let generator = Arc::new(MockGenerator::new("m").with_failure());
        let summarizer = summarizer_with(generator);

        summarizer.add_intermediate_summary("something");
        assert_eq!(summarizer.extract_structured_data(), MeetingData::default());
        assert_eq!(summarizer.phase(), SummarizerPhase::Done);
    }

    #[test]
    fn test_extraction_schema_mismatch_yields_empty_data() {
        let generator = Arc::new(
            MockGenerator::new("m")
                .with_structured_response(serde_json::json!({"contacts": "not a list"})),
        );
        let summarizer = summarizer_with(generator);

        summarizer.add_intermediate_summary("something");
        assert_eq!(summarizer.extract_structured_data(), MeetingData::default());
    }

    #[test]
    fn test_clear_resets_state() {
        let generator = Arc::new(MockGenerator::new("m").with_response("s"));
        let summarizer = summarizer_with(generator);

        summarizer.add_intermediate_summary("one");
        summarizer.summarize_chunk("text");
        summarizer.clear_intermediate_summaries();

        assert_eq!(summarizer.intermediate_count(), 0);
        assert_eq!(summarizer.phase(), SummarizerPhase::Idle);
        assert_eq!(
            summarizer.generate_final_summary(),
            defaults::NO_CONTENT_MESSAGE
        );
    }
}
