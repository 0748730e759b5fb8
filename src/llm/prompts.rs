//! Prompt templates for the map-reduce summarization stages.
//!
//! Templates use `{text}` (map stage) and `{summaries_text}` (reduce and
//! extraction stages) placeholders. Each template can be overridden per
//! session.

/// Map-stage template: summarize one transcript window.
pub const DEFAULT_CHUNK_SUMMARY_PROMPT: &str = "\
Summarize this conversation segment in 2-3 concise paragraphs. Focus on:
- Main discussion points and context
- Key decisions or action items
- Important information shared

If contact/company/deal data is mentioned (names, roles, AUM, ticket sizes, products, strategies), note it briefly but do NOT format it as structured lists - that will be extracted separately.

Transcript:
{text}

Summary:";

/// Reduce-stage template: merge intermediate summaries into a final one.
pub const DEFAULT_FINAL_SUMMARY_PROMPT: &str = "\
You are summarizing a sales discovery call at an asset management company focused on alternative investments.

Create a concise final summary (3-5 paragraphs maximum) covering:
1. Meeting context and participants
2. Key discussion points and client needs
3. Important decisions or next steps
4. Notable insights or observations

DO NOT repeat structured data (names, roles, AUM, ticket sizes, products) in list format - this will be extracted separately. Keep the summary narrative and flowing.

Segment Summaries:
{summaries_text}

Final Summary:";

/// Extraction-stage template: pull structured data out of the summaries.
pub const DEFAULT_DATA_EXTRACTION_PROMPT: &str = "\
You are extracting structured data from meeting summaries. Review the summaries below and extract all mentioned information into the specified JSON format.

If information is not mentioned or unclear, use null for that field.

Summaries:
{summaries_text}

Extract the following information as JSON:";

/// The three prompt templates a session summarizes with.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub chunk_summary: String,
    pub final_summary: String,
    pub data_extraction: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            chunk_summary: DEFAULT_CHUNK_SUMMARY_PROMPT.to_string(),
            final_summary: DEFAULT_FINAL_SUMMARY_PROMPT.to_string(),
            data_extraction: DEFAULT_DATA_EXTRACTION_PROMPT.to_string(),
        }
    }
}

impl PromptSet {
    /// Renders the map-stage prompt for one window of transcript text.
    pub fn render_chunk(&self, text: &str) -> String {
        self.chunk_summary.replace("{text}", text)
    }

    /// Renders the reduce-stage prompt over formatted summaries.
    pub fn render_final(&self, summaries_text: &str) -> String {
        self.final_summary.replace("{summaries_text}", summaries_text)
    }

    /// Renders the extraction prompt, appending the JSON schema so the
    /// model sees the exact shape it must produce.
    pub fn render_extraction(&self, summaries_text: &str, schema: &serde_json::Value) -> String {
        let prompt = self
            .data_extraction
            .replace("{summaries_text}", summaries_text);
        let schema_str =
            serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
        format!("{}\n\nJSON Schema:\n{}", prompt, schema_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_chunk_substitutes_text() {
        let prompts = PromptSet::default();
        let rendered = prompts.render_chunk("hello world");
        assert!(rendered.contains("hello world"));
        assert!(!rendered.contains("{text}"));
    }

    #[test]
    fn test_render_final_substitutes_summaries() {
        let prompts = PromptSet::default();
        let rendered = prompts.render_final("[1] first\n\n[2] second");
        assert!(rendered.contains("[1] first"));
        assert!(!rendered.contains("{summaries_text}"));
    }

    #[test]
    fn test_render_extraction_appends_schema() {
        let prompts = PromptSet::default();
        let schema = serde_json::json!({"type": "object"});
        let rendered = prompts.render_extraction("[Segment 1] s", &schema);
        assert!(rendered.contains("[Segment 1] s"));
        assert!(rendered.contains("JSON Schema:"));
        assert!(rendered.contains("\"type\""));
    }

    #[test]
    fn test_custom_template_override() {
        let prompts = PromptSet {
            chunk_summary: "Short: {text}".to_string(),
            ..PromptSet::default()
        };
        assert_eq!(prompts.render_chunk("abc"), "Short: abc");
    }
}
