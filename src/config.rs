use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub stt: SttConfig,
    pub llm: LlmConfig,
    pub summary: SummaryConfig,
    pub output: OutputConfig,
}

/// Audio ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Capture sample rate used for duration arithmetic.
    pub sample_rate: u32,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    /// Backend family: "whisper" or "parakeet".
    pub backend: String,
    pub model: String,
    /// Seconds of audio to accumulate before transcribing.
    pub min_buffer_secs: f64,
    /// Seconds of audio after which transcription is forced.
    pub max_buffer_secs: f64,
}

/// Text generation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend family: "ollama".
    pub backend: String,
    pub model: String,
    pub chunk_summary_max_tokens: u32,
    pub final_summary_max_tokens: u32,
}

/// Summarization windowing and prompt configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummaryConfig {
    /// Wall-clock seconds per map-reduce window.
    pub window_secs: u64,
    /// Cap on the transcript ring buffer.
    pub max_buffer_segments: usize,
    /// Prompt template overrides. Defaults apply when absent.
    pub chunk_summary_prompt: Option<String>,
    pub final_summary_prompt: Option<String>,
    pub data_extraction_prompt: Option<String>,
}

/// Artifact output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for summary and structured-data files.
    pub dir: PathBuf,
    /// Path of the CSV meeting ledger.
    pub csv_path: PathBuf,
    /// Whether stopping a session appends a CSV row.
    pub append_csv: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            backend: "whisper".to_string(),
            model: defaults::DEFAULT_STT_MODEL.to_string(),
            min_buffer_secs: defaults::STT_MIN_BUFFER_SECS,
            max_buffer_secs: defaults::STT_MAX_BUFFER_SECS,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: "ollama".to_string(),
            model: defaults::DEFAULT_LLM_MODEL.to_string(),
            chunk_summary_max_tokens: defaults::CHUNK_SUMMARY_MAX_TOKENS,
            final_summary_max_tokens: defaults::FINAL_SUMMARY_MAX_TOKENS,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            window_secs: defaults::WINDOW_SECS,
            max_buffer_segments: defaults::MAX_BUFFER_SEGMENTS,
            chunk_summary_prompt: None,
            final_summary_prompt: None,
            data_extraction_prompt: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        let dir = dirs::document_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Meeting Summaries");
        Self {
            dir,
            csv_path: PathBuf::from("./summaries/meetings.csv"),
            append_csv: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SOTTO_STT_MODEL → stt.model
    /// - SOTTO_LLM_MODEL → llm.model
    /// - SOTTO_OUTPUT_DIR → output.dir
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("SOTTO_STT_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(model) = std::env::var("SOTTO_LLM_MODEL")
            && !model.is_empty()
        {
            self.llm.model = model;
        }

        if let Ok(dir) = std::env::var("SOTTO_OUTPUT_DIR")
            && !dir.is_empty()
        {
            self.output.dir = PathBuf::from(dir);
        }

        self
    }

    /// Validate numeric bounds that TOML parsing cannot catch.
    pub fn validate(&self) -> crate::error::Result<()> {
        crate::audio::codec::validate_sample_rate(self.audio.sample_rate)?;
        if self.stt.min_buffer_secs <= 0.0 {
            return Err(crate::error::SottoError::ConfigInvalidValue {
                key: "stt.min_buffer_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.stt.max_buffer_secs <= 0.0 {
            return Err(crate::error::SottoError::ConfigInvalidValue {
                key: "stt.max_buffer_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.summary.max_buffer_segments == 0 {
            return Err(crate::error::SottoError::ConfigInvalidValue {
                key: "summary.max_buffer_segments".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/sotto/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sotto").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_sotto_env() {
        remove_env("SOTTO_STT_MODEL");
        remove_env("SOTTO_LLM_MODEL");
        remove_env("SOTTO_OUTPUT_DIR");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.stt.backend, "whisper");
        assert_eq!(config.stt.model, "base.en");
        assert_eq!(config.llm.model, "qwen3:4b-instruct");
        assert_eq!(config.summary.window_secs, 300);
        assert!(config.output.append_csv);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[stt]\nmodel = \"small.en\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.stt.model, "small.en");
        // Untouched sections keep defaults.
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.summary.window_secs, 300);
    }

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[audio]
sample_rate = 48000

[stt]
backend = "parakeet"
model = "parakeet-tdt"
min_buffer_secs = 2.0
max_buffer_secs = 8.0

[llm]
model = "llama3.2:3b"
chunk_summary_max_tokens = 200

[summary]
window_secs = 120
max_buffer_segments = 500

[output]
dir = "/tmp/summaries"
csv_path = "/tmp/summaries/meetings.csv"
append_csv = false
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.stt.backend, "parakeet");
        assert_eq!(config.stt.min_buffer_secs, 2.0);
        assert_eq!(config.llm.chunk_summary_max_tokens, 200);
        assert_eq!(config.summary.window_secs, 120);
        assert_eq!(config.output.dir, PathBuf::from("/tmp/summaries"));
        assert!(!config.output.append_csv);
    }

    #[test]
    fn test_load_invalid_toml_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml {{").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/sotto.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_override_stt_model() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_sotto_env();

        set_env("SOTTO_STT_MODEL", "tiny.en");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.stt.model, "tiny.en");

        clear_sotto_env();
    }

    #[test]
    fn test_env_override_output_dir() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_sotto_env();

        set_env("SOTTO_OUTPUT_DIR", "/tmp/out");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.output.dir, PathBuf::from("/tmp/out"));

        clear_sotto_env();
    }

    #[test]
    fn test_empty_env_value_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_sotto_env();

        set_env("SOTTO_LLM_MODEL", "");
        let config = Config::default().with_env_overrides();
        assert_eq!(config.llm.model, defaults::DEFAULT_LLM_MODEL);

        clear_sotto_env();
    }

    #[test]
    fn test_validate_rejects_bad_sample_rate() {
        let mut config = Config::default();
        config.audio.sample_rate = 4000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ring_capacity() {
        let mut config = Config::default();
        config.summary.max_buffer_segments = 0;
        assert!(config.validate().is_err());
    }
}
