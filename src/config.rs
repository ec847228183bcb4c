use crate::error::{AppError, Result};

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_LLM_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Ceiling on the remote generation call. One slow upstream must not be able
/// to stall an analysis request longer than this; on expiry the orchestrator
/// falls back to algorithmic generation.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 8;

/// Token budget for the remote summary. The expected output is two short
/// paragraphs of JSON, so 500 is generous.
pub const LLM_MAX_TOKENS: u32 = 500;

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the inventory CSV (CSV_DATA_PATH).
    pub csv_path: String,
    pub api_port: u16,
    pub log_level: String,
    /// Whether to attempt remote summary generation at all (USE_LLM).
    pub use_llm: bool,
    /// Anthropic API key (ANTHROPIC_API_KEY). Absent key with use_llm=true
    /// downgrades to algorithmic generation at startup.
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_url: String,
    pub llm_model: String,
    /// Remote call timeout in seconds (LLM_TIMEOUT_SECS).
    pub llm_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            csv_path: std::env::var("CSV_DATA_PATH")
                .unwrap_or_else(|_| "sample_data.csv".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            use_llm: std::env::var("USE_LLM")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(true),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            anthropic_api_url: std::env::var("ANTHROPIC_API_URL")
                .unwrap_or_else(|_| ANTHROPIC_API_URL.to_string()),
            llm_model: std::env::var("LLM_MODEL")
                .unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_LLM_TIMEOUT_SECS.to_string())
                .parse::<u64>()
                .map_err(|_| {
                    AppError::Config("LLM_TIMEOUT_SECS must be a positive integer".to_string())
                })?,
        })
    }
}
