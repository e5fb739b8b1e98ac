use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub sampling: SamplingConfig,
    pub request: RequestConfig,
    pub logging: LoggingConfig,
}

/// Completion-backend configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API credential. Absent credentials block workflows at call time
    /// rather than failing startup, so uploads and summaries still work.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

/// Sampling parameters passed through to the completion backend
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    pub max_tokens: u32,
    pub temperature: f64,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

const MAX_TOKENS_FLOOR: u32 = 1000;
const MAX_TOKENS_CEILING: u32 = 8000;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let llm = LlmConfig {
            api_key: env::var("METABOLENS_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("METABOLENS_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            model: env::var("METABOLENS_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        };

        let sampling = SamplingConfig {
            max_tokens: env::var("MAX_OUTPUT_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4000)
                .clamp(MAX_TOKENS_FLOOR, MAX_TOKENS_CEILING),
            temperature: env::var("TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.7_f64)
                .clamp(0.0, 1.0),
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(120_000),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        Config {
            llm,
            sampling,
            request,
            logging,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4000,
            temperature: 0.7,
        }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_ms: 120_000 }
    }
}
