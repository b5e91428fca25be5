use std::env;
use std::time::Duration;

use anyhow::Context;

use crate::search::{ContentMode, SearchMode};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub exa_api_key: String,
    pub gemini_api_key: String,
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub fallback_model: String,
    pub lookback_days: i64,
    pub max_results: u32,
    pub evidence_text_cap: usize,
    pub search_mode: SearchMode,
    pub content_mode: ContentMode,
    pub search_retries: u32,
    pub synthesis_retries: u32,
    pub stage_timeout_secs: u64,
    pub default_temperature: f32,
    pub default_max_tokens: u32,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env::var("APP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("APP_PORT must be a number")?,
            environment: env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            exa_api_key: env::var("EXA_API_KEY").context("EXA_API_KEY must be set")?,
            gemini_api_key: env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?,
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").ok(),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gemini-2.0-flash-lite".to_string()),
            fallback_model: env::var("FALLBACK_MODEL")
                .unwrap_or_else(|_| "claude-haiku-4-5-20251001".to_string()),
            lookback_days: env::var("LOOKBACK_DAYS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("LOOKBACK_DAYS must be a number")?,
            max_results: env::var("MAX_RESULTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .context("MAX_RESULTS must be a number")?,
            evidence_text_cap: env::var("EVIDENCE_TEXT_CAP")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .context("EVIDENCE_TEXT_CAP must be a number")?,
            search_mode: env::var("SEARCH_MODE")
                .unwrap_or_else(|_| "auto".to_string())
                .parse()
                .context("SEARCH_MODE must be 'auto' or 'news'")?,
            content_mode: env::var("CONTENT_MODE")
                .unwrap_or_else(|_| "summary".to_string())
                .parse()
                .context("CONTENT_MODE must be 'summary' or 'fulltext'")?,
            search_retries: env::var("SEARCH_RETRIES")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .context("SEARCH_RETRIES must be a number")?,
            synthesis_retries: env::var("SYNTHESIS_RETRIES")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .context("SYNTHESIS_RETRIES must be a number")?,
            stage_timeout_secs: env::var("STAGE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "45".to_string())
                .parse()
                .context("STAGE_TIMEOUT_SECS must be a number")?,
            default_temperature: env::var("DEFAULT_TEMPERATURE")
                .unwrap_or_else(|_| "0.3".to_string())
                .parse()
                .context("DEFAULT_TEMPERATURE must be a number")?,
            default_max_tokens: env::var("DEFAULT_MAX_TOKENS")
                .unwrap_or_else(|_| "4096".to_string())
                .parse()
                .context("DEFAULT_MAX_TOKENS must be a number")?,
            otel_service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "intel-report-generator".to_string()),
            otel_exporter_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }
}
