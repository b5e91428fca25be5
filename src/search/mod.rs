pub mod client;
pub mod exa;

pub use client::SearchClient;

use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unrecognized mode: {0}")]
pub struct ParseModeError(String);

/// Search scope requested from the collaborator. `News` restricts results
/// to the provider's news category; `Auto` lets it rank freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Auto,
    News,
}

impl FromStr for SearchMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "news" => Ok(Self::News),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

/// Which content field the collaborator should return per result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    Summary,
    FullText,
}

impl FromStr for ContentMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "fulltext" | "full_text" | "text" => Ok(Self::FullText),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: u32,
    pub mode: SearchMode,
    pub start_date: NaiveDate,
    pub content_mode: ContentMode,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub text: String,
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, req: &SearchRequest) -> anyhow::Result<Vec<SearchResult>>;
    fn name(&self) -> &str;
}
