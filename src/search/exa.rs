use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::{ContentMode, SearchMode, SearchProvider, SearchRequest, SearchResult};

pub struct ExaProvider {
    client: reqwest::Client,
    api_key: String,
}

impl ExaProvider {
    pub fn new(api_key: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client"),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ExaSearchRequest {
    query: String,
    #[serde(rename = "numResults")]
    num_results: u32,
    #[serde(rename = "type")]
    search_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'static str>,
    #[serde(rename = "startPublishedDate")]
    start_published_date: String,
    contents: ExaContents,
}

#[derive(Serialize)]
struct ExaContents {
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<bool>,
}

#[derive(Deserialize)]
struct ExaSearchResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Deserialize)]
struct ExaResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: Option<String>,
    summary: Option<String>,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ExaError {
    error: String,
}

#[async_trait::async_trait]
impl SearchProvider for ExaProvider {
    async fn search(&self, req: &SearchRequest) -> anyhow::Result<Vec<SearchResult>> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| anyhow::anyhow!("invalid API key header: {e}"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let contents = match req.content_mode {
            ContentMode::Summary => ExaContents {
                summary: Some(true),
                text: None,
            },
            ContentMode::FullText => ExaContents {
                summary: None,
                text: Some(true),
            },
        };

        let body = ExaSearchRequest {
            query: req.query.clone(),
            num_results: req.max_results,
            search_type: "auto",
            category: match req.mode {
                SearchMode::Auto => None,
                SearchMode::News => Some("news"),
            },
            start_published_date: format!("{}T00:00:00.000Z", req.start_date),
            contents,
        };

        let response = self
            .client
            .post("https://api.exa.ai/search")
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            if let Ok(err) = serde_json::from_str::<ExaError>(&error_body) {
                return Err(anyhow::anyhow!("Exa API error ({}): {}", status, err.error));
            }
            return Err(anyhow::anyhow!(
                "Exa API error ({}): {}",
                status,
                error_body
            ));
        }

        let resp: ExaSearchResponse = response.json().await?;

        let results = resp
            .results
            .into_iter()
            .map(|r| {
                let text = match req.content_mode {
                    ContentMode::Summary => r.summary.or(r.text),
                    ContentMode::FullText => r.text.or(r.summary),
                };
                SearchResult {
                    url: r.url,
                    title: r.title.unwrap_or_default(),
                    text: text.unwrap_or_default(),
                }
            })
            .collect();

        Ok(results)
    }

    fn name(&self) -> &str {
        "exa"
    }
}
