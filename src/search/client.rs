use std::sync::Arc;
use std::time::{Duration, Instant};

use opentelemetry::KeyValue;
use tracing::Instrument;

use super::{SearchProvider, SearchRequest, SearchResult};
use crate::retry::RetryPolicy;
use crate::telemetry::metrics::{
    SEARCH_ERROR_COUNT, SEARCH_OPERATION_DURATION, SEARCH_RESULTS, SEARCH_RETRY_COUNT,
};

pub struct SearchClient {
    pub provider: Arc<dyn SearchProvider>,
    pub provider_name: String,
    pub retry: RetryPolicy,
    pub deadline: Duration,
}

impl SearchClient {
    pub fn new(provider: Arc<dyn SearchProvider>, retry: RetryPolicy, deadline: Duration) -> Self {
        let provider_name = provider.name().to_string();
        Self {
            provider,
            provider_name,
            retry,
            deadline,
        }
    }

    async fn search_once(&self, req: &SearchRequest) -> anyhow::Result<Vec<SearchResult>> {
        let start = Instant::now();

        let span = tracing::info_span!(
            "search.query",
            otel.name = %format!("search.query {}", self.provider_name),
            search.provider.name = %self.provider_name,
            search.request.query = %truncate(&req.query, 500),
            search.request.max_results = req.max_results as i64,
            search.request.start_date = %req.start_date,
            search.response.count = tracing::field::Empty,
            server.address = "api.exa.ai",
            server.port = 443_i64,
            otel.status_code = tracing::field::Empty,
        );

        let result = tokio::time::timeout(self.deadline, self.provider.search(req))
            .instrument(span.clone())
            .await
            .unwrap_or_else(|_| {
                Err(anyhow::anyhow!(
                    "search timed out after {:?}",
                    self.deadline
                ))
            });

        let duration = start.elapsed().as_secs_f64();
        let provider_kv = KeyValue::new("search.provider.name", self.provider_name.clone());

        match result {
            Ok(results) => {
                span.record("search.response.count", results.len() as i64);

                SEARCH_OPERATION_DURATION.record(duration, &[provider_kv.clone()]);
                SEARCH_RESULTS.record(results.len() as f64, &[provider_kv]);

                Ok(results)
            }
            Err(err) => {
                span.record("otel.status_code", "ERROR");
                SEARCH_ERROR_COUNT.add(1, &[provider_kv]);
                Err(err)
            }
        }
    }

    pub async fn search(&self, req: &SearchRequest) -> anyhow::Result<Vec<SearchResult>> {
        let mut last_err = None;

        for attempt in 0..self.retry.attempts() {
            match self.search_once(req).await {
                Ok(results) => return Ok(results),
                Err(err) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        attempts = self.retry.attempts(),
                        provider = %self.provider_name,
                        error = %err,
                        "Search call failed"
                    );

                    if attempt > 0 {
                        SEARCH_RETRY_COUNT.add(
                            1,
                            &[KeyValue::new(
                                "search.provider.name",
                                self.provider_name.clone(),
                            )],
                        );
                    }

                    last_err = Some(err);

                    if attempt + 1 < self.retry.attempts() {
                        tokio::time::sleep(self.retry.delay_before(attempt)).await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("all search attempts exhausted")))
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.char_indices()
            .take_while(|&(i, _)| i < max)
            .map(|(_, c)| c)
            .collect()
    }
}
