use serde::Serialize;

use super::query::SearchQueryPlan;
use super::sanitize::truncate_chars;
use crate::error::AppError;
use crate::search::{ContentMode, SearchClient, SearchMode, SearchRequest};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EvidenceItem {
    pub url: String,
    pub text: String,
}

/// Ordered evidence, 0..=max_results items. Insertion order from the
/// search collaborator is preserved; an empty set is a valid terminal
/// state, not an error.
pub type EvidenceSet = Vec<EvidenceItem>;

#[derive(Debug, Clone, Copy)]
pub struct FetchParams {
    pub max_results: u32,
    pub text_cap: usize,
    pub mode: SearchMode,
    pub content_mode: ContentMode,
}

#[tracing::instrument(
    name = "pipeline_stage fetch",
    skip(search, plan, params),
    fields(
        pipeline.stage = "fetch",
        evidence.count,
    )
)]
pub async fn fetch(
    search: &SearchClient,
    plan: &SearchQueryPlan,
    params: &FetchParams,
) -> Result<EvidenceSet, AppError> {
    let request = SearchRequest {
        query: plan.query.clone(),
        max_results: params.max_results,
        mode: params.mode,
        start_date: plan.start_date,
        content_mode: params.content_mode,
    };

    let results = search
        .search(&request)
        .await
        .map_err(|e| AppError::Fetch(e.to_string()))?;

    let evidence: EvidenceSet = results
        .into_iter()
        .filter(|r| is_well_formed_url(&r.url))
        .take(params.max_results as usize)
        .map(|r| EvidenceItem {
            url: r.url,
            text: truncate_chars(&r.text, params.text_cap),
        })
        .collect();

    let span = tracing::Span::current();
    span.record("evidence.count", evidence.len());

    if evidence.is_empty() {
        tracing::info!(query = %plan.query, start_date = %plan.start_date, "No matching evidence");
    }

    Ok(evidence)
}

fn is_well_formed_url(url: &str) -> bool {
    reqwest::Url::parse(url).map(|u| u.has_host()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use crate::search::{SearchProvider, SearchResult};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::time::Duration;

    struct StaticProvider {
        results: Vec<SearchResult>,
    }

    #[async_trait::async_trait]
    impl SearchProvider for StaticProvider {
        async fn search(&self, _req: &SearchRequest) -> anyhow::Result<Vec<SearchResult>> {
            Ok(self.results.clone())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn client_with(results: Vec<SearchResult>) -> SearchClient {
        SearchClient::new(
            Arc::new(StaticProvider { results }),
            RetryPolicy::none(),
            Duration::from_secs(5),
        )
    }

    fn plan() -> SearchQueryPlan {
        SearchQueryPlan {
            query: "Zoox updates".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 6, 7).unwrap(),
        }
    }

    fn params() -> FetchParams {
        FetchParams {
            max_results: 3,
            text_cap: 2000,
            mode: SearchMode::Auto,
            content_mode: ContentMode::Summary,
        }
    }

    fn result(url: &str, text: &str) -> SearchResult {
        SearchResult {
            url: url.to_string(),
            title: String::new(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_zero_matches_is_empty_set_not_error() {
        let search = client_with(vec![]);
        let evidence = fetch(&search, &plan(), &params()).await.unwrap();
        assert!(evidence.is_empty());
    }

    #[tokio::test]
    async fn test_text_is_hard_capped_per_item() {
        let long = "a".repeat(5000);
        let search = client_with(vec![
            result("https://example.com/a", &long),
            result("https://example.com/b", "short"),
        ]);

        let evidence = fetch(&search, &plan(), &params()).await.unwrap();
        assert_eq!(evidence.len(), 2);
        assert_eq!(evidence[0].text.len(), 2000);
        assert_eq!(evidence[1].text, "short");
    }

    #[tokio::test]
    async fn test_order_is_preserved() {
        let search = client_with(vec![
            result("https://example.com/1", "first"),
            result("https://example.com/2", "second"),
            result("https://example.com/3", "third"),
        ]);

        let evidence = fetch(&search, &plan(), &params()).await.unwrap();
        let urls: Vec<&str> = evidence.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/1",
                "https://example.com/2",
                "https://example.com/3"
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_urls_are_dropped() {
        let search = client_with(vec![
            result("", "no url"),
            result("not a url", "bad url"),
            result("https://example.com/ok", "good"),
        ]);

        let evidence = fetch(&search, &plan(), &params()).await.unwrap();
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].url, "https://example.com/ok");
    }

    #[tokio::test]
    async fn test_max_results_is_enforced() {
        let results = (0..6)
            .map(|i| result(&format!("https://example.com/{i}"), "text"))
            .collect();
        let search = client_with(results);

        let evidence = fetch(&search, &plan(), &params()).await.unwrap();
        assert_eq!(evidence.len(), 3);
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_as_fetch_error() {
        struct FailingProvider;

        #[async_trait::async_trait]
        impl SearchProvider for FailingProvider {
            async fn search(&self, _req: &SearchRequest) -> anyhow::Result<Vec<SearchResult>> {
                Err(anyhow::anyhow!("429 rate limited"))
            }

            fn name(&self) -> &str {
                "fake"
            }
        }

        let search = SearchClient::new(
            Arc::new(FailingProvider),
            RetryPolicy::none(),
            Duration::from_secs(5),
        );

        let err = fetch(&search, &plan(), &params()).await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
    }
}
