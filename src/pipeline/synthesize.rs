use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::fetch::EvidenceItem;
use super::query::LookbackWindow;
use super::sanitize::{ascii_sanitize, strip_leading_noise};
use crate::cache::{CacheKey, ReportCache};
use crate::error::AppError;
use crate::llm::{GenerateRequest, LlmClient};
use crate::targets::Target;
use crate::telemetry::metrics::{REPORT_CACHE_HIT_COUNT, REPORT_CACHE_MISS_COUNT};

/// Final pipeline product. Created once per successful synthesis and
/// immutable afterwards; a later run supersedes it with a new value
/// rather than mutating this one.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id: Uuid,
    pub target: String,
    pub body_text: String,
    pub body_ascii: String,
    pub source_urls: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct SynthesisParams<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

const SYSTEM_PROMPT: &str = "You are a senior competitive-intelligence analyst covering the \
    autonomous vehicle industry. Write factual, data-driven markdown grounded only in the \
    provided sources. Never invent numbers.";

#[tracing::instrument(
    name = "pipeline_stage synthesize",
    skip(llm, cache, params, evidence),
    fields(
        pipeline.stage = "synthesize",
        report.target = %target,
        report.cache_hit,
        report.sources,
    )
)]
pub async fn synthesize(
    llm: &LlmClient,
    cache: &ReportCache,
    params: &SynthesisParams<'_>,
    target: &Target,
    window: LookbackWindow,
    evidence: &[EvidenceItem],
) -> Result<Arc<Report>, AppError> {
    // Callers short-circuit empty evidence before this stage.
    if evidence.is_empty() {
        return Err(AppError::Synthesis("evidence set is empty".into()));
    }

    let span = tracing::Span::current();

    let key = CacheKey::new(target, window);
    if let Some(report) = cache.get(&key).await {
        REPORT_CACHE_HIT_COUNT.add(1, &[]);
        span.record("report.cache_hit", true);
        return Ok(report);
    }
    REPORT_CACHE_MISS_COUNT.add(1, &[]);
    span.record("report.cache_hit", false);

    let resp = llm
        .generate(&GenerateRequest {
            model: params.model.to_string(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(target, evidence),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        })
        .await
        .map_err(|e| AppError::Synthesis(e.to_string()))?;

    let body_text = strip_leading_noise(&resp.content).to_string();
    if body_text.is_empty() {
        return Err(AppError::Synthesis("generation returned empty text".into()));
    }
    let body_ascii = ascii_sanitize(&body_text);

    let source_urls: Vec<String> = evidence.iter().map(|e| e.url.clone()).collect();

    let report = Arc::new(Report {
        id: Uuid::new_v4(),
        target: target.name().to_string(),
        body_text,
        body_ascii,
        source_urls,
        generated_at: Utc::now(),
    });

    cache.put(key, report.clone()).await;

    span.record("report.sources", report.source_urls.len());

    Ok(report)
}

fn build_prompt(target: &Target, evidence: &[EvidenceItem]) -> String {
    let mut context = String::new();
    for item in evidence {
        context.push_str(&format!("Source: {}\nSummary: {}\n\n", item.url, item.text));
    }

    format!(
        "Using this data:\n{context}\
        Provide a technical summary of {target}'s current L4 status as markdown with exactly \
        these sections:\n\
        ## Strategic Footprint\n\
        ## Hardware & Tech\n\
        ## Commercial & Partnership\n\
        ## Safety & Regulatory\n\n\
        Include a bulleted list of city launches and key metrics (fleet size, capital) where \
        the sources support them."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GenerateResponse, Provider};
    use crate::retry::RetryPolicy;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeProvider {
        calls: AtomicUsize,
        response: Result<&'static str, &'static str>,
    }

    impl FakeProvider {
        fn returning(text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: Ok(text),
            })
        }

        fn failing(msg: &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: Err(msg),
            })
        }
    }

    #[async_trait::async_trait]
    impl Provider for FakeProvider {
        async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.response {
                Ok(text) => Ok(GenerateResponse {
                    content: text.to_string(),
                    model: req.model.clone(),
                    input_tokens: 100,
                    output_tokens: 50,
                    cost_usd: 0.0,
                    finish_reason: "stop".to_string(),
                    provider: String::new(),
                }),
                Err(msg) => Err(anyhow::anyhow!("{msg}")),
            }
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn client_for(provider: Arc<FakeProvider>) -> LlmClient {
        LlmClient {
            primary: provider,
            fallback: None,
            primary_provider: "fake".to_string(),
            fallback_provider: String::new(),
            fallback_model: String::new(),
            retry: RetryPolicy::none(),
            deadline: Duration::from_secs(5),
        }
    }

    fn params() -> SynthesisParams<'static> {
        SynthesisParams {
            model: "gemini-2.0-flash-lite",
            temperature: 0.3,
            max_tokens: 4096,
        }
    }

    fn evidence_of(urls: &[&str]) -> Vec<EvidenceItem> {
        urls.iter()
            .map(|u| EvidenceItem {
                url: u.to_string(),
                text: format!("summary for {u}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_strips_leading_noise_and_orders_sources() {
        let provider = FakeProvider::returning("  ({Intro...full text})");
        let llm = client_for(provider);
        let cache = ReportCache::new();
        let target = Target::new("Zoox").unwrap();
        let evidence = evidence_of(&[
            "https://example.com/u1",
            "https://example.com/u2",
            "https://example.com/u3",
        ]);

        let report = synthesize(
            &llm,
            &cache,
            &params(),
            &target,
            LookbackWindow::days(60),
            &evidence,
        )
        .await
        .unwrap();

        assert!(report.body_text.starts_with("Intro"));
        assert_eq!(
            report.source_urls,
            vec![
                "https://example.com/u1",
                "https://example.com/u2",
                "https://example.com/u3"
            ]
        );
        assert_eq!(report.target, "Zoox");
    }

    #[tokio::test]
    async fn test_cache_round_trip_skips_generation() {
        let provider = FakeProvider::returning("## Strategic Footprint\nreport body");
        let llm = client_for(provider.clone());
        let cache = ReportCache::new();
        let target = Target::new("Waymo").unwrap();
        let window = LookbackWindow::days(60);
        let evidence = evidence_of(&["https://example.com/a"]);

        let first = synthesize(&llm, &cache, &params(), &target, window, &evidence)
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let second = synthesize(&llm, &cache, &params(), &target, window, &evidence)
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_different_window_misses_cache() {
        let provider = FakeProvider::returning("body");
        let llm = client_for(provider.clone());
        let cache = ReportCache::new();
        let target = Target::new("Waymo").unwrap();
        let evidence = evidence_of(&["https://example.com/a"]);

        synthesize(
            &llm,
            &cache,
            &params(),
            &target,
            LookbackWindow::days(60),
            &evidence,
        )
        .await
        .unwrap();
        synthesize(
            &llm,
            &cache,
            &params(),
            &target,
            LookbackWindow::days(30),
            &evidence,
        )
        .await
        .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_quota_error_leaves_cache_empty() {
        let provider = FakeProvider::failing("quota exceeded for project");
        let llm = client_for(provider);
        let cache = ReportCache::new();
        let target = Target::new("Zoox").unwrap();
        let window = LookbackWindow::days(60);
        let evidence = evidence_of(&["https://example.com/a"]);

        let err = synthesize(&llm, &cache, &params(), &target, window, &evidence)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Synthesis(_)));

        let key = CacheKey::new(&target, window);
        assert!(cache.get(&key).await.is_none());
        assert!(cache.last().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_evidence_never_reaches_provider() {
        let provider = FakeProvider::returning("should not be called");
        let llm = client_for(provider.clone());
        let cache = ReportCache::new();
        let target = Target::new("Motional").unwrap();

        let err = synthesize(
            &llm,
            &cache,
            &params(),
            &target,
            LookbackWindow::days(60),
            &[],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Synthesis(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_whitespace_only_response_is_an_error() {
        let provider = FakeProvider::returning("  ([ \n\t");
        let llm = client_for(provider);
        let cache = ReportCache::new();
        let target = Target::new("Zoox").unwrap();
        let window = LookbackWindow::days(60);

        let err = synthesize(
            &llm,
            &cache,
            &params(),
            &target,
            window,
            &evidence_of(&["https://example.com/a"]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Synthesis(_)));
        assert!(cache.get(&CacheKey::new(&target, window)).await.is_none());
    }

    #[tokio::test]
    async fn test_body_ascii_is_pure_ascii() {
        let provider = FakeProvider::returning("Fleet 🚗 size — 250 vehicles in São Paulo");
        let llm = client_for(provider);
        let cache = ReportCache::new();
        let target = Target::new("Zoox").unwrap();

        let report = synthesize(
            &llm,
            &cache,
            &params(),
            &target,
            LookbackWindow::days(60),
            &evidence_of(&["https://example.com/a"]),
        )
        .await
        .unwrap();

        assert!(report.body_ascii.bytes().all(|b| b <= 0x7f));
        assert!(report.body_text.contains('🚗'));
    }

    #[test]
    fn test_prompt_serializes_evidence_in_order() {
        let target = Target::new("Zoox").unwrap();
        let evidence = evidence_of(&["https://example.com/1", "https://example.com/2"]);
        let prompt = build_prompt(&target, &evidence);

        let first = prompt.find("https://example.com/1").unwrap();
        let second = prompt.find("https://example.com/2").unwrap();
        assert!(first < second);
        assert!(prompt.contains("## Strategic Footprint"));
        assert!(prompt.contains("## Safety & Regulatory"));
        assert!(prompt.contains("Zoox"));
    }
}
