use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use super::fetch::{self, FetchParams};
use super::query::{self, LookbackWindow};
use super::synthesize::{self, Report, SynthesisParams};
use crate::cache::ReportCache;
use crate::config::Config;
use crate::error::AppError;
use crate::llm::LlmClient;
use crate::search::SearchClient;
use crate::targets::Target;
use crate::telemetry::metrics::{REPORT_EVIDENCE_ITEMS, REPORT_GENERATION_DURATION};

#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub target: String,
    pub lookback_days: Option<i64>,
}

/// Terminal pipeline states. Empty evidence is a legitimate outcome,
/// distinct from any error.
#[derive(Debug)]
pub enum PipelineOutcome {
    Report(Arc<Report>),
    NoRecentEvidence { target: String, window_days: i64 },
}

#[tracing::instrument(
    name = "pipeline report",
    skip(search, llm, cache, config, request),
    fields(
        report.id,
        report.target,
        report.evidence_count,
        report.duration_ms,
    )
)]
pub async fn generate_report(
    search: &SearchClient,
    llm: &LlmClient,
    cache: &ReportCache,
    config: &Config,
    request: &ReportRequest,
) -> Result<PipelineOutcome, AppError> {
    let start = std::time::Instant::now();

    let target = Target::new(&request.target)?;
    let days = request.lookback_days.unwrap_or(config.lookback_days);
    if days < 1 {
        return Err(AppError::Validation(
            "lookback_days must be at least 1".into(),
        ));
    }
    let window = LookbackWindow::days(days);

    let span = tracing::Span::current();
    span.record("report.target", target.name());

    // Stage 1: derive the search plan
    let plan = query::build_query(&target, Utc::now(), window);

    // Stage 2: fetch evidence from the search collaborator
    let evidence = fetch::fetch(
        search,
        &plan,
        &FetchParams {
            max_results: config.max_results,
            text_cap: config.evidence_text_cap,
            mode: config.search_mode,
            content_mode: config.content_mode,
        },
    )
    .await?;

    span.record("report.evidence_count", evidence.len());
    REPORT_EVIDENCE_ITEMS.record(evidence.len() as f64, &[]);

    if evidence.is_empty() {
        tracing::info!(
            target = %target,
            window_days = days,
            "No recent evidence, skipping synthesis"
        );
        return Ok(PipelineOutcome::NoRecentEvidence {
            target: target.name().to_string(),
            window_days: days,
        });
    }

    // Stage 3: synthesize the report (cache-aware)
    let report = synthesize::synthesize(
        llm,
        cache,
        &SynthesisParams {
            model: &config.llm_model,
            temperature: config.default_temperature,
            max_tokens: config.default_max_tokens,
        },
        &target,
        window,
        &evidence,
    )
    .await?;

    let duration = start.elapsed();
    REPORT_GENERATION_DURATION.record(duration.as_secs_f64(), &[]);

    span.record("report.id", report.id.to_string());
    span.record("report.duration_ms", duration.as_millis() as u64);

    Ok(PipelineOutcome::Report(report))
}
