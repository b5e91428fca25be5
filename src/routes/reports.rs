use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::pipeline::pdf::PdfPayload;
use crate::pipeline::{PipelineOutcome, ReportRequest, generate_report};

pub async fn create_report(
    State(state): State<AppState>,
    Json(body): Json<ReportRequest>,
) -> AppResult<Json<Value>> {
    let outcome = generate_report(
        &state.search_client,
        &state.llm_client,
        &state.cache,
        &state.config,
        &body,
    )
    .await?;

    Ok(Json(outcome_json(&outcome)))
}

pub async fn last_report(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let report = state
        .cache
        .last()
        .await
        .ok_or_else(|| AppError::NotFound("No report generated yet".into()))?;

    let value = serde_json::to_value(&*report).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(value))
}

/// Payload for the external PDF-rendering collaborator: title plus the
/// ASCII-sanitized body of the last report.
pub async fn export_last(State(state): State<AppState>) -> AppResult<Json<PdfPayload>> {
    let report = state
        .cache
        .last()
        .await
        .ok_or_else(|| AppError::NotFound("No report generated yet".into()))?;

    Ok(Json(PdfPayload::for_report(&report)))
}

fn outcome_json(outcome: &PipelineOutcome) -> Value {
    match outcome {
        PipelineOutcome::Report(report) => json!({
            "status": "ok",
            "report": &**report,
        }),
        PipelineOutcome::NoRecentEvidence {
            target,
            window_days,
        } => json!({
            "status": "no_recent_evidence",
            "target": target,
            "window_days": window_days,
        }),
    }
}
