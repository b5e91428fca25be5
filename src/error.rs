use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use opentelemetry::trace::TraceContextExt;
use serde_json::json;
use thiserror::Error;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn get_trace_id() -> Option<String> {
    let span = Span::current();
    let context = span.context();
    let span_ref = context.span();
    let span_context = span_ref.span_context();

    if span_context.is_valid() {
        Some(span_context.trace_id().to_string())
    } else {
        None
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Fetch(msg) => {
                tracing::error!(error = %msg, "Evidence fetch error");
                (
                    StatusCode::BAD_GATEWAY,
                    "could not fetch evidence".to_string(),
                )
            }
            AppError::Synthesis(msg) => {
                tracing::error!(error = %msg, "Report synthesis error");
                (
                    StatusCode::BAD_GATEWAY,
                    "could not generate report".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = if let Some(trace_id) = get_trace_id() {
            json!({
                "error": error_message,
                "status": status.as_u16(),
                "trace_id": trace_id,
            })
        } else {
            json!({
                "error": error_message,
                "status": status.as_u16(),
            })
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = AppError::Validation("target must not be empty".to_string());
        assert_eq!(
            error.to_string(),
            "Validation error: target must not be empty"
        );
    }

    #[test]
    fn test_not_found_error() {
        let error = AppError::NotFound("Report".to_string());
        assert_eq!(error.to_string(), "Not found: Report");
    }

    #[test]
    fn test_fetch_error() {
        let error = AppError::Fetch("search provider timeout".to_string());
        assert_eq!(error.to_string(), "Fetch error: search provider timeout");
    }

    #[test]
    fn test_synthesis_error() {
        let error = AppError::Synthesis("quota exceeded".to_string());
        assert_eq!(error.to_string(), "Synthesis error: quota exceeded");
    }

    #[test]
    fn test_fetch_error_hides_cause_from_clients() {
        let response = AppError::Fetch("api key rejected".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_synthesis_error_status() {
        let response = AppError::Synthesis("quota".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_validation_error_status() {
        let response = AppError::Validation("bad input".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_app_result_ok() {
        fn returns_ok() -> AppResult<i32> {
            Ok(42)
        }
        let result = returns_ok();
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 42);
    }
}
