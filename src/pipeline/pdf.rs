use serde::Serialize;

use super::sanitize::ascii_sanitize;
use super::synthesize::Report;

/// What the external PDF-rendering collaborator consumes: a title plus
/// an ASCII-only body. The collaborator returns opaque bytes which this
/// pipeline never inspects.
#[derive(Debug, Clone, Serialize)]
pub struct PdfPayload {
    pub title: String,
    pub body: String,
}

impl PdfPayload {
    pub fn for_report(report: &Report) -> Self {
        Self {
            title: ascii_sanitize(&format!("Current Status: {}", report.target)),
            body: report.body_ascii.clone(),
        }
    }
}
