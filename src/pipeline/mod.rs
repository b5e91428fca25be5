pub mod fetch;
pub mod orchestrator;
pub mod pdf;
pub mod query;
pub mod sanitize;
pub mod synthesize;

pub use orchestrator::{PipelineOutcome, ReportRequest, generate_report};
pub use synthesize::Report;
