use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::targets::{self, Target};

/// Date range [now - days, now) bounding evidence freshness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub days: i64,
}

impl LookbackWindow {
    pub fn days(days: i64) -> Self {
        Self { days }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQueryPlan {
    pub query: String,
    pub start_date: NaiveDate,
}

/// Derive the provider search string and freshness floor. Pure function
/// of its inputs; the same (target, now, window) always yields the same
/// plan. The topic keywords bias results toward the target's deployment
/// and fleet news and away from generic industry coverage.
pub fn build_query(target: &Target, now: DateTime<Utc>, window: LookbackWindow) -> SearchQueryPlan {
    let name_clause = match targets::profile_for(target.name()).and_then(|p| p.broadener) {
        Some(alt) => format!("(\"{}\" OR {})", target.name(), alt),
        None => target.name().to_string(),
    };

    let query = format!(
        "Latest L4 autonomous driving updates for {} including city launches, fleet size, and funding as of {}",
        name_clause,
        now.format("%b %Y")
    );

    let start_date = (now - Duration::days(window.days)).date_naive();

    SearchQueryPlan { query, start_date }
}
