use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::pipeline::Report;
use crate::pipeline::query::LookbackWindow;
use crate::targets::Target;

/// Cache key: target (case-folded) plus the lookback window it was
/// synthesized under. A 30-day report and a 60-day report for the same
/// company are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    target: String,
    window_days: i64,
}

impl CacheKey {
    pub fn new(target: &Target, window: LookbackWindow) -> Self {
        Self {
            target: target.name().to_ascii_lowercase(),
            window_days: window.days,
        }
    }
}

/// Keyed report store with a single-slot "last report" view layered on
/// top. Entries are written whole on successful synthesis and never
/// partially updated; a failed synthesis leaves the key absent.
pub struct ReportCache {
    entries: RwLock<HashMap<CacheKey, Arc<Report>>>,
    last: RwLock<Option<Arc<Report>>>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            last: RwLock::new(None),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Arc<Report>> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn put(&self, key: CacheKey, report: Arc<Report>) {
        self.entries.write().await.insert(key, report.clone());
        *self.last.write().await = Some(report);
    }

    /// Most recently synthesized report across all targets, for the
    /// session-level "last report" surface.
    pub async fn last(&self) -> Option<Arc<Report>> {
        self.last.read().await.clone()
    }

    #[allow(dead_code)]
    pub async fn invalidate(&self, key: &CacheKey) {
        self.entries.write().await.remove(key);
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new()
    }
}
