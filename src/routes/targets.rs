use axum::Json;
use serde::Serialize;

use crate::targets::KNOWN_TARGETS;

#[derive(Debug, Serialize)]
pub struct TargetInfo {
    pub name: &'static str,
    pub curated: bool,
}

/// Curated coverage list for the presentation layer's picker. Reports
/// can still be requested for any non-empty target name.
pub async fn list_targets() -> Json<Vec<TargetInfo>> {
    Json(
        KNOWN_TARGETS
            .iter()
            .map(|p| TargetInfo {
                name: p.name,
                curated: true,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_targets_includes_known_set() {
        let Json(targets) = list_targets().await;
        let names: Vec<&str> = targets.iter().map(|t| t.name).collect();
        assert!(names.contains(&"Waymo"));
        assert!(names.contains(&"Zoox"));
        assert_eq!(names.len(), KNOWN_TARGETS.len());
    }
}
