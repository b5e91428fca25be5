use std::fmt;

use crate::error::AppError;

/// Company under analysis. Always non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target(String);

impl Target {
    pub fn new(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("target must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TargetProfile {
    pub name: &'static str,
    /// OR-alternative appended for companies with a thin public footprint.
    pub broadener: Option<&'static str>,
}

/// Curated coverage set. Arbitrary non-empty targets are still accepted;
/// profiles only add query broadening for the names we know need it.
pub const KNOWN_TARGETS: &[TargetProfile] = &[
    TargetProfile {
        name: "May Mobility",
        broadener: Some("site:maymobility.com OR \"May Mobility\" robotaxi"),
    },
    TargetProfile {
        name: "Motional",
        broadener: Some("\"Motional\" IONIQ 5 robotaxi"),
    },
    TargetProfile {
        name: "Tesla",
        broadener: None,
    },
    TargetProfile {
        name: "Waymo",
        broadener: None,
    },
    TargetProfile {
        name: "Zoox",
        broadener: None,
    },
];

pub fn profile_for(name: &str) -> Option<&'static TargetProfile> {
    KNOWN_TARGETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}
