//! Build-failure records produced by a status source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a CI build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    #[default]
    Failed,
}

/// A currently failing build and the person held responsible for it.
///
/// Created once per poll cycle and dropped after dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEvent {
    /// Name of the broken project.
    pub project_name: String,
    /// Identifier of the user who broke it.
    pub responsible_user: String,
    /// Build outcome.
    #[serde(default)]
    pub status: BuildStatus,
    /// When the failure was seen.
    pub observed_at: DateTime<Utc>,
}

impl BuildEvent {
    /// Records a failed build observed now.
    pub fn failed(project_name: impl Into<String>, responsible_user: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            responsible_user: responsible_user.into(),
            status: BuildStatus::Failed,
            observed_at: Utc::now(),
        }
    }
}
