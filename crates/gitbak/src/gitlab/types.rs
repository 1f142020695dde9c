//! GitLab API data types.
//!
//! Only the fields the orchestrator consumes; everything else in the API
//! responses is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A GitLab group (namespace).
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    /// Group ID, used as `namespace_id` when creating projects.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// URL path segment.
    pub path: String,
    /// Full path including any parent groups.
    pub full_path: String,
}

/// A GitLab project.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    /// Project ID.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// URL path segment.
    pub path: String,
    /// Full path including namespace (e.g. "group/project").
    pub path_with_namespace: String,
    /// When the project was last active. Drives the recency-window skip in
    /// batch mode.
    pub last_activity_at: DateTime<Utc>,
}
