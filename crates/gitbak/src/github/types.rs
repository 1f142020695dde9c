//! GitHub GraphQL response types.
//!
//! Only the slice of the starred-repositories query the batch mode needs.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One starred repository, as consumed by the batch orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarredRepo {
    /// Clone URL of the repository.
    pub url: String,
    /// When the viewer starred it.
    pub starred_at: DateTime<Utc>,
}

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse {
    pub data: Option<ResponseData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseData {
    pub viewer: Viewer,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Viewer {
    #[serde(rename = "starredRepositories")]
    pub starred_repositories: StarredRepositories,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StarredRepositories {
    pub edges: Vec<StarredEdge>,
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StarredEdge {
    pub node: RepoNode,
    #[serde(rename = "starredAt")]
    pub starred_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RepoNode {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
}
