//! GitHub GraphQL client for enumerating starred repositories.
//!
//! Cursor-based pagination with page size 100, ordered by star time
//! descending, until `hasNextPage` is false or the caller's limit is
//! reached. Each page request is retried with bounded backoff; after
//! exhaustion the error surfaces instead of looping forever.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use super::error::{GitHubError, is_transient_error};
use super::types::{GraphQlResponse, StarredRepo};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpMethod, HttpRequest, HttpTransport};
use crate::retry::with_retry;

/// Default GraphQL endpoint.
pub const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Repositories fetched per page.
const PAGE_SIZE: u32 = 100;

/// GitHub GraphQL API client.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    endpoint: String,
    token: String,
}

impl GitHubClient {
    /// Create a new GitHub client against the public API.
    pub fn new(token: &str) -> Result<Self, GitHubError> {
        let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(30))
            .map_err(|e| GitHubError::Http(e.to_string()))?;
        Ok(Self::with_transport(
            GITHUB_GRAPHQL_URL,
            token,
            Arc::new(transport),
        ))
    }

    /// Create a client with an explicit endpoint and transport. Used by
    /// tests.
    pub fn with_transport(
        endpoint: &str,
        token: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        }
    }

    /// Fetch the viewer's starred repositories, newest stars first, up to
    /// `limit` entries.
    pub async fn fetch_starred(&self, limit: usize) -> Result<Vec<StarredRepo>, GitHubError> {
        let mut starred: Vec<StarredRepo> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.fetch_page(cursor.as_deref()).await?;

            for edge in page.edges {
                starred.push(StarredRepo {
                    url: edge.node.url,
                    starred_at: edge.starred_at,
                });
            }

            tracing::debug!(
                total_so_far = starred.len(),
                has_next_page = page.page_info.has_next_page,
                "Fetched starred page"
            );

            if !page.page_info.has_next_page || starred.len() >= limit {
                break;
            }
            // A further page with no cursor to reach it cannot be fetched;
            // refetching from the start would loop forever.
            match page.page_info.end_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        starred.truncate(limit);
        Ok(starred)
    }

    async fn fetch_page(
        &self,
        cursor: Option<&str>,
    ) -> Result<super::types::StarredRepositories, GitHubError> {
        let query = starred_query(cursor);
        let payload = serde_json::to_vec(&serde_json::json!({ "query": query }))?;

        let response = with_retry(
            || {
                let request = HttpRequest {
                    method: HttpMethod::Post,
                    url: self.endpoint.clone(),
                    headers: vec![
                        ("Authorization".to_string(), format!("bearer {}", self.token)),
                        ("Content-Type".to_string(), "application/json".to_string()),
                        ("User-Agent".to_string(), "gitbak".to_string()),
                    ],
                    body: payload.clone(),
                };
                async move {
                    let response = self.transport.send(request).await?;
                    if !(200..300).contains(&response.status) {
                        let body = String::from_utf8_lossy(&response.body);
                        return Err(GitHubError::from_status(response.status, &body));
                    }
                    Ok(response)
                }
            },
            is_transient_error,
            "POST github graphql",
        )
        .await?;

        let envelope: GraphQlResponse = serde_json::from_slice(&response.body)?;
        if let Some(error) = envelope.errors.first() {
            return Err(GitHubError::GraphQl(error.message.clone()));
        }
        let data = envelope
            .data
            .ok_or_else(|| GitHubError::GraphQl("response carried no data".to_string()))?;

        Ok(data.viewer.starred_repositories)
    }
}

/// Build the starred-repositories query for one page.
fn starred_query(cursor: Option<&str>) -> String {
    let after = match cursor {
        Some(cursor) => format!("\"{}\"", cursor.replace('\\', "\\\\").replace('"', "\\\"")),
        None => "null".to_string(),
    };

    format!(
        r#"{{
    viewer {{
        starredRepositories(first: {PAGE_SIZE}, after: {after}, orderBy: {{field: STARRED_AT, direction: DESC}}) {{
            edges {{
                node {{ url }}
                starredAt
            }}
            pageInfo {{
                hasNextPage
                endCursor
            }}
        }}
    }}
}}"#
    )
}
