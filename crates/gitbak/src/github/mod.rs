//! GitHub source-platform integration.
//!
//! Enumerates the authenticated user's starred repositories over the
//! GraphQL API for batch backup runs.

mod client;
mod error;
mod types;

pub use client::{GITHUB_GRAPHQL_URL, GitHubClient};
pub use error::{GitHubError, is_transient_error};
pub use types::StarredRepo;
