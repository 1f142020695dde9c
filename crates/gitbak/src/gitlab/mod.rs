//! GitLab hosting-service integration.
//!
//! Group/project lookup and creation, the populated-destination probe, and
//! authenticated push-URL construction.

mod client;
mod error;
mod types;

pub use client::{GitLabClient, redact};
pub use error::{GitLabError, is_transient_error};
pub use types::{Group, Project};
