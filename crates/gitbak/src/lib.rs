//! gitbak - back up git repositories to a GitLab instance.
//!
//! Given a source repository URL (or the authenticated user's
//! GitHub-starred repositories), gitbak infers a destination project and
//! group name, creates the destination if absent, and mirror-pushes the
//! repository content.
//!
//! The core is the [`infer`] module: a pure function that decomposes the
//! many historical git URL dialects into a validated project name and an
//! optional group name. Everything else is orchestration around external
//! collaborators (the `git` binary, the GitLab REST API, the GitHub
//! GraphQL API).
//!
//! # Example
//!
//! ```ignore
//! use gitbak::backup::{BackupRequest, Orchestrator};
//! use gitbak::gitlab::GitLabClient;
//!
//! let gitlab = GitLabClient::new("https://gitlab.com", "me", "token")?;
//! let orchestrator = Orchestrator::new(gitlab);
//! let outcome = orchestrator
//!     .backup_one(&BackupRequest {
//!         source: "git@github.com:0xKD/elixir.git".into(),
//!         ..BackupRequest::default()
//!     })
//!     .await?;
//! ```

pub mod backup;
pub mod git;
pub mod github;
pub mod gitlab;
pub mod http;
pub mod infer;
pub mod progress;
pub mod retry;

pub use backup::{
    BackupError, BackupOutcome, BackupRequest, BatchOptions, BatchReport, DestinationTarget,
    Orchestrator,
};
pub use github::GitHubClient;
pub use gitlab::GitLabClient;
pub use infer::{ParsedIdentity, infer_identity, validate_group_name, validate_project_name};
pub use progress::{BackupProgress, ProgressCallback};
