//! Helpers shared by the sync and copy-github commands.

use std::sync::Arc;

use gitbak::{GitLabClient, Orchestrator};

use crate::config::Config;
use crate::exit_codes;
use crate::progress::LoggingReporter;

/// Build an orchestrator from configuration, wired to the logging reporter.
///
/// Returns the exit code for missing or invalid GitLab settings; every
/// command needs a destination instance.
pub fn build_orchestrator(config: &Config) -> Result<Orchestrator, i32> {
    let url = config.gitlab_url();
    let Some(username) = config.gitlab_username() else {
        tracing::error!("GitLab username is not configured (GITLAB_USERNAME or config file)");
        return Err(exit_codes::CONFIGURATION);
    };
    let Some(token) = config.gitlab_token() else {
        tracing::error!("GitLab token is not configured (GITLAB_PRIVATE_TOKEN or config file)");
        return Err(exit_codes::CONFIGURATION);
    };

    let gitlab = GitLabClient::new(&url, &username, &token).map_err(|e| {
        tracing::error!(error = %e, "Failed to construct GitLab client");
        exit_codes::CONFIGURATION
    })?;

    let reporter = Arc::new(LoggingReporter::new());
    Ok(Orchestrator::new(gitlab).with_progress(Box::new(move |event| reporter.handle(event))))
}
