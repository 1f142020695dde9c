//! The `copy-github` command: back up the user's starred repositories.

use chrono::Duration;
use gitbak::{BatchOptions, GitHubClient};

use crate::config::Config;
use crate::exit_codes;

use super::shared::build_orchestrator;

pub async fn handle_copy_github(
    config: &Config,
    limit: usize,
    recency_days: Option<i64>,
    force: bool,
) -> i32 {
    let orchestrator = match build_orchestrator(config) {
        Ok(orchestrator) => orchestrator,
        Err(code) => return code,
    };

    let Some(token) = config.github_token() else {
        tracing::error!("GitHub token is not configured (GITHUB_TOKEN or config file)");
        return exit_codes::CONFIGURATION;
    };
    let github = match GitHubClient::new(&token) {
        Ok(github) => github,
        Err(e) => {
            tracing::error!(error = %e, "Failed to construct GitHub client");
            return exit_codes::CONFIGURATION;
        }
    };

    let options = BatchOptions {
        limit,
        recency_window: Duration::days(recency_days.unwrap_or_else(|| config.recency_days())),
        overwrite: force,
    };

    match orchestrator.backup_starred(&github, &options).await {
        Ok(report) => {
            tracing::info!(
                processed = report.processed,
                done = report.done,
                skipped_existing = report.skipped_existing,
                skipped_fresh = report.skipped_fresh,
                failed = report.failed,
                "Batch complete"
            );
            exit_codes::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "Batch failed");
            exit_codes::TRANSFER
        }
    }
}
