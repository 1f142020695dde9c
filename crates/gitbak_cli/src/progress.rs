//! Renders orchestrator progress events through tracing.

use gitbak::BackupProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: BackupProgress) {
        match event {
            BackupProgress::Resolving { source } => {
                tracing::debug!(source = %source, "Resolving destination");
            }

            BackupProgress::DestinationReady { destination } => {
                tracing::debug!(destination = %destination, "Destination ready");
            }

            BackupProgress::SkippedExisting {
                source,
                destination,
            } => {
                tracing::warn!(
                    source = %source,
                    destination = %destination,
                    "Destination already has content, skipping"
                );
            }

            BackupProgress::SkippedFresh {
                source,
                destination,
                last_activity,
            } => {
                tracing::info!(
                    source = %source,
                    destination = %destination,
                    last_activity = %last_activity,
                    "Destination recently backed up, skipping"
                );
            }

            BackupProgress::Cloning { source } => {
                tracing::info!(source = %source, "Cloning");
            }

            BackupProgress::Pushing { destination } => {
                tracing::info!(destination = %destination, "Mirror-pushing");
            }

            BackupProgress::Done {
                source,
                destination,
            } => {
                tracing::info!(source = %source, destination = %destination, "Backed up");
            }

            BackupProgress::ItemFailed { source, error } => {
                tracing::error!(source = %source, error = %error, "Backup failed");
            }

            BackupProgress::FetchingSources { limit } => {
                tracing::info!(limit, "Fetching starred repositories");
            }

            BackupProgress::SourcesFetched { total } => {
                tracing::info!(total, "Fetched starred repositories");
            }
        }
    }
}
