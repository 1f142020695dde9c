//! The `sync` command: back up one repository.

use gitbak::{BackupError, BackupOutcome, BackupRequest};

use crate::config::Config;
use crate::exit_codes;

use super::shared::build_orchestrator;

pub async fn handle_sync(
    config: &Config,
    source: String,
    project: Option<String>,
    group: Option<String>,
    force: bool,
) -> i32 {
    let orchestrator = match build_orchestrator(config) {
        Ok(orchestrator) => orchestrator,
        Err(code) => return code,
    };

    let request = BackupRequest {
        source,
        project,
        group,
        overwrite: force,
    };

    match orchestrator.backup_one(&request).await {
        Ok(BackupOutcome::Done { .. }) => exit_codes::SUCCESS,
        // Non-fatal for the item, but a distinct exit code in single mode.
        Ok(BackupOutcome::SkippedExisting { .. }) | Ok(BackupOutcome::SkippedFresh { .. }) => {
            exit_codes::DESTINATION_CONFLICT
        }
        Err(err) => {
            tracing::error!(error = %err, "Backup failed");
            match err {
                BackupError::Configuration { .. } => exit_codes::CONFIGURATION,
                BackupError::Transfer { .. } => exit_codes::TRANSFER,
            }
        }
    }
}
