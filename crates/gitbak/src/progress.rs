//! Progress events emitted by the backup orchestrator.
//!
//! The library reports through an optional callback and leaves rendering to
//! the caller; the CLI maps these onto tracing.

/// Progress callback for backup operations.
pub type ProgressCallback = Box<dyn Fn(BackupProgress) + Send + Sync>;

/// Progress events for a backup run.
#[derive(Debug, Clone)]
pub enum BackupProgress {
    /// Resolving the destination for a source.
    Resolving { source: String },

    /// The destination project exists (or was created).
    DestinationReady { destination: String },

    /// Destination already has content and overwrite was not requested.
    SkippedExisting { source: String, destination: String },

    /// Destination was active within the recency window.
    SkippedFresh {
        source: String,
        destination: String,
        last_activity: chrono::DateTime<chrono::Utc>,
    },

    /// Cloning the source repository.
    Cloning { source: String },

    /// Mirror-pushing to the destination.
    Pushing { destination: String },

    /// One backup item finished.
    Done { source: String, destination: String },

    /// One batch item failed; the batch continues.
    ItemFailed { source: String, error: String },

    /// Batch enumeration started.
    FetchingSources { limit: usize },

    /// Batch enumeration finished.
    SourcesFetched { total: usize },
}

/// Emit a progress event if a callback is registered.
pub fn emit(on_progress: Option<&ProgressCallback>, event: BackupProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
