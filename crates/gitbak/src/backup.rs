//! Backup orchestrator: turn a backup request into a completed mirror.
//!
//! Per item the flow is a small state machine:
//!
//! `Pending -> Resolving -> (SkippedFresh | SkippedExisting | Cloning -> Pushing -> Done) | Failed`
//!
//! The orchestrator owns explicitly constructed clients for the duration of
//! one run. Item-level failures in batch mode are caught and counted; the
//! batch never aborts because one source failed. There are no retries at
//! this layer; bounded retry lives inside the API clients.

use chrono::{Duration, Utc};
use thiserror::Error;

use crate::git;
use crate::github::{GitHubClient, GitHubError};
use crate::gitlab::{GitLabClient, Project};
use crate::infer::infer_identity;
use crate::progress::{BackupProgress, ProgressCallback, emit};

/// Name of the remote the mirror push goes through.
pub const BACKUP_REMOTE: &str = "backup";

/// A fully or partially specified backup request.
#[derive(Debug, Clone, Default)]
pub struct BackupRequest {
    /// Source repository URL or path.
    pub source: String,
    /// Explicit destination project name; overrides inference.
    pub project: Option<String>,
    /// Explicit destination group name; overrides inference.
    pub group: Option<String>,
    /// Overwrite a destination that already has content.
    pub overwrite: bool,
}

/// The resolved destination, after merging explicit overrides with
/// inference. Override always wins over inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationTarget {
    /// Destination project name. Always present; an unresolvable project
    /// name fails resolution instead.
    pub project: String,
    /// Destination group name, if any.
    pub group: Option<String>,
}

impl DestinationTarget {
    /// Human-readable "group/project" label. Uses only the resolved names;
    /// a missing group renders as the bare project.
    #[must_use]
    pub fn display(&self) -> String {
        match &self.group {
            Some(group) => format!("{group}/{}", self.project),
            None => self.project.clone(),
        }
    }
}

/// Per-request errors from the orchestrator.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The project name could not be resolved from explicit values or
    /// inference. The single user-facing fatal validation failure.
    #[error("project name could not be inferred from '{locator}', please pass one explicitly")]
    Configuration { locator: String },

    /// Clone, push, or an unrecoverable hosting-API failure.
    #[error("transfer failed for '{locator}': {message}")]
    Transfer { locator: String, message: String },
}

impl BackupError {
    fn transfer(locator: &str, err: impl std::fmt::Display) -> Self {
        Self::Transfer {
            locator: locator.to_string(),
            message: err.to_string(),
        }
    }
}

/// Terminal state of one successfully handled backup item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// Mirror completed.
    Done { destination: String },
    /// Destination already had content; item skipped with a warning.
    SkippedExisting { destination: String },
    /// Destination was active within the recency window; item skipped.
    SkippedFresh { destination: String },
}

/// Summary of a batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Items taken from the source enumeration.
    pub processed: usize,
    /// Items mirrored successfully.
    pub done: usize,
    /// Items skipped because the destination already had content.
    pub skipped_existing: usize,
    /// Items skipped because the destination was recently active.
    pub skipped_fresh: usize,
    /// Items that failed; the batch continued past each.
    pub failed: usize,
}

/// Options for a batch run over GitHub-starred repositories.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum number of starred repositories to enumerate.
    pub limit: usize,
    /// Destinations active within this window are skipped as fresh.
    pub recency_window: Duration,
    /// Overwrite destinations that already have content.
    pub overwrite: bool,
}

/// Drives single and batch backups against one GitLab instance.
pub struct Orchestrator {
    gitlab: GitLabClient,
    on_progress: Option<ProgressCallback>,
}

impl Orchestrator {
    /// Create an orchestrator around an explicitly constructed client.
    pub fn new(gitlab: GitLabClient) -> Self {
        Self {
            gitlab,
            on_progress: None,
        }
    }

    /// Register a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Resolve the destination for a request: run inference, then let
    /// explicit non-empty values win. Fails only when no project name
    /// survives the merge.
    pub fn resolve_target(&self, request: &BackupRequest) -> Result<DestinationTarget, BackupError> {
        let inferred = infer_identity(&request.source);

        let project = non_empty(request.project.as_deref())
            .map(str::to_owned)
            .or(inferred.project)
            .ok_or_else(|| BackupError::Configuration {
                locator: request.source.clone(),
            })?;

        let group = non_empty(request.group.as_deref())
            .map(str::to_owned)
            .or(inferred.group);

        Ok(DestinationTarget { project, group })
    }

    /// Look up or create the destination group and project.
    ///
    /// Lookup-before-create is best-effort idempotency, not a transaction:
    /// two concurrent runs can race, and the loser's duplicate-create error
    /// surfaces from the API.
    pub async fn ensure_destination(
        &self,
        target: &DestinationTarget,
    ) -> Result<Project, BackupError> {
        let source_label = target.display();

        let group = match &target.group {
            Some(name) => Some(match self.gitlab.find_group(name).await {
                Ok(Some(group)) => group,
                Ok(None) => self
                    .gitlab
                    .create_group(name)
                    .await
                    .map_err(|e| BackupError::transfer(&source_label, e))?,
                Err(e) => return Err(BackupError::transfer(&source_label, e)),
            }),
            None => None,
        };

        let existing = match &target.group {
            Some(name) => self.gitlab.get_project(Some(name), &target.project).await,
            None => self.gitlab.find_project(&target.project).await,
        }
        .map_err(|e| BackupError::transfer(&source_label, e))?;

        match existing {
            Some(project) => Ok(project),
            None => self
                .gitlab
                .create_project(&target.project, group.as_ref())
                .await
                .map_err(|e| BackupError::transfer(&source_label, e)),
        }
    }

    /// Whether the item should be skipped to avoid clobbering existing
    /// content. Bypassed entirely when overwrite is requested.
    pub async fn should_skip(
        &self,
        project: &Project,
        overwrite: bool,
    ) -> Result<bool, BackupError> {
        if overwrite {
            return Ok(false);
        }
        self.gitlab
            .project_has_commits(project)
            .await
            .map_err(|e| BackupError::transfer(&project.path_with_namespace, e))
    }

    /// Clone the source bare into a scoped temporary directory and
    /// mirror-push it to the destination. The directory is released on
    /// every exit path.
    pub async fn perform_mirror(
        &self,
        source: &str,
        target: &DestinationTarget,
    ) -> Result<(), BackupError> {
        let workdir = tempfile::tempdir().map_err(|e| BackupError::transfer(source, e))?;
        let clone_dir = workdir.path().join("repo.git");

        emit(
            self.on_progress.as_ref(),
            BackupProgress::Cloning {
                source: source.to_string(),
            },
        );
        let repo = git::clone_bare(source, &clone_dir)
            .await
            .map_err(|e| BackupError::transfer(source, e))?;

        let destination = self
            .gitlab
            .remote_url(&target.project, target.group.as_deref())
            .map_err(|e| BackupError::transfer(source, e))?;
        repo.add_remote(BACKUP_REMOTE, &destination)
            .await
            .map_err(|e| BackupError::transfer(source, e))?;

        emit(
            self.on_progress.as_ref(),
            BackupProgress::Pushing {
                destination: target.display(),
            },
        );
        repo.mirror_push(BACKUP_REMOTE)
            .await
            .map_err(|e| BackupError::transfer(source, e))?;

        Ok(())
    }

    /// Back up a single repository.
    pub async fn backup_one(&self, request: &BackupRequest) -> Result<BackupOutcome, BackupError> {
        self.backup_item(request, None).await
    }

    /// Back up each of the authenticated user's starred repositories that
    /// is not recently backed up. Per-item failures are logged and counted.
    pub async fn backup_starred(
        &self,
        github: &GitHubClient,
        options: &BatchOptions,
    ) -> Result<BatchReport, BackupError> {
        emit(
            self.on_progress.as_ref(),
            BackupProgress::FetchingSources {
                limit: options.limit,
            },
        );
        let starred = github
            .fetch_starred(options.limit)
            .await
            .map_err(|e: GitHubError| BackupError::transfer("github starred repositories", e))?;
        emit(
            self.on_progress.as_ref(),
            BackupProgress::SourcesFetched {
                total: starred.len(),
            },
        );

        let mut report = BatchReport::default();
        for repo in starred {
            report.processed += 1;

            let request = BackupRequest {
                source: repo.url.clone(),
                project: None,
                group: None,
                overwrite: options.overwrite,
            };

            match self.backup_item(&request, Some(options.recency_window)).await {
                Ok(BackupOutcome::Done { .. }) => report.done += 1,
                Ok(BackupOutcome::SkippedExisting { .. }) => report.skipped_existing += 1,
                Ok(BackupOutcome::SkippedFresh { .. }) => report.skipped_fresh += 1,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(source = %repo.url, error = %err, "Backup item failed");
                    emit(
                        self.on_progress.as_ref(),
                        BackupProgress::ItemFailed {
                            source: repo.url.clone(),
                            error: err.to_string(),
                        },
                    );
                }
            }
        }

        Ok(report)
    }

    async fn backup_item(
        &self,
        request: &BackupRequest,
        recency_window: Option<Duration>,
    ) -> Result<BackupOutcome, BackupError> {
        emit(
            self.on_progress.as_ref(),
            BackupProgress::Resolving {
                source: request.source.clone(),
            },
        );
        let target = self.resolve_target(request)?;
        let destination = target.display();

        // Batch mode only: a destination that was active within the window
        // is considered fresh and skipped before any creation happens.
        if let Some(window) = recency_window
            && let Some(project) = self
                .gitlab
                .get_project(target.group.as_deref(), &target.project)
                .await
                .map_err(|e| BackupError::transfer(&request.source, e))?
            && Utc::now() - project.last_activity_at < window
        {
            emit(
                self.on_progress.as_ref(),
                BackupProgress::SkippedFresh {
                    source: request.source.clone(),
                    destination: destination.clone(),
                    last_activity: project.last_activity_at,
                },
            );
            return Ok(BackupOutcome::SkippedFresh { destination });
        }

        let project = self.ensure_destination(&target).await?;
        emit(
            self.on_progress.as_ref(),
            BackupProgress::DestinationReady {
                destination: destination.clone(),
            },
        );

        if self.should_skip(&project, request.overwrite).await? {
            emit(
                self.on_progress.as_ref(),
                BackupProgress::SkippedExisting {
                    source: request.source.clone(),
                    destination: destination.clone(),
                },
            );
            return Ok(BackupOutcome::SkippedExisting { destination });
        }

        self.perform_mirror(&request.source, &target).await?;
        emit(
            self.on_progress.as_ref(),
            BackupProgress::Done {
                source: request.source.clone(),
                destination: destination.clone(),
            },
        );

        Ok(BackupOutcome::Done { destination })
    }
}

/// Explicit override values count only when non-empty after trimming.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::http::{HttpMethod, HttpResponse, MockTransport};

    const BASE: &str = "https://gitlab.example.com/api/v4";

    fn orchestrator(transport: &MockTransport) -> Orchestrator {
        Orchestrator::new(GitLabClient::with_transport(
            "https://gitlab.example.com",
            "backup-bot",
            "sekrit",
            Arc::new(transport.clone()),
        ))
    }

    fn project_json(id: u64, namespace: &str, name: &str, last_activity: &str) -> String {
        format!(
            r#"{{"id": {id}, "name": "{name}", "path": "{name}",
                 "path_with_namespace": "{namespace}/{name}",
                 "last_activity_at": "{last_activity}"}}"#
        )
    }

    #[test]
    fn explicit_values_override_inference() {
        let transport = MockTransport::new();
        let orch = orchestrator(&transport);

        let target = orch
            .resolve_target(&BackupRequest {
                source: "git@github.com:0xKD/elixir.git".into(),
                project: Some("renamed".into()),
                group: Some("archive".into()),
                overwrite: false,
            })
            .unwrap();
        assert_eq!(target.project, "renamed");
        assert_eq!(target.group.as_deref(), Some("archive"));
    }

    #[test]
    fn empty_overrides_fall_back_to_inference() {
        let transport = MockTransport::new();
        let orch = orchestrator(&transport);

        let target = orch
            .resolve_target(&BackupRequest {
                source: "git@github.com:0xKD/elixir.git".into(),
                project: Some("  ".into()),
                group: None,
                overwrite: false,
            })
            .unwrap();
        assert_eq!(target.project, "elixir");
        assert_eq!(target.group.as_deref(), Some("0xKD"));
    }

    #[test]
    fn unresolvable_project_is_a_configuration_error() {
        let transport = MockTransport::new();
        let orch = orchestrator(&transport);

        let err = orch
            .resolve_target(&BackupRequest {
                source: "~/".into(),
                ..BackupRequest::default()
            })
            .unwrap_err();
        assert!(matches!(err, BackupError::Configuration { .. }));
    }

    #[test]
    fn errors_name_the_locator_and_chain_no_cause() {
        let transport = MockTransport::new();
        let orch = orchestrator(&transport);

        let err = orch
            .resolve_target(&BackupRequest {
                source: "~/".into(),
                ..BackupRequest::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("~/"));
        assert!(std::error::Error::source(&err).is_none());

        let err = BackupError::transfer("https://host.xz/repo.git", "clone failed");
        assert_eq!(
            err.to_string(),
            "transfer failed for 'https://host.xz/repo.git': clone failed"
        );
        assert!(std::error::Error::source(&err).is_none());
    }

    #[tokio::test]
    async fn ensure_destination_creates_group_and_project_when_absent() {
        let transport = MockTransport::new();
        transport.push_json(HttpMethod::Get, format!("{BASE}/groups?search=team"), "[]");
        transport.push_json(
            HttpMethod::Post,
            format!("{BASE}/groups"),
            r#"{"id": 5, "name": "team", "path": "team", "full_path": "team"}"#,
        );
        transport.push_response(
            HttpMethod::Get,
            format!("{BASE}/projects/team%2Frepo"),
            HttpResponse {
                status: 404,
                headers: vec![],
                body: b"{}".to_vec(),
            },
        );
        transport.push_json(
            HttpMethod::Post,
            format!("{BASE}/projects"),
            &project_json(9, "team", "repo", "2024-05-01T00:00:00Z"),
        );

        let orch = orchestrator(&transport);
        let target = DestinationTarget {
            project: "repo".into(),
            group: Some("team".into()),
        };
        let project = orch.ensure_destination(&target).await.unwrap();
        assert_eq!(project.path_with_namespace, "team/repo");

        // The created group's id rode along on project creation.
        let create = transport
            .requests()
            .into_iter()
            .find(|r| r.method == HttpMethod::Post && r.url.ends_with("/projects"))
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&create.body).unwrap();
        assert_eq!(body["namespace_id"], 5);
    }

    #[tokio::test]
    async fn ensure_destination_reuses_existing_project() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/groups?search=team"),
            r#"[{"id": 5, "name": "team", "path": "team", "full_path": "team"}]"#,
        );
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/projects/team%2Frepo"),
            &project_json(9, "team", "repo", "2024-05-01T00:00:00Z"),
        );

        let orch = orchestrator(&transport);
        let target = DestinationTarget {
            project: "repo".into(),
            group: Some("team".into()),
        };
        let project = orch.ensure_destination(&target).await.unwrap();
        assert_eq!(project.id, 9);
        // No create calls went out.
        assert!(
            transport
                .requests()
                .iter()
                .all(|r| r.method == HttpMethod::Get)
        );
    }

    #[tokio::test]
    async fn populated_destination_is_skipped_without_force() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/groups?search=team"),
            r#"[{"id": 5, "name": "team", "path": "team", "full_path": "team"}]"#,
        );
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/projects/team%2Frepo"),
            &project_json(9, "team", "repo", "2024-05-01T00:00:00Z"),
        );
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/projects/9/repository/commits?per_page=1"),
            r#"[{"id": "abc123"}]"#,
        );

        let orch = orchestrator(&transport);
        let outcome = orch
            .backup_one(&BackupRequest {
                source: "git@github.com:team/repo.git".into(),
                ..BackupRequest::default()
            })
            .await
            .unwrap();
        assert_eq!(
            outcome,
            BackupOutcome::SkippedExisting {
                destination: "team/repo".into()
            }
        );
    }

    #[tokio::test]
    async fn overwrite_bypasses_the_content_probe() {
        let transport = MockTransport::new();
        let orch = orchestrator(&transport);

        let project = Project {
            id: 9,
            name: "repo".into(),
            path: "repo".into(),
            path_with_namespace: "team/repo".into(),
            last_activity_at: Utc::now(),
        };
        // No commit-probe response is registered: reaching the transport
        // would fail the test.
        assert!(!orch.should_skip(&project, true).await.unwrap());
    }

    #[tokio::test]
    async fn batch_skips_fresh_and_existing_destinations() {
        let transport = MockTransport::new();
        let github = GitHubClient::with_transport(
            "https://github.test/graphql",
            "gh-token",
            Arc::new(transport.clone()),
        );

        let fresh = Utc::now() - Duration::hours(2);
        let stale = Utc::now() - Duration::days(30);
        transport.push_json(
            HttpMethod::Post,
            "https://github.test/graphql",
            r#"{"data": {"viewer": {"starredRepositories": {
                "edges": [
                    {"node": {"url": "https://github.com/alpha/fresh-repo"},
                     "starredAt": "2024-04-01T12:00:00Z"},
                    {"node": {"url": "https://github.com/beta/stale-repo"},
                     "starredAt": "2024-03-01T12:00:00Z"}
                ],
                "pageInfo": {"hasNextPage": false, "endCursor": null}
            }}}}"#,
        );

        // Item 1: destination recently active, skipped as fresh.
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/projects/alpha%2Ffresh-repo"),
            &project_json(1, "alpha", "fresh-repo", &fresh.to_rfc3339()),
        );

        // Item 2: stale destination with existing commits, skipped as
        // populated. get_project is answered twice: recency probe, then
        // the ensure lookup.
        for _ in 0..2 {
            transport.push_json(
                HttpMethod::Get,
                format!("{BASE}/projects/beta%2Fstale-repo"),
                &project_json(2, "beta", "stale-repo", &stale.to_rfc3339()),
            );
        }
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/groups?search=beta"),
            r#"[{"id": 7, "name": "beta", "path": "beta", "full_path": "beta"}]"#,
        );
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/projects/2/repository/commits?per_page=1"),
            r#"[{"id": "abc123"}]"#,
        );

        let orch = orchestrator(&transport);
        let report = orch
            .backup_starred(
                &github,
                &BatchOptions {
                    limit: 100,
                    recency_window: Duration::days(7),
                    overwrite: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(
            report,
            BatchReport {
                processed: 2,
                done: 0,
                skipped_existing: 1,
                skipped_fresh: 1,
                failed: 0,
            }
        );
    }

    #[tokio::test]
    async fn batch_continues_past_failing_items() {
        let transport = MockTransport::new();
        let github = GitHubClient::with_transport(
            "https://github.test/graphql",
            "gh-token",
            Arc::new(transport.clone()),
        );

        transport.push_json(
            HttpMethod::Post,
            "https://github.test/graphql",
            r#"{"data": {"viewer": {"starredRepositories": {
                "edges": [
                    {"node": {"url": "https://host.xz/"},
                     "starredAt": "2024-04-01T12:00:00Z"},
                    {"node": {"url": "https://github.com/alpha/fresh-repo"},
                     "starredAt": "2024-03-01T12:00:00Z"}
                ],
                "pageInfo": {"hasNextPage": false, "endCursor": null}
            }}}}"#,
        );

        let fresh = Utc::now() - Duration::hours(2);
        transport.push_json(
            HttpMethod::Get,
            format!("{BASE}/projects/alpha%2Ffresh-repo"),
            &project_json(1, "alpha", "fresh-repo", &fresh.to_rfc3339()),
        );

        let orch = orchestrator(&transport);
        let report = orch
            .backup_starred(
                &github,
                &BatchOptions {
                    limit: 100,
                    recency_window: Duration::days(7),
                    overwrite: false,
                },
            )
            .await
            .unwrap();

        // The first item has no inferable project name and fails; the
        // second is still processed.
        assert_eq!(report.processed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped_fresh, 1);
    }
}
