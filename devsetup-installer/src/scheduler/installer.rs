//! Batch orchestrator
//!
//! Creates one pending job per install request, then runs the jobs strictly
//! one after another on a background task. Each job moves through
//! `pending -> running -> completed | failed`, or straight from `pending` to
//! `cancelled` once its batch has been cancelled.
//!
//! Cancellation is cooperative. It is checked between jobs only, so a script
//! that is already running always runs to completion.

use chrono::Utc;
use devsetup_core::domain::job::{Job, JobDetails, JobStatus};
use devsetup_core::domain::progress::ProgressEvent;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::InstallError;
use crate::progress::{BatchProgress, BatchReporter, ProgressHub};
use crate::repository::{JobStore, JobUpdate, ToolCatalog};
use crate::request::InstallRequest;
use crate::scheduler::registry::{BatchRegistry, CancelFlag};
use crate::service::ScriptExecutor;

const BATCH_COMPLETE_MESSAGE: &str = "Installation process completed";

/// A started batch
pub struct BatchHandle {
    /// Batch id, equal to the id of the first job
    pub id: Uuid,
    /// Job ids in submission order
    pub job_ids: Vec<Uuid>,
    /// Events of this batch; ends after the final `complete` event
    pub progress: BatchProgress,
}

/// Installation orchestrator
///
/// Cheap to share behind an `Arc`. Independent instances keep independent
/// registries, so several can coexist in one process.
pub struct Installer {
    store: Arc<dyn JobStore>,
    catalog: Arc<dyn ToolCatalog>,
    executor: Arc<dyn ScriptExecutor>,
    registry: Arc<BatchRegistry>,
    hub: ProgressHub,
}

impl Installer {
    /// Creates a new installer
    ///
    /// # Arguments
    /// * `store` - Durable job records
    /// * `catalog` - Tool metadata; tools are flagged installed here
    /// * `executor` - Runs one install script
    pub fn new(
        store: Arc<dyn JobStore>,
        catalog: Arc<dyn ToolCatalog>,
        executor: Arc<dyn ScriptExecutor>,
    ) -> Self {
        Self {
            store,
            catalog,
            executor,
            registry: Arc::new(BatchRegistry::new()),
            hub: ProgressHub::default(),
        }
    }

    /// Replaces the progress hub, e.g. to change its capacity
    pub fn with_hub(mut self, hub: ProgressHub) -> Self {
        self.hub = hub;
        self
    }

    /// Starts a batch and returns without waiting for any script
    ///
    /// All jobs are created `pending` in submission order before the batch is
    /// registered. If creating one of them fails, the jobs created so far are
    /// cancelled and the error is returned.
    pub async fn start_batch(
        &self,
        requests: Vec<InstallRequest>,
    ) -> Result<BatchHandle, InstallError> {
        if requests.is_empty() {
            return Err(InstallError::InvalidArgument(
                "no tools to install".to_string(),
            ));
        }

        for request in &requests {
            request.validate()?;
        }

        let mut job_ids = Vec::with_capacity(requests.len());
        for request in &requests {
            match self.store.create_job(request.tool_id, JobStatus::Pending).await {
                Ok(id) => job_ids.push(id),
                Err(e) => {
                    error!(
                        "Failed to create job for tool {}: {}",
                        request.tool_name, e
                    );
                    self.discard_jobs(&job_ids).await;
                    return Err(e.into());
                }
            }
        }

        let batch_id = job_ids[0];
        let cancel = self.registry.register(batch_id, job_ids.clone());
        let (reporter, progress) = BatchReporter::new(batch_id, requests.len(), self.hub.clone());

        info!("Batch {} started with {} job(s)", batch_id, requests.len());

        let run = BatchRun {
            batch_id,
            jobs: job_ids.iter().copied().zip(requests).collect(),
            cancel,
            reporter,
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
            executor: Arc::clone(&self.executor),
            registry: Arc::clone(&self.registry),
        };
        tokio::spawn(run.run());

        Ok(BatchHandle {
            id: batch_id,
            job_ids,
            progress,
        })
    }

    /// Requests cancellation of an active batch
    ///
    /// Returns false when the batch is unknown or already finished. The
    /// request takes effect at the next job boundary.
    pub fn cancel_batch(&self, batch_id: Uuid) -> bool {
        let accepted = self.registry.cancel(batch_id);
        if accepted {
            info!("Cancellation requested for batch {}", batch_id);
        } else {
            debug!("Cancellation ignored, batch {} is not active", batch_id);
        }
        accepted
    }

    /// Reads a job joined with its tool, for active and historical jobs alike
    pub async fn get_job_status(&self, job_id: Uuid) -> Result<JobDetails, InstallError> {
        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or_else(|| InstallError::NotFound(format!("job {}", job_id)))?;
        let tool = self.catalog.get_tool(job.tool_id).await?;

        Ok(JobDetails { job, tool })
    }

    /// Lists the jobs still pending or running across all batches
    pub async fn list_active_jobs(&self) -> Result<Vec<Job>, InstallError> {
        Ok(self.store.list_active_jobs().await?)
    }

    /// Subscribes to the progress events of every batch
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.hub.subscribe()
    }

    /// Job ids of an active batch in submission order, `None` once it finished
    pub fn batch_jobs(&self, batch_id: Uuid) -> Option<Vec<Uuid>> {
        self.registry.job_ids(batch_id)
    }

    pub fn is_batch_active(&self, batch_id: Uuid) -> bool {
        self.registry.contains(batch_id)
    }

    pub fn registry(&self) -> &BatchRegistry {
        &self.registry
    }

    async fn discard_jobs(&self, job_ids: &[Uuid]) {
        for id in job_ids {
            if let Err(e) = self.store.update_job(*id, JobUpdate::cancelled()).await {
                warn!("Failed to cancel orphaned job {}: {}", id, e);
            }
        }
    }
}

/// State owned by the task running one batch
struct BatchRun {
    batch_id: Uuid,
    jobs: Vec<(Uuid, InstallRequest)>,
    cancel: CancelFlag,
    reporter: BatchReporter,
    store: Arc<dyn JobStore>,
    catalog: Arc<dyn ToolCatalog>,
    executor: Arc<dyn ScriptExecutor>,
    registry: Arc<BatchRegistry>,
}

impl BatchRun {
    async fn run(mut self) {
        let jobs = std::mem::take(&mut self.jobs);

        for (job_id, request) in &jobs {
            if self.cancel.is_cancelled() {
                self.skip_job(*job_id, request).await;
            } else {
                self.run_job(*job_id, request).await;
            }
        }

        self.registry.remove(self.batch_id);
        info!("Batch {} finished", self.batch_id);

        self.reporter.complete(BATCH_COMPLETE_MESSAGE);
    }

    async fn run_job(&mut self, job_id: Uuid, request: &InstallRequest) {
        if let Err(e) = self.store.update_job(job_id, JobUpdate::running()).await {
            error!("Failed to start job {}: {}", job_id, e);
            let message = format!("could not start job: {}", e);

            // pending -> failed is not a legal transition
            if let Err(e) = self
                .store
                .update_job(job_id, JobUpdate::not_started(message.clone()))
                .await
            {
                error!("Failed to close unstarted job {}: {}", job_id, e);
            }

            self.reporter.job_finished();
            self.reporter.failed(
                &request.tool_name,
                format!("Failed to install {}: {}", request.display_name, message),
                message,
            );
            return;
        }

        info!(
            "Job {} installing {} ({})",
            job_id,
            request.tool_name,
            request.script_path.display()
        );
        self.reporter.running(
            &request.tool_name,
            format!("Installing {}...", request.display_name),
        );

        let sink = self.reporter.line_sink(&request.tool_name);
        let result = match self.executor.run(&request.script_path, sink).await {
            Ok(outcome) => match outcome.failure() {
                None => Ok(outcome.output),
                Some(failure) => Err((Some(outcome.output), failure)),
            },
            Err(e) => Err((None, e)),
        };

        match result {
            Ok(log) => self.succeed(job_id, request, log).await,
            Err((log, failure)) => self.fail(job_id, request, log, failure.to_string()).await,
        }
    }

    async fn succeed(&mut self, job_id: Uuid, request: &InstallRequest, log: String) {
        if let Err(e) = self
            .store
            .update_job(job_id, JobUpdate::completed(log.clone()))
            .await
        {
            error!("Failed to record completion of job {}: {}", job_id, e);
            let message = format!("could not record completion: {}", e);
            self.fail(job_id, request, Some(log), message).await;
            return;
        }

        // only a completed job flags its tool
        if let Err(e) = self.catalog.mark_installed(request.tool_id, Utc::now()).await {
            warn!(
                "Failed to mark tool {} as installed: {}",
                request.tool_name, e
            );
        }

        info!("Job {} completed", job_id);
        self.reporter.job_finished();
        self.reporter.completed(
            &request.tool_name,
            format!("Successfully installed {}", request.display_name),
        );
    }

    async fn fail(
        &mut self,
        job_id: Uuid,
        request: &InstallRequest,
        log: Option<String>,
        message: String,
    ) {
        warn!("Job {} failed: {}", job_id, message);

        if let Err(e) = self
            .store
            .update_job(job_id, JobUpdate::failed(log, message.clone()))
            .await
        {
            error!("Failed to record failure of job {}: {}", job_id, e);
        }

        self.reporter.job_finished();
        self.reporter.failed(
            &request.tool_name,
            format!("Failed to install {}: {}", request.display_name, message),
            message,
        );
    }

    /// Moves a job that never started straight to `cancelled`
    async fn skip_job(&mut self, job_id: Uuid, request: &InstallRequest) {
        debug!("Job {} cancelled before start", job_id);

        if let Err(e) = self.store.update_job(job_id, JobUpdate::cancelled()).await {
            error!("Failed to record cancellation of job {}: {}", job_id, e);
        }

        self.reporter.job_finished();
        self.reporter.cancelled(
            &request.tool_name,
            format!("Cancelled installation of {}", request.display_name),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SpawnError, StoreError};
    use crate::repository::{MemoryStore, StoreResult};
    use crate::service::{LineSink, ScriptOutcome};
    use async_trait::async_trait;
    use devsetup_core::domain::progress::ProgressStatus;
    use devsetup_core::domain::tool::Tool;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Clone)]
    enum Behavior {
        Exit(i32),
        CannotSpawn,
        Gated {
            started: Arc<Notify>,
            release: Arc<Notify>,
            code: i32,
        },
    }

    /// Executor keyed by script file stem
    #[derive(Default)]
    struct FakeExecutor {
        behaviors: Mutex<HashMap<String, Behavior>>,
        calls: Mutex<Vec<String>>,
        running: AtomicUsize,
        max_running: AtomicUsize,
    }

    impl FakeExecutor {
        fn on(self, script: &str, behavior: Behavior) -> Self {
            self.behaviors
                .lock()
                .unwrap()
                .insert(script.to_string(), behavior);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn outcome(code: i32) -> ScriptOutcome {
        ScriptOutcome {
            exit_code: Some(code),
            output: "installing\n".to_string(),
            stderr: if code == 0 {
                String::new()
            } else {
                "boom\n".to_string()
            },
            timed_out: None,
        }
    }

    #[async_trait]
    impl ScriptExecutor for FakeExecutor {
        async fn run(&self, script: &Path, on_line: LineSink) -> Result<ScriptOutcome, InstallError> {
            let name = script
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.calls.lock().unwrap().push(name.clone());

            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);

            let behavior = self
                .behaviors
                .lock()
                .unwrap()
                .get(&name)
                .cloned()
                .unwrap_or(Behavior::Exit(0));

            let result: Result<ScriptOutcome, InstallError> = match behavior {
                Behavior::Exit(code) => {
                    on_line("installing");
                    tokio::task::yield_now().await;
                    Ok(outcome(code))
                }
                Behavior::CannotSpawn => Err(SpawnError::ScriptNotFound(script.to_path_buf()).into()),
                Behavior::Gated {
                    started,
                    release,
                    code,
                } => {
                    started.notify_one();
                    release.notified().await;
                    Ok(outcome(code))
                }
            };

            self.running.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn tool(id: i64, name: &str) -> Tool {
        Tool {
            id,
            name: name.to_string(),
            display_name: name.to_uppercase(),
            category: "Development Tools".to_string(),
            description: None,
            script_path: format!("{}.sh", name),
            icon: None,
            installed: false,
            install_date: None,
        }
    }

    fn request(id: i64, name: &str) -> InstallRequest {
        InstallRequest::for_tool(&tool(id, name), Path::new("/scripts"))
    }

    fn setup(executor: FakeExecutor) -> (Installer, Arc<MemoryStore>, Arc<FakeExecutor>) {
        let store = Arc::new(MemoryStore::with_tools([
            tool(1, "a"),
            tool(2, "b"),
            tool(3, "c"),
        ]));
        let executor = Arc::new(executor);
        let installer = Installer::new(store.clone(), store.clone(), executor.clone());
        (installer, store, executor)
    }

    fn statuses(store: &MemoryStore, ids: &[Uuid]) -> Vec<JobStatus> {
        let jobs = store.jobs();
        ids.iter()
            .map(|id| jobs.iter().find(|job| job.id == *id).unwrap().status)
            .collect()
    }

    fn gate() -> (Arc<Notify>, Arc<Notify>) {
        (Arc::new(Notify::new()), Arc::new(Notify::new()))
    }

    #[tokio::test]
    async fn test_mixed_outcomes() {
        let (installer, store, executor) = setup(FakeExecutor::default().on("b", Behavior::Exit(1)));

        let handle = installer
            .start_batch(vec![request(1, "a"), request(2, "b"), request(3, "c")])
            .await
            .unwrap();
        let batch_id = handle.id;
        let job_ids = handle.job_ids.clone();
        let events = handle.progress.collect().await;

        assert_eq!(
            statuses(&store, &job_ids),
            vec![JobStatus::Completed, JobStatus::Failed, JobStatus::Completed]
        );
        assert_eq!(executor.calls(), vec!["a", "b", "c"]);
        assert!(!installer.is_batch_active(batch_id));

        let failed = store.get_job(job_ids[1]).await.unwrap().unwrap();
        let message = failed.error_message.unwrap();
        assert!(message.contains("code 1"));
        assert!(message.contains("boom"));
        assert!(failed.completed_at.is_some());

        assert!(store.get_tool(1).await.unwrap().unwrap().installed);
        assert!(!store.get_tool(2).await.unwrap().unwrap().installed);
        assert!(store.get_tool(3).await.unwrap().unwrap().installed);

        let transitions: Vec<(Option<String>, ProgressStatus, u8)> = events
            .iter()
            .filter(|event| event.log_line.is_none())
            .map(|event| (event.tool_name.clone(), event.status, event.percent))
            .collect();
        let a = Some("a".to_string());
        let b = Some("b".to_string());
        let c = Some("c".to_string());
        assert_eq!(
            transitions,
            vec![
                (a.clone(), ProgressStatus::Running, 0),
                (a, ProgressStatus::Completed, 33),
                (b.clone(), ProgressStatus::Running, 33),
                (b, ProgressStatus::Failed, 66),
                (c.clone(), ProgressStatus::Running, 66),
                (c, ProgressStatus::Completed, 100),
                (None, ProgressStatus::Complete, 100),
            ]
        );

        let failed_event = events
            .iter()
            .find(|event| event.status == ProgressStatus::Failed)
            .unwrap();
        assert!(failed_event.error.as_deref().unwrap().contains("boom"));
        assert_eq!(failed_event.message.split(':').next(), Some("Failed to install B"));

        assert_eq!(events.iter().filter(|e| e.log_line.is_some()).count(), 3);
    }

    #[tokio::test]
    async fn test_transitions_follow_state_machine() {
        let (installer, store, _) = setup(FakeExecutor::default().on("b", Behavior::Exit(2)));

        let handle = installer
            .start_batch(vec![request(1, "a"), request(2, "b")])
            .await
            .unwrap();
        let job_ids = handle.job_ids.clone();
        handle.progress.collect().await;

        assert_eq!(
            store.transitions(job_ids[0]),
            vec![JobStatus::Pending, JobStatus::Running, JobStatus::Completed]
        );
        assert_eq!(
            store.transitions(job_ids[1]),
            vec![JobStatus::Pending, JobStatus::Running, JobStatus::Failed]
        );
    }

    #[tokio::test]
    async fn test_cancel_while_first_job_runs() {
        let (started, release) = gate();
        let executor = FakeExecutor::default().on(
            "a",
            Behavior::Gated {
                started: started.clone(),
                release: release.clone(),
                code: 0,
            },
        );
        let (installer, store, executor) = setup(executor);

        let handle = installer
            .start_batch(vec![request(1, "a"), request(2, "b"), request(3, "c")])
            .await
            .unwrap();

        started.notified().await;
        assert_eq!(installer.batch_jobs(handle.id), Some(handle.job_ids.clone()));
        assert!(installer.cancel_batch(handle.id));
        release.notify_one();

        let job_ids = handle.job_ids.clone();
        let events = handle.progress.collect().await;

        assert_eq!(
            statuses(&store, &job_ids),
            vec![JobStatus::Completed, JobStatus::Cancelled, JobStatus::Cancelled]
        );
        assert_eq!(executor.calls(), vec!["a"]);
        assert_eq!(
            store.transitions(job_ids[1]),
            vec![JobStatus::Pending, JobStatus::Cancelled]
        );

        let cancelled = store.get_job(job_ids[2]).await.unwrap().unwrap();
        assert!(cancelled.started_at.is_none());
        assert!(cancelled.error_message.is_none());
        assert!(cancelled.log.is_none());

        let cancelled_events = events
            .iter()
            .filter(|event| event.status == ProgressStatus::Cancelled)
            .count();
        assert_eq!(cancelled_events, 2);
        assert!(events.last().unwrap().is_batch_end());
        assert!(!installer.is_batch_active(handle.id));
        assert!(installer.batch_jobs(handle.id).is_none());
    }

    #[tokio::test]
    async fn test_cancel_unknown_batch() {
        let (installer, store, _) = setup(FakeExecutor::default());

        assert!(!installer.cancel_batch(Uuid::new_v4()));
        assert!(store.jobs().is_empty());
        assert!(installer.registry().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_finished_batch() {
        let (installer, store, _) = setup(FakeExecutor::default());

        let handle = installer.start_batch(vec![request(1, "a")]).await.unwrap();
        let batch_id = handle.id;
        handle.progress.collect().await;

        assert!(!installer.cancel_batch(batch_id));
        assert_eq!(statuses(&store, &[batch_id]), vec![JobStatus::Completed]);
    }

    #[tokio::test]
    async fn test_empty_request_list() {
        let (installer, store, _) = setup(FakeExecutor::default());

        let result = installer.start_batch(Vec::new()).await;

        assert!(matches!(result, Err(InstallError::InvalidArgument(_))));
        assert!(store.jobs().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_request_creates_no_jobs() {
        let (installer, store, executor) = setup(FakeExecutor::default());
        let unnamed = InstallRequest::new(2, "", "B", "/scripts/b.sh");

        let result = installer.start_batch(vec![request(1, "a"), unnamed]).await;

        assert!(matches!(result, Err(InstallError::InvalidArgument(_))));
        assert!(store.jobs().is_empty());
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_start_creates_pending_jobs_in_order() {
        let (started, release) = gate();
        let executor = FakeExecutor::default().on(
            "a",
            Behavior::Gated {
                started: started.clone(),
                release: release.clone(),
                code: 0,
            },
        );
        let (installer, store, _) = setup(executor);

        let handle = installer
            .start_batch(vec![request(3, "c"), request(1, "a"), request(2, "b")])
            .await
            .unwrap();

        let jobs = store.jobs();
        assert_eq!(jobs.len(), 3);
        assert_eq!(
            jobs.iter().map(|job| job.tool_id).collect::<Vec<_>>(),
            vec![3, 1, 2]
        );
        assert_eq!(
            jobs.iter().map(|job| job.id).collect::<Vec<_>>(),
            handle.job_ids
        );
        assert_eq!(handle.id, handle.job_ids[0]);
        for id in &handle.job_ids {
            assert_eq!(store.transitions(*id)[0], JobStatus::Pending);
        }

        started.notified().await;
        release.notify_one();
        handle.progress.collect().await;
    }

    #[tokio::test]
    async fn test_jobs_run_sequentially() {
        let (installer, store, executor) = setup(FakeExecutor::default());

        let handle = installer
            .start_batch(vec![request(1, "a"), request(2, "b"), request(3, "c")])
            .await
            .unwrap();
        let job_ids = handle.job_ids.clone();
        handle.progress.collect().await;

        assert_eq!(executor.max_running.load(Ordering::SeqCst), 1);
        let jobs: Vec<Job> = store.jobs();
        for pair in job_ids.windows(2) {
            let first = jobs.iter().find(|job| job.id == pair[0]).unwrap();
            let second = jobs.iter().find(|job| job.id == pair[1]).unwrap();
            assert!(first.completed_at.unwrap() <= second.started_at.unwrap());
        }
    }

    #[tokio::test]
    async fn test_batches_run_independently() {
        let (started, release) = gate();
        let executor = FakeExecutor::default().on(
            "a",
            Behavior::Gated {
                started: started.clone(),
                release: release.clone(),
                code: 0,
            },
        );
        let (installer, store, _) = setup(executor);

        let blocked = installer.start_batch(vec![request(1, "a")]).await.unwrap();
        started.notified().await;

        let other = installer.start_batch(vec![request(2, "b")]).await.unwrap();
        let other_id = other.id;
        other.progress.collect().await;

        assert_eq!(statuses(&store, &[other_id]), vec![JobStatus::Completed]);
        assert!(installer.is_batch_active(blocked.id));

        release.notify_one();
        blocked.progress.collect().await;
        assert!(installer.registry().is_empty());
    }

    #[tokio::test]
    async fn test_spawn_error_fails_job_and_batch_continues() {
        let (installer, store, _) = setup(FakeExecutor::default().on("a", Behavior::CannotSpawn));

        let handle = installer
            .start_batch(vec![request(1, "a"), request(2, "b")])
            .await
            .unwrap();
        let job_ids = handle.job_ids.clone();
        handle.progress.collect().await;

        assert_eq!(
            statuses(&store, &job_ids),
            vec![JobStatus::Failed, JobStatus::Completed]
        );
        let failed = store.get_job(job_ids[0]).await.unwrap().unwrap();
        assert!(failed.error_message.unwrap().contains("not found"));
        assert!(failed.log.is_none());
    }

    #[tokio::test]
    async fn test_catalog_failure_does_not_fail_job() {
        let (installer, store, _) = setup(FakeExecutor::default());

        let handle = installer
            .start_batch(vec![request(42, "unlisted")])
            .await
            .unwrap();
        let batch_id = handle.id;
        handle.progress.collect().await;

        assert_eq!(statuses(&store, &[batch_id]), vec![JobStatus::Completed]);
    }

    #[tokio::test]
    async fn test_list_active_jobs() {
        let (started, release) = gate();
        let executor = FakeExecutor::default().on(
            "a",
            Behavior::Gated {
                started: started.clone(),
                release: release.clone(),
                code: 0,
            },
        );
        let (installer, _, _) = setup(executor);

        let handle = installer
            .start_batch(vec![request(1, "a"), request(2, "b")])
            .await
            .unwrap();
        started.notified().await;

        let active = installer.list_active_jobs().await.unwrap();
        let view: Vec<(Uuid, JobStatus)> = active.iter().map(|job| (job.id, job.status)).collect();
        assert_eq!(
            view,
            vec![
                (handle.job_ids[0], JobStatus::Running),
                (handle.job_ids[1], JobStatus::Pending),
            ]
        );

        release.notify_one();
        handle.progress.collect().await;
        assert!(installer.list_active_jobs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_job_status() {
        let (installer, _, _) = setup(FakeExecutor::default());

        let handle = installer.start_batch(vec![request(2, "b")]).await.unwrap();
        let job_id = handle.id;
        handle.progress.collect().await;

        let details = installer.get_job_status(job_id).await.unwrap();
        assert_eq!(details.job.status, JobStatus::Completed);
        assert_eq!(details.job.log.as_deref(), Some("installing\n"));
        let tool = details.tool.unwrap();
        assert_eq!(tool.name, "b");
        assert!(tool.installed);
    }

    #[tokio::test]
    async fn test_get_unknown_job_status() {
        let (installer, _, _) = setup(FakeExecutor::default());

        let result = installer.get_job_status(Uuid::new_v4()).await;
        assert!(matches!(result, Err(InstallError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_subscribers_see_every_batch() {
        let (installer, _, _) = setup(FakeExecutor::default());
        let mut events = installer.subscribe();

        let handle = installer.start_batch(vec![request(1, "a")]).await.unwrap();
        let batch_id = handle.id;
        handle.progress.collect().await;

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert!(seen.iter().all(|event| event.batch_id == batch_id));
        assert!(seen.last().unwrap().is_batch_end());
    }

    /// Job store that rejects writes of selected statuses
    struct FlakyStore {
        inner: Arc<MemoryStore>,
        rejected: Vec<JobStatus>,
    }

    #[async_trait]
    impl JobStore for FlakyStore {
        async fn create_job(&self, tool_id: i64, status: JobStatus) -> StoreResult<Uuid> {
            self.inner.create_job(tool_id, status).await
        }

        async fn update_job(&self, id: Uuid, update: JobUpdate) -> StoreResult<()> {
            if self.rejected.contains(&update.status) {
                return Err(StoreError::Backend("connection reset".to_string()));
            }
            self.inner.update_job(id, update).await
        }

        async fn get_job(&self, id: Uuid) -> StoreResult<Option<Job>> {
            self.inner.get_job(id).await
        }

        async fn list_active_jobs(&self) -> StoreResult<Vec<Job>> {
            self.inner.list_active_jobs().await
        }
    }

    fn setup_flaky(rejected: Vec<JobStatus>) -> (Installer, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_tools([tool(1, "a"), tool(2, "b")]));
        let flaky = Arc::new(FlakyStore {
            inner: store.clone(),
            rejected,
        });
        let installer = Installer::new(flaky, store.clone(), Arc::new(FakeExecutor::default()));
        (installer, store)
    }

    #[tokio::test]
    async fn test_unrecorded_completion_fails_job() {
        let (installer, store) = setup_flaky(vec![JobStatus::Completed]);

        let handle = installer
            .start_batch(vec![request(1, "a"), request(2, "b")])
            .await
            .unwrap();
        let job_ids = handle.job_ids.clone();
        let events = handle.progress.collect().await;

        assert_eq!(
            statuses(&store, &job_ids),
            vec![JobStatus::Failed, JobStatus::Failed]
        );
        assert!(installer.list_active_jobs().await.unwrap().is_empty());
        assert!(!store.get_tool(1).await.unwrap().unwrap().installed);
        assert!(!store.get_tool(2).await.unwrap().unwrap().installed);

        let job = store.get_job(job_ids[0]).await.unwrap().unwrap();
        assert_eq!(job.log.as_deref(), Some("installing\n"));
        assert!(job.error_message.unwrap().contains("connection reset"));

        let kinds: Vec<ProgressStatus> = events
            .iter()
            .filter(|event| event.log_line.is_none())
            .map(|event| event.status)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ProgressStatus::Running,
                ProgressStatus::Failed,
                ProgressStatus::Running,
                ProgressStatus::Failed,
                ProgressStatus::Complete,
            ]
        );
        assert!(!installer.is_batch_active(handle.id));
    }

    #[tokio::test]
    async fn test_unstartable_job_is_closed() {
        let (installer, store) = setup_flaky(vec![JobStatus::Running]);

        let handle = installer
            .start_batch(vec![request(1, "a"), request(2, "b")])
            .await
            .unwrap();
        let job_ids = handle.job_ids.clone();
        let events = handle.progress.collect().await;

        assert_eq!(
            statuses(&store, &job_ids),
            vec![JobStatus::Cancelled, JobStatus::Cancelled]
        );
        assert!(installer.list_active_jobs().await.unwrap().is_empty());

        let job = store.get_job(job_ids[1]).await.unwrap().unwrap();
        assert!(job.started_at.is_none());
        assert!(job.error_message.unwrap().contains("could not start job"));

        let failed = events
            .iter()
            .filter(|event| event.status == ProgressStatus::Failed)
            .count();
        assert_eq!(failed, 2);
        assert!(events.last().unwrap().is_batch_end());
    }
}
