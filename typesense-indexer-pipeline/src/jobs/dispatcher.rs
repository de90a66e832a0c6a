use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{error, info, Instrument};

use super::{IndexJob, JobDispatcher, JobId, JobOutcome, JobRunner};
use crate::errors::DispatchError;

/// Runs submitted jobs as tasks on a tokio runtime.
///
/// Jobs of the same dispatcher run concurrently with each other and with
/// any search or sync traffic; nothing is coordinated between them.
pub struct TokioJobDispatcher {
    runner: Arc<JobRunner>,
    handle: Handle,
    tasks: Mutex<JoinSet<()>>,
}

impl TokioJobDispatcher {
    /// Create a dispatcher on the current runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(TokioJobDispatcher)` - A dispatcher bound to the current runtime
    /// * `Err(DispatchError::Unavailable)` - Called outside a tokio runtime
    pub fn new(runner: Arc<JobRunner>) -> Result<Self, DispatchError> {
        let handle = Handle::try_current().map_err(|e| DispatchError::Unavailable(e.to_string()))?;
        Ok(Self::with_handle(runner, handle))
    }

    /// Create a dispatcher spawning onto the given runtime.
    pub fn with_handle(runner: Arc<JobRunner>, handle: Handle) -> Self {
        Self {
            runner,
            handle,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Wait until every job submitted so far has finished.
    pub async fn wait_idle(&self) {
        let mut tasks = {
            let mut guard = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *guard)
        };
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Job task failed");
            }
        }
    }
}

impl JobDispatcher for TokioJobDispatcher {
    fn submit(&self, job: IndexJob) -> Result<JobId, DispatchError> {
        job.validate()?;

        let id = JobId::new();
        let runner = self.runner.clone();
        let span = tracing::info_span!("job", job_id = %id, job = job.kind());

        let task = async move {
            match runner.run(&job).await {
                Ok(JobOutcome::Recreated(report)) => info!(
                    count = report.succeeded,
                    elapsed_secs = report.elapsed.as_secs(),
                    "Job finished"
                ),
                Ok(outcome) => info!(outcome = ?outcome, "Job finished"),
                Err(e) => error!(error = %e, "Job failed"),
            }
        }
        .instrument(span);

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        // Reap finished jobs so the set does not grow without bound.
        while tasks.try_join_next().is_some() {}
        tasks.spawn_on(task, &self.handle);

        info!(job_id = %id, running = tasks.len(), "Job submitted");
        Ok(id)
    }
}
