use super::task_manager::TaskManager;
use anyhow::Result;
use async_trait::async_trait;

/// Persistent execution unit
///
/// Jobs are restarted by the [`JobScheduler`](super::JobScheduler) whenever they exit with an
/// error. Lost connections to external systems are surfaced as job failures, so the scheduler's
/// restart loop doubles as the reconnect loop.
///
/// In addition, jobs can support graceful shutdown and a ready state provided by the
/// [`TaskManager`] passed to the execute function.
#[async_trait]
pub trait Job {
    /// Name of the job displayed in log messages
    fn name(&self) -> String;

    /// Whether or not the job honors the termination signal. When this returns false the job
    /// will be terminated externally.
    fn supports_graceful_termination(&self) -> bool {
        false
    }

    /// Core routine of the job, restarted on error
    async fn execute(&self, manager: TaskManager) -> Result<()>;
}
