use super::job::Job;
use super::task_manager::TaskManager;
use futures::{
    channel::oneshot::Receiver as OneShotReceiver,
    future::{abortable, AbortHandle, Aborted},
    prelude::*,
};
use futures::lock::Mutex;
use log::{debug, error, info, warn};
use std::{collections::HashMap, fmt, sync::Arc, time::Duration};
use tokio::{sync::watch::Sender as WatchSender, task, task::JoinHandle, time::sleep};

/// State in which a job currently resides
#[derive(Debug)]
pub enum JobStatus {
    /// Job has started and is ready to fulfill contracts. Contains graceful termination handle if supported.
    Ready(Option<WatchSender<bool>>),
    /// Job has never started and is in the process of getting ready
    Startup,
    /// Job has exited with an error and is restarted after the scheduler interval
    Restarting,
    /// Job was forcefully terminated
    Terminated,
    /// Job has exited cleanly
    Finished,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            JobStatus::Ready(_) => write!(f, "Ready"),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl JobStatus {
    fn is_gracefully_terminatable(&self) -> bool {
        matches!(*self, JobStatus::Ready(Some(_)))
    }
}

/// Job lifecycle handler
///
/// Restarts crashed jobs at a fixed interval, indefinitely. Since lost bus and datastore
/// connections surface as job errors, this restart loop is the reconnect loop of the process.
pub struct JobScheduler {
    pub(crate) status: Arc<Mutex<HashMap<String, JobStatus>>>,
    termination_handles: Arc<Mutex<HashMap<String, AbortHandle>>>,
    restart_interval: Duration,
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

impl JobScheduler {
    /// Creates a new instance restarting crashed jobs after the given interval
    pub fn new(restart_interval: Duration) -> Self {
        Self {
            status: Default::default(),
            termination_handles: Default::default(),
            restart_interval,
        }
    }

    fn add_status_watcher(
        readiness_rx: OneShotReceiver<()>,
        termination_tx: Option<WatchSender<bool>>,
        status_map: Arc<Mutex<HashMap<String, JobStatus>>>,
        job_name: String,
    ) -> AbortableJoinHandle<()> {
        spawn_abortable(async move {
            if readiness_rx.await.is_ok() {
                JobScheduler::change_status(
                    &status_map,
                    &job_name,
                    JobStatus::Ready(termination_tx),
                )
                .await;
            }
        })
    }

    async fn change_status(
        status_map: &Arc<Mutex<HashMap<String, JobStatus>>>,
        job_name: &str,
        status: JobStatus,
    ) {
        info!("{:<12} {}", format!("{}", status), job_name);
        status_map.lock().await.insert(job_name.to_owned(), status);
    }

    async fn manage_job_lifecycle<J: 'static + Job + Send + Sync>(
        job: J,
        status_map: Arc<Mutex<HashMap<String, JobStatus>>>,
        restart_interval: Duration,
    ) {
        let job_name = job.name();

        JobScheduler::change_status(&status_map, &job_name, JobStatus::Startup).await;
        loop {
            let (manager, readiness_rx, termination_tx) = TaskManager::new();

            let wrapped_termination_tx = if job.supports_graceful_termination() {
                Some(termination_tx)
            } else {
                None
            };

            let status_handle = JobScheduler::add_status_watcher(
                readiness_rx,
                wrapped_termination_tx,
                status_map.clone(),
                job_name.clone(),
            );

            let result = job.execute(manager).await;

            status_handle.cancel();

            match result {
                Ok(_) => {
                    JobScheduler::change_status(&status_map, &job_name, JobStatus::Finished).await;
                    status_map.lock().await.remove(&job_name);
                    break;
                }
                Err(e) => {
                    error!("{} crashed: {:?}", &job_name, e);
                    debug!("{} restarting in {:?}", &job_name, restart_interval);
                    JobScheduler::change_status(&status_map, &job_name, JobStatus::Restarting)
                        .await;
                    sleep(restart_interval).await;
                }
            }
        }
    }

    /// Manage a new job
    ///
    /// This method respawns the job if it crashes and keeps track of its lifecycle.
    pub fn spawn_job<J: 'static + Job + Send + Sync>(&self, job: J) {
        let status_map = self.status.clone();
        let termination_handles = self.termination_handles.clone();
        let restart_interval = self.restart_interval;
        let job_name = job.name();

        task::spawn(async move {
            let (job_lifecycle, termination_handle) = abortable(
                JobScheduler::manage_job_lifecycle(job, status_map.clone(), restart_interval),
            );

            termination_handles
                .lock()
                .await
                .insert(job_name.clone(), termination_handle);

            if job_lifecycle.await.is_err() {
                JobScheduler::change_status(&status_map, &job_name, JobStatus::Terminated).await;
            }

            termination_handles.lock().await.remove(&job_name);
            status_map.lock().await.remove(&job_name);
        });
    }

    /// Gracefully terminates all managed jobs that support it
    pub async fn terminate_jobs(&self) {
        // 1. Send the termination signal to jobs that support graceful shutdown and abort ones that don't
        {
            let status = self.status.lock().await;

            for (job_name, status) in status.iter() {
                if let JobStatus::Ready(Some(graceful_handle)) = status {
                    graceful_handle.send(true).ok();
                } else if let Some(forceful_handle) =
                    self.termination_handles.lock().await.get(job_name)
                {
                    forceful_handle.abort();
                }
            }
        }

        // 2. Give alive jobs some time to gracefully terminate (if applicable)
        for _ in 0..3000 {
            {
                let termination_handles = self.termination_handles.lock().await;
                let status = self.status.lock().await;

                let graceful_handles: Vec<&String> = termination_handles
                    .keys()
                    .filter(|job_name| {
                        if let Some(job_status) = status.get(*job_name) {
                            job_status.is_gracefully_terminatable()
                        } else {
                            false
                        }
                    })
                    .collect();

                if graceful_handles.is_empty() {
                    break;
                }
            }

            sleep(Duration::from_millis(10)).await;
        }

        // 3. Call the termination handle for all remaining jobs
        for (job_name, handle) in self.termination_handles.lock().await.iter() {
            warn!("{} ignored graceful termination request", job_name);
            handle.abort()
        }
    }
}

struct AbortableJoinHandle<O> {
    _join_handle: JoinHandle<Result<O, Aborted>>,
    abort_handle: AbortHandle,
}

impl<O> AbortableJoinHandle<O> {
    fn cancel(&self) {
        self.abort_handle.abort()
    }
}

fn spawn_abortable<F: 'static + Send, O: 'static + Send>(fut: F) -> AbortableJoinHandle<O>
where
    F: Future<Output = O>,
{
    let (future, abort_handle) = abortable(fut);
    AbortableJoinHandle {
        _join_handle: task::spawn(future),
        abort_handle,
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyJob {
        executions: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Job for FlakyJob {
        fn name(&self) -> String {
            "FlakyJob".into()
        }

        async fn execute(&self, manager: TaskManager) -> Result<()> {
            manager.ready().await;

            if self.executions.fetch_add(1, Ordering::SeqCst) < 2 {
                bail!("lost connection");
            }

            Ok(())
        }
    }

    #[tokio::test]
    async fn restart_crashed_jobs() {
        let executions = Arc::new(AtomicUsize::new(0));
        let scheduler = JobScheduler::new(Duration::from_millis(5));

        scheduler.spawn_job(FlakyJob {
            executions: executions.clone(),
        });

        for _ in 0..100 {
            if executions.load(Ordering::SeqCst) >= 3 {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(executions.load(Ordering::SeqCst), 3);
    }

    struct WaitingJob;

    #[async_trait]
    impl Job for WaitingJob {
        fn name(&self) -> String {
            "WaitingJob".into()
        }

        fn supports_graceful_termination(&self) -> bool {
            true
        }

        async fn execute(&self, manager: TaskManager) -> Result<()> {
            manager.ready().await;
            manager.termination_signal().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn terminate_jobs_gracefully() {
        let scheduler = JobScheduler::default();
        scheduler.spawn_job(WaitingJob);

        // Wait for the job to report readiness
        for _ in 0..100 {
            if scheduler
                .status
                .lock()
                .await
                .values()
                .any(|s| matches!(s, JobStatus::Ready(_)))
            {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }

        scheduler.terminate_jobs().await;

        // Removal from the status map happens in the detached lifecycle task
        for _ in 0..100 {
            if scheduler.status.lock().await.is_empty() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }

        assert!(scheduler.status.lock().await.is_empty());
    }
}
