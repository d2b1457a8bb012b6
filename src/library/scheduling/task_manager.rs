use futures::{
    channel::oneshot::{
        channel as one_shot_channel, Receiver as OneShotReceiver, Sender as OneShotSender,
    },
    lock::Mutex,
};
use std::sync::Arc;
use tokio::sync::watch::{
    channel as watch_channel, Receiver as WatchReceiver, Sender as WatchSender,
};

/// Manager passed to running jobs
///
/// Provides the readiness handshake and graceful termination signalling.
#[derive(Clone)]
pub struct TaskManager {
    readiness_tx: Arc<Mutex<Option<OneShotSender<()>>>>,
    termination_rx: WatchReceiver<bool>,
}

impl TaskManager {
    /// Creates a new task manager together with the scheduler-side channel ends
    pub fn new() -> (Self, OneShotReceiver<()>, WatchSender<bool>) {
        let (readiness_tx, readiness_rx) = one_shot_channel();
        let (termination_tx, termination_rx) = watch_channel(false);

        let manager = Self {
            readiness_tx: Arc::new(Mutex::new(Some(readiness_tx))),
            termination_rx,
        };

        (manager, readiness_rx, termination_tx)
    }

    /// Future that completes when the job should gracefully shutdown
    pub fn termination_signal(&self) -> impl futures::Future<Output = ()> {
        let mut rx = self.termination_rx.clone();
        async move {
            while !*rx.borrow() {
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
    }

    /// Checks if the job should enter graceful shutdown
    pub fn termination_signal_triggered(&self) -> bool {
        *self.termination_rx.borrow()
    }

    /// Indicates to the scheduler that this job is ready to fulfill its contract
    pub async fn ready(&self) {
        if let Some(tx) = self.readiness_tx.lock().await.take() {
            tx.send(()).ok();
        }
    }
}
