use std::sync::Arc;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::debug;

/// Requests termination of one background task.
#[derive(Clone, Debug)]
pub struct TaskShutdown {
    notify: Arc<Notify>,
}

impl TaskShutdown {
    /// Safe to call before the task reaches its wait point; the request is
    /// kept until the task observes it.
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ShutdownListener {
    notify: Arc<Notify>,
}

impl ShutdownListener {
    pub(crate) fn new_pair() -> (TaskShutdown, Self) {
        let notify = Arc::new(Notify::new());
        (
            TaskShutdown {
                notify: notify.clone(),
            },
            ShutdownListener { notify },
        )
    }

    pub(crate) async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// A running background task together with its shutdown handle.
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    handle: JoinHandle<()>,
    shutdown: TaskShutdown,
}

impl TaskHandle {
    pub(crate) fn new(name: &'static str, handle: JoinHandle<()>, shutdown: TaskShutdown) -> Self {
        Self {
            name,
            handle,
            shutdown,
        }
    }

    pub fn shutdown_handle(&self) -> TaskShutdown {
        self.shutdown.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signal the task and wait until it has fully exited.
    pub async fn stop(self) {
        self.shutdown.signal();
        if let Err(join_err) = self.handle.await {
            debug!(target: "input", task = self.name, ?join_err, "task_join_failed");
        }
    }
}
