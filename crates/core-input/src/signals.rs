use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::Result;
use core_events::{CHANNEL_SEND_FAILURES, SIGNAL_TASK_STARTS, SIGNAL_TASK_STOPS, WinSize};
use core_terminal::ConsoleParser;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc::Sender;
use tokio::task;
use tracing::{debug, info, warn};

use crate::shutdown::{ShutdownListener, TaskHandle};

/// Exit code delivered for SIGINT.
pub const EXIT_CODE_INTERRUPT: i32 = 0;
/// Exit code delivered for SIGTERM and SIGQUIT.
pub const EXIT_CODE_TERMINATE: i32 = 1;

/// Spawn the watcher translating OS signals into channel messages.
///
/// SIGWINCH re-queries the window size and sends it on `resize`; SIGINT,
/// SIGTERM and SIGQUIT send an exit code on `exit`. Sends never wait: a full
/// channel means the loop already has a pending notification of that kind.
pub fn spawn_signal_watcher(
    parser: Arc<dyn ConsoleParser>,
    resize: Sender<WinSize>,
    exit: Sender<i32>,
) -> Result<TaskHandle> {
    let mut winch = signal(SignalKind::window_change())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;
    let (shutdown, listener) = ShutdownListener::new_pair();

    let handle = task::spawn(async move {
        info!(target: "input.signal", "signal_task_started");
        SIGNAL_TASK_STARTS.fetch_add(1, Ordering::Relaxed);
        loop {
            tokio::select! {
                biased;
                _ = listener.wait() => break,
                Some(()) = winch.recv() => match parser.get_win_size() {
                    Ok(size) => {
                        debug!(target: "input.signal", rows = size.rows, cols = size.cols, "sigwinch");
                        if resize.try_send(size).is_err() {
                            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                    Err(err) => warn!(target: "input.signal", error = %err, "win_size_failed"),
                },
                Some(()) = interrupt.recv() => send_exit(&exit, EXIT_CODE_INTERRUPT, "sigint"),
                Some(()) = terminate.recv() => send_exit(&exit, EXIT_CODE_TERMINATE, "sigterm"),
                Some(()) = quit.recv() => send_exit(&exit, EXIT_CODE_TERMINATE, "sigquit"),
            }
        }
        SIGNAL_TASK_STOPS.fetch_add(1, Ordering::Relaxed);
        info!(target: "input.signal", "signal_task_stopped");
    });
    Ok(TaskHandle::new("signal", handle, shutdown))
}

fn send_exit(exit: &Sender<i32>, code: i32, name: &'static str) {
    debug!(target: "input.signal", signal = name, code, "exit_signal");
    if exit.try_send(code).is_err() {
        CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
    }
}
