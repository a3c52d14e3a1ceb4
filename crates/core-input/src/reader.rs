use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use core_events::{
    CHANNEL_SEND_FAILURES, INPUT_BYTES, INPUT_CHUNKS, READER_STARTS, READER_STOP_CHANNEL,
    READER_STOP_ERROR, READER_STOP_SIGNAL,
};
use core_terminal::ConsoleParser;
use tokio::sync::mpsc::Sender;
use tokio::task;
use tracing::{info, warn};

use crate::log_input_chunk;
use crate::shutdown::{ShutdownListener, TaskHandle};

/// Pause between non-blocking read attempts.
pub const READ_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    Running,
    ShutdownSignal,
    ChannelClosed,
    ReadError,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Running => "running",
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::ChannelClosed => "channel_closed",
            ExitReason::ReadError => "read_error",
        }
    }
}

/// Spawn the raw byte reader.
///
/// Every non-empty chunk is forwarded unchanged except the single `0x00`
/// byte, which some parsers return when nothing was pending.
pub fn spawn_reader(parser: Arc<dyn ConsoleParser>, sender: Sender<Vec<u8>>) -> TaskHandle {
    let (shutdown, listener) = ShutdownListener::new_pair();
    let handle = task::spawn(async move {
        ReaderTask {
            parser,
            sender,
            shutdown: listener,
            exit_reason: ExitReason::Running,
        }
        .run()
        .await;
    });
    TaskHandle::new("reader", handle, shutdown)
}

struct ReaderTask {
    parser: Arc<dyn ConsoleParser>,
    sender: Sender<Vec<u8>>,
    shutdown: ShutdownListener,
    exit_reason: ExitReason,
}

impl ReaderTask {
    async fn run(mut self) {
        info!(target: "input.reader", "reader_started");
        READER_STARTS.fetch_add(1, Ordering::Relaxed);
        while self.exit_reason == ExitReason::Running {
            tokio::select! {
                biased;
                _ = self.shutdown.wait() => {
                    self.exit_reason = ExitReason::ShutdownSignal;
                    break;
                }
                _ = tokio::time::sleep(READ_POLL_INTERVAL) => {}
            }

            let chunk = match self.parser.read() {
                Ok(chunk) => chunk,
                Err(err) => {
                    warn!(target: "input.reader", error = %err, "read_failed");
                    self.exit_reason = ExitReason::ReadError;
                    break;
                }
            };
            if chunk.is_empty() || chunk == [0] {
                continue;
            }
            self.forward(chunk).await;
        }

        match self.exit_reason {
            ExitReason::ShutdownSignal => READER_STOP_SIGNAL.fetch_add(1, Ordering::Relaxed),
            ExitReason::ChannelClosed => READER_STOP_CHANNEL.fetch_add(1, Ordering::Relaxed),
            ExitReason::ReadError => READER_STOP_ERROR.fetch_add(1, Ordering::Relaxed),
            ExitReason::Running => 0,
        };
        info!(target: "input.reader", reason = self.exit_reason.as_str(), "reader_stopped");
    }

    async fn forward(&mut self, chunk: Vec<u8>) {
        let len = chunk.len();
        log_input_chunk(&chunk);
        // A full channel must not keep the task from seeing a shutdown request.
        tokio::select! {
            biased;
            _ = self.shutdown.wait() => {
                self.exit_reason = ExitReason::ShutdownSignal;
            }
            sent = self.sender.send(chunk) => match sent {
                Ok(()) => {
                    INPUT_CHUNKS.fetch_add(1, Ordering::Relaxed);
                    INPUT_BYTES.fetch_add(len as u64, Ordering::Relaxed);
                }
                Err(_) => {
                    CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                    self.exit_reason = ExitReason::ChannelClosed;
                }
            },
        }
    }
}
