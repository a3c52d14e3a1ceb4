//! Background tasks feeding the prompt loop.
//!
//! The reader polls a [`ConsoleParser`](core_terminal::ConsoleParser) for raw
//! byte chunks; the signal watcher turns window-size changes and termination
//! signals into messages. Neither task touches editing state. Each is
//! returned as a [`TaskHandle`] so the loop can stop it and wait for it
//! before running user code outside raw mode.

mod reader;
#[cfg(unix)]
mod signals;
mod shutdown;

pub use reader::{READ_POLL_INTERVAL, spawn_reader};
#[cfg(unix)]
pub use signals::{EXIT_CODE_INTERRUPT, EXIT_CODE_TERMINATE, spawn_signal_watcher};
pub use shutdown::{TaskHandle, TaskShutdown};

#[inline]
pub(crate) fn log_input_chunk(chunk: &[u8]) {
    tracing::trace!(target: "input.reader", chunk_len = chunk.len(), "chunk_forward");
}
