//! Terminal boundary: raw input parsing and escape-sequence output.
//!
//! [`ConsoleParser`] owns raw mode and raw byte reads. It is shared between
//! the reader task and the prompt loop, so every method takes `&self`.
//! [`ConsoleWriter`] buffers output primitives until `flush`. Counts are
//! signed: zero emits nothing and a negative count moves the other way.

use std::sync::Arc;

use anyhow::Result;
use core_events::WinSize;
use crossterm::style::Color;

pub mod color;
#[cfg(unix)]
pub mod posix;
pub mod vt100;

pub use color::parse_color;
#[cfg(unix)]
pub use posix::PosixParser;
pub use vt100::Vt100Writer;

pub trait ConsoleParser: Send + Sync {
    /// Enter raw mode. Calling it while already in raw mode is a no-op.
    fn setup(&self) -> Result<()>;
    /// Restore the original terminal mode. Idempotent.
    fn tear_down(&self) -> Result<()>;
    fn get_win_size(&self) -> Result<WinSize>;
    /// Next pending chunk without blocking. Empty when nothing is pending.
    fn read(&self) -> Result<Vec<u8>>;
}

pub trait ConsoleWriter {
    /// Queue bytes verbatim, escape sequences included.
    fn write_raw(&mut self, data: &[u8]);
    /// Queue text with any ESC replaced by `?`.
    fn write_str(&mut self, s: &str);
    fn flush(&mut self) -> Result<()>;

    fn erase_screen(&mut self);
    fn erase_down(&mut self);
    fn erase_end_of_line(&mut self);

    /// Absolute move, 0-based.
    fn cursor_goto(&mut self, row: u16, col: u16);
    fn cursor_up(&mut self, n: i32);
    fn cursor_down(&mut self, n: i32);
    fn cursor_forward(&mut self, n: i32);
    fn cursor_backward(&mut self, n: i32);
    fn hide_cursor(&mut self);
    fn show_cursor(&mut self);

    /// Scroll content up one line (cursor moves down, ESC D).
    fn scroll_down(&mut self);
    /// Scroll content down one line (cursor moves up, ESC M).
    fn scroll_up(&mut self);

    fn set_title(&mut self, title: &str);
    fn clear_title(&mut self);
    fn set_color(&mut self, fg: Color, bg: Color, bold: bool);
}

/// Tears the parser down when dropped, restoring the terminal even when the
/// owner unwinds.
pub struct RawModeGuard {
    parser: Arc<dyn ConsoleParser>,
    active: bool,
}

impl RawModeGuard {
    pub fn enter(parser: Arc<dyn ConsoleParser>) -> Result<Self> {
        parser.setup()?;
        Ok(Self {
            parser,
            active: true,
        })
    }

    /// Tear down now and surface the error instead of discarding it.
    pub fn release(mut self) -> Result<()> {
        self.active = false;
        self.parser.tear_down()
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = self.parser.tear_down();
        }
    }
}
