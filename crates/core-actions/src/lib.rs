//! Built-in editing actions and the key binding tables that trigger them.
//!
//! An [`Action`] is a named edit applied to a [`Buffer`] by [`dispatch`].
//! Bindings pair a decoded [`Key`](core_events::Key) (or a raw byte
//! sequence) with either a built-in action or a caller-supplied closure. The
//! prompt evaluates binding tables in a fixed order: common, then the
//! mode-specific table, then user bindings.

pub mod bindings;

pub use bindings::{
    AsciiCodeBind, Handler, KeyBind, KeyBindMode, apply_ascii_bindings, apply_key_bindings,
    common_bindings, emacs_bindings,
};

use core_text::Buffer;
use tracing::trace;

/// Built-in edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    GoLineEnd,
    GoLineBeginning,
    /// Delete the scalar under the cursor.
    DeleteChar,
    /// `DeleteChar`, but only when the buffer holds any text.
    DeleteCharIfNotEmpty,
    /// Delete the word before the cursor, including trailing separators.
    DeleteWord,
    DeleteBeforeChar,
    /// Move right; at the end of a row continue at the start of the next.
    GoRightChar,
    /// Move left; at the start of a row continue at the end of the previous.
    GoLeftChar,
    GoRightWord,
    GoLeftWord,
    /// Delete from the cursor to the end of its row.
    KillLineAfter,
    /// Delete from the start of the cursor's row to the cursor.
    KillLineBefore,
    ClearScreen,
}

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchResult {
    /// The terminal must be cleared before the next frame.
    pub clear_screen: bool,
}

impl DispatchResult {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn clear_screen() -> Self {
        Self { clear_screen: true }
    }

    /// Combine two results; any requested clear wins.
    pub fn merge(self, other: Self) -> Self {
        Self {
            clear_screen: self.clear_screen || other.clear_screen,
        }
    }
}

/// Apply an action to the buffer.
pub fn dispatch(action: Action, buf: &mut Buffer) -> DispatchResult {
    trace!(target: "actions.dispatch", ?action, "dispatch");
    match action {
        Action::GoLineEnd => go_line_end(buf),
        Action::GoLineBeginning => go_line_beginning(buf),
        Action::DeleteChar => {
            buf.delete(1);
        }
        Action::DeleteCharIfNotEmpty => {
            if !buf.text().is_empty() {
                buf.delete(1);
            }
        }
        Action::DeleteWord => {
            let doc = buf.document();
            let count = doc.cursor_position() - doc.find_start_of_previous_word_with_space();
            buf.delete_before_cursor(count);
        }
        Action::DeleteBeforeChar => {
            buf.delete_before_cursor(1);
        }
        Action::GoRightChar => {
            let doc = buf.document();
            if doc.get_cursor_right_position(1) == 0 {
                if !doc.on_last_line() {
                    buf.cursor_down(1);
                    go_line_beginning(buf);
                }
            } else {
                buf.cursor_right(1);
            }
        }
        Action::GoLeftChar => {
            let doc = buf.document();
            if doc.get_cursor_left_position(1) == 0 {
                if doc.cursor_position_row() != 0 {
                    buf.cursor_up(1);
                    go_line_end(buf);
                }
            } else {
                buf.cursor_left(1);
            }
        }
        Action::GoRightWord => {
            let n = buf.document().find_end_of_current_word_with_space();
            buf.cursor_right(n);
        }
        Action::GoLeftWord => {
            let doc = buf.document();
            let n = doc.cursor_position() - doc.find_start_of_previous_word_with_space();
            buf.cursor_left(n);
        }
        Action::KillLineAfter => {
            let n = buf.document().get_end_of_line_position();
            buf.delete(n);
        }
        Action::KillLineBefore => {
            let n = buf.document().cursor_position_col();
            buf.delete_before_cursor(n);
        }
        Action::ClearScreen => return DispatchResult::clear_screen(),
    }
    DispatchResult::clean()
}

fn go_line_end(buf: &mut Buffer) {
    let n = buf.document().get_end_of_line_position();
    buf.cursor_right(n);
}

fn go_line_beginning(buf: &mut Buffer) {
    let n = buf.document().cursor_position_col();
    buf.cursor_left(n);
}
