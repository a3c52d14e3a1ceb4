//! Differential prompt renderer.
//!
//! Each frame starts from where the previous one left the terminal cursor.
//! The renderer walks back to the start of the previously drawn text with
//! relative up/backward moves only, erases it, writes the new text and then
//! steps back to the logical cursor. The caller keeps the two returned
//! [`Location`]s and hands them back in the next [`RenderCtx`].
//!
//! Positions inside a frame are linear: `row * columns + col`, counted from
//! the first column of the first prompt row.
//!
//! Modules:
//! - `renderer`: frame drawing, break-line commits, completion popup.
//! - `format`: fixed-width suggestion cells.
//! - `style`: color palette.

pub mod format;
pub mod renderer;
pub mod style;

use core_state::CompletionManager;
use core_text::Buffer;

pub use format::{format_suggestions, format_texts};
pub use renderer::{BreakLineCallback, Renderer};
pub use style::RenderStyle;

/// Why a frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderEvent {
    /// Regular redraw after input.
    #[default]
    Basic,
    /// Commit the line to scrollback and start a fresh prompt below it.
    BreakLine,
    /// Terminal dimensions changed; previous positions are not trusted.
    Resize,
}

/// Screen position relative to the first prompt row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub row: i32,
    pub col: i32,
}

impl Location {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

/// Everything one frame needs.
///
/// `cmd` holds the prefix followed by the text to show, with its cursor
/// already offset past the prefix.
pub struct RenderCtx<'a> {
    pub cmd: &'a Buffer,
    pub prefix: &'a str,
    pub cursor: Location,
    pub end_cursor: Location,
    pub completion: &'a CompletionManager,
    pub render_completion: bool,
    pub event: RenderEvent,
}
