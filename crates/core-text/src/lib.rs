//! Text model for the line editor: a read-only [`Document`] query surface
//! and the editable [`Buffer`] that derives it.
//!
//! Cursor positions count Unicode scalar values. Display placement counts
//! terminal columns via the helpers in [`width`].

pub mod buffer;
pub mod document;
pub mod width;

pub use buffer::Buffer;
pub use document::Document;
pub use width::{char_width, str_width};
