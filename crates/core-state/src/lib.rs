//! Line-editor state that outlives a single keystroke: the command
//! [`History`], the transient [`ReverseSearch`] over it, and the
//! [`CompletionManager`] behind the suggestion popup.
//!
//! Everything here is owned by the prompt's main loop. Nothing is shared
//! across tasks, so no type in this crate is synchronised.

pub mod completion;
pub mod history;
pub mod reverse_search;

pub use completion::{Completer, CompletionManager, DEFAULT_MAX_SUGGESTIONS, Suggest};
pub use history::History;
pub use reverse_search::ReverseSearch;
