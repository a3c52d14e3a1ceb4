//! Interactive prompt engine.
//!
//! A [`Prompt`] owns the editing state (buffer, history, completion,
//! reverse search) and drives it from raw terminal chunks:
//!
//! 1. the reader task forwards raw chunks over a channel;
//! 2. each chunk is decoded to a [`core_events::Key`] and dispatched,
//!    completion keys first, then the engine's own keys, then the built-in
//!    and user key bindings;
//! 3. the renderer redraws the prompt.
//!
//! Committing a line stops the background tasks and leaves raw mode before
//! the executor runs, so user code never races the reader and always sees a
//! cooked terminal. Raw mode and the tasks are restored afterwards.

mod builder;
pub mod error;
mod prompt;

pub use builder::{DEFAULT_PREFIX, PromptBuilder};
pub use error::PromptError;
pub use prompt::{ExecContext, Executor, ExitChecker, LivePrefix, Prompt, RunOutcome, TAB_WIDTH};

pub use core_actions::{Action, AsciiCodeBind, KeyBind, KeyBindMode};
pub use core_events::Key;
pub use core_render::RenderStyle;
pub use core_state::Suggest;
pub use core_text::{Buffer, Document};
