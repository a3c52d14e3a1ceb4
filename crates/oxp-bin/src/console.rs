//! Demo session state and prompt wiring.
//!
//! A line starting with `#` opens a statement that keeps collecting lines
//! until one ends with `#`. Completed statements are echoed as `cmd: ...`
//! and pushed to the history by hand; automatic history is off.

use std::cell::RefCell;
use std::rc::Rc;

use core_prompt::{Document, PromptBuilder, RenderStyle, Suggest};
use crossterm::style::Color;
use tracing::{debug, warn};

pub const TITLE: &str = "oxprompt";
pub const PREFIX: &str = "oxprompt> ";
/// Prefix while a multi-line statement is open.
pub const CONTINUATION_PREFIX: &str = "> ";
pub const EXIT_COMMAND: &str = "exit";

const WORDS: &[&str] = &["abc", "aad", "aba", "aart", "apple", "git", "gggit", "gist"];

/// Words starting with the whole line. Nothing for an empty line.
pub fn complete(doc: &Document) -> Vec<Suggest> {
    let text = doc.text();
    if text.is_empty() {
        return Vec::new();
    }
    WORDS
        .iter()
        .filter(|w| w.starts_with(text))
        .map(|w| Suggest::new(*w, ""))
        .collect()
}

#[derive(Debug, Default)]
pub struct Session {
    pending: String,
}

impl Session {
    /// Add a committed line. Returns the statement once it is complete.
    pub fn add_line(&mut self, line: &str) -> Option<String> {
        let complete = if self.pending.is_empty() {
            line.clone_into(&mut self.pending);
            !line.starts_with('#')
        } else {
            let multi_line = self.pending.starts_with('#');
            self.pending.push('\n');
            self.pending.push_str(line);
            !multi_line || line.ends_with('#')
        };
        complete.then(|| std::mem::take(&mut self.pending))
    }

    pub fn is_open(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Prompt configured for the demo session. Configuration file values are
/// applied on top by the caller.
pub fn builder(session: Rc<RefCell<Session>>) -> PromptBuilder {
    let live = session.clone();
    let style = RenderStyle {
        suggestion_bg: Color::DarkGrey,
        preview_suggestion_text: Color::Reset,
        ..RenderStyle::default()
    };

    PromptBuilder::new(move |line, ctx| {
        if line == EXIT_COMMAND {
            println!();
            return;
        }
        let Some(stmt) = session.borrow_mut().add_line(line) else {
            debug!(target: "runtime", "statement_open");
            return;
        };
        println!("cmd: {stmt}");
        if let Err(err) = ctx.push_to_history(&stmt) {
            warn!(target: "runtime", error = %err, "history_push_failed");
        }
    })
    .title(TITLE)
    .prefix(PREFIX)
    .live_prefix(move || {
        live.borrow()
            .is_open()
            .then(|| CONTINUATION_PREFIX.to_string())
    })
    .style(style)
    .completer(complete)
    .disable_auto_history()
    .reverse_search()
    .exit_checker(|text, committed| committed && text == EXIT_COMMAND)
}
