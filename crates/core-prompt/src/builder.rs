//! Prompt construction.

use std::sync::Arc;

use core_actions::{AsciiCodeBind, KeyBind, KeyBindMode, common_bindings, emacs_bindings};
use core_config::Config;
use core_render::{BreakLineCallback, RenderStyle, Renderer};
use core_state::{CompletionManager, DEFAULT_MAX_SUGGESTIONS, History, Suggest};
use core_terminal::{ConsoleParser, ConsoleWriter, parse_color};
use core_text::{Buffer, Document};
use crossterm::style::Color;
use tracing::{debug, warn};

use crate::prompt::{Executor, ExitChecker, LivePrefix, Prompt};
use crate::ExecContext;

pub const DEFAULT_PREFIX: &str = "> ";

/// Collects options for a [`Prompt`].
///
/// ```no_run
/// use core_prompt::PromptBuilder;
///
/// let mut prompt = PromptBuilder::new(|line, _ctx| println!("got {line}"))
///     .prefix(">>> ")
///     .title("demo")
///     .build()
///     .unwrap();
/// prompt.run().unwrap();
/// ```
pub struct PromptBuilder {
    executor: Executor,
    completer: Option<Box<dyn Fn(&Document) -> Vec<Suggest>>>,
    prefix: String,
    live_prefix: Option<LivePrefix>,
    title: String,
    max_suggestion: usize,
    history: Vec<String>,
    key_bind_mode: KeyBindMode,
    key_bindings: Vec<KeyBind>,
    ascii_bindings: Vec<AsciiCodeBind>,
    show_completion_at_start: bool,
    completion_on_down: bool,
    word_separator: String,
    break_line_callback: Option<BreakLineCallback>,
    exit_checker: Option<ExitChecker>,
    reverse_search: bool,
    auto_history: bool,
    style: RenderStyle,
}

impl PromptBuilder {
    pub fn new<F>(executor: F) -> Self
    where
        F: FnMut(&str, &mut ExecContext<'_>) + 'static,
    {
        Self {
            executor: Box::new(executor),
            completer: None,
            prefix: DEFAULT_PREFIX.to_string(),
            live_prefix: None,
            title: String::new(),
            max_suggestion: DEFAULT_MAX_SUGGESTIONS,
            history: Vec::new(),
            key_bind_mode: KeyBindMode::default(),
            key_bindings: Vec::new(),
            ascii_bindings: Vec::new(),
            show_completion_at_start: false,
            completion_on_down: false,
            word_separator: String::new(),
            break_line_callback: None,
            exit_checker: None,
            reverse_search: false,
            auto_history: true,
            style: RenderStyle::default(),
        }
    }

    pub fn completer<F>(mut self, f: F) -> Self
    where
        F: Fn(&Document) -> Vec<Suggest> + 'static,
    {
        self.completer = Some(Box::new(f));
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Prefix computed before every frame. Returning `None` falls back to
    /// the static prefix.
    pub fn live_prefix<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Option<String> + 'static,
    {
        self.live_prefix = Some(Box::new(f));
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn max_suggestion(mut self, rows: usize) -> Self {
        self.max_suggestion = rows;
        self
    }

    pub fn history<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.history = entries.into_iter().map(Into::into).collect();
        self
    }

    pub fn key_bind_mode(mut self, mode: KeyBindMode) -> Self {
        self.key_bind_mode = mode;
        self
    }

    pub fn add_key_bind(mut self, bind: KeyBind) -> Self {
        self.key_bindings.push(bind);
        self
    }

    pub fn add_ascii_code_bind(mut self, bind: AsciiCodeBind) -> Self {
        self.ascii_bindings.push(bind);
        self
    }

    pub fn show_completion_at_start(mut self) -> Self {
        self.show_completion_at_start = true;
        self
    }

    /// Let Down open the completion list even when nothing is selected.
    pub fn completion_on_down(mut self) -> Self {
        self.completion_on_down = true;
        self
    }

    /// Characters that end the word replaced by an accepted suggestion.
    /// Empty means whitespace.
    pub fn completion_word_separator(mut self, sep: impl Into<String>) -> Self {
        self.word_separator = sep.into();
        self
    }

    pub fn break_line_callback<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Document) + 'static,
    {
        self.break_line_callback = Some(Box::new(f));
        self
    }

    /// Consulted with `(text, false)` after every key and with
    /// `(committed, true)` after every executor call.
    pub fn exit_checker<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, bool) -> bool + 'static,
    {
        self.exit_checker = Some(Box::new(f));
        self
    }

    pub fn reverse_search(mut self) -> Self {
        self.reverse_search = true;
        self
    }

    /// Stop adding committed lines to the history; callers push them with
    /// [`ExecContext::push_to_history`] or [`Prompt::push_to_history`].
    pub fn disable_auto_history(mut self) -> Self {
        self.auto_history = false;
        self
    }

    pub fn style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn color(mut self, slot: &str, color: Color) -> Self {
        if !self.style.set(slot, color) {
            warn!(target: "config", slot, "unknown_color_slot");
        }
        self
    }

    /// Override options with the keys present in a loaded configuration.
    ///
    /// Unknown color slots, unparsable colors and unknown key bind modes are
    /// logged and skipped.
    pub fn apply_config(mut self, config: &Config) -> Self {
        let p = &config.file.prompt;
        if let Some(prefix) = &p.prefix {
            self.prefix.clone_from(prefix);
        }
        if let Some(title) = &p.title {
            self.title.clone_from(title);
        }
        if let Some(rows) = p.max_suggestion {
            self.max_suggestion = usize::from(rows);
        }
        if let Some(mode) = &p.key_bind_mode {
            match KeyBindMode::parse(mode) {
                Some(m) => self.key_bind_mode = m,
                None => warn!(target: "config", mode = mode.as_str(), "unknown_key_bind_mode"),
            }
        }
        if let Some(v) = p.completion_on_down {
            self.completion_on_down = v;
        }
        if let Some(v) = p.show_completion_at_start {
            self.show_completion_at_start = v;
        }
        if let Some(sep) = &p.word_separator {
            self.word_separator.clone_from(sep);
        }
        if let Some(v) = p.reverse_search {
            self.reverse_search = v;
        }
        if let Some(v) = p.auto_history {
            self.auto_history = v;
        }
        for (slot, name) in &config.file.colors {
            match parse_color(name) {
                Some(c) => self = self.color(slot, c),
                None => warn!(target: "config", slot = slot.as_str(), color = name.as_str(), "unknown_color"),
            }
        }
        self.history
            .extend(config.file.history.entries.iter().cloned());
        self
    }

    /// Prompt on the process terminal: stdin in raw mode, VT100 on stdout.
    pub fn build(self) -> anyhow::Result<Prompt<core_terminal::Vt100Writer<std::io::Stdout>>> {
        #[cfg(unix)]
        {
            let parser = Arc::new(core_terminal::PosixParser::new());
            Ok(self.build_with(parser, core_terminal::Vt100Writer::stdout()))
        }
        #[cfg(not(unix))]
        {
            anyhow::bail!("no console parser for this platform")
        }
    }

    /// Prompt over caller-supplied terminal endpoints.
    pub fn build_with<W: ConsoleWriter>(self, parser: Arc<dyn ConsoleParser>, writer: W) -> Prompt<W> {
        let mut completion = match self.completer {
            Some(c) => CompletionManager::new(c, self.max_suggestion),
            None => CompletionManager::new(Box::new(|_| Vec::new()), self.max_suggestion),
        };
        completion.set_word_separator(self.word_separator);
        completion.set_show_at_start(self.show_completion_at_start);

        let mut builtin = common_bindings();
        if self.key_bind_mode == KeyBindMode::Emacs {
            builtin.extend(emacs_bindings());
        }

        let mut renderer = Renderer::new(writer);
        renderer.set_style(self.style);
        if let Some(cb) = self.break_line_callback {
            renderer.set_break_line_callback(cb);
        }

        debug!(
            target: "prompt",
            mode = ?self.key_bind_mode,
            history = self.history.len(),
            reverse_search = self.reverse_search,
            auto_history = self.auto_history,
            "prompt_built"
        );

        Prompt {
            parser,
            renderer,
            buf: Buffer::new(),
            cursor: Default::default(),
            end_cursor: Default::default(),
            executor: self.executor,
            history: History::with_entries(self.history),
            completion,
            builtin_bindings: builtin,
            key_bindings: self.key_bindings,
            ascii_bindings: self.ascii_bindings,
            completion_on_down: self.completion_on_down,
            exit_checker: self.exit_checker,
            skip_tear_down: false,
            prefix: self.prefix,
            live_prefix: self.live_prefix,
            title: self.title,
            reverse_search: None,
            reverse_search_enabled: self.reverse_search,
            auto_history: self.auto_history,
            utf8_carry: Default::default(),
        }
    }
}
