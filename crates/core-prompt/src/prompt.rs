//! The prompt engine: key dispatch, rendering and the executor handoff.

use std::sync::Arc;

use core_actions::{AsciiCodeBind, DispatchResult, KeyBind, apply_ascii_bindings, apply_key_bindings};
use core_events::{EXIT_CHANNEL_CAP, INPUT_CHANNEL_CAP, Key, RESIZE_CHANNEL_CAP, WinSize};
use core_input::{TaskHandle, spawn_reader};
use core_keymap::decode;
use core_render::{Location, RenderCtx, RenderEvent, Renderer};
use core_state::{CompletionManager, History, ReverseSearch};
use core_terminal::{ConsoleParser, ConsoleWriter};
use core_text::Buffer;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, trace, warn};

use crate::error::PromptError;

/// Tab stops used when normalising input.
pub const TAB_WIDTH: usize = 4;

/// Called with every committed line.
pub type Executor = Box<dyn FnMut(&str, &mut ExecContext<'_>)>;
/// `(text, committed)`; returning `true` ends the run.
pub type ExitChecker = Box<dyn Fn(&str, bool) -> bool>;
pub type LivePrefix = Box<dyn Fn() -> Option<String>>;

/// What the executor may touch while the prompt is suspended.
pub struct ExecContext<'a> {
    history: &'a mut History,
    auto_history: bool,
}

impl ExecContext<'_> {
    /// Record `cmd` in the history. Only allowed when automatic history is
    /// disabled.
    pub fn push_to_history(&mut self, cmd: &str) -> Result<(), PromptError> {
        push_history(self.history, self.auto_history, cmd)
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }
}

fn push_history(history: &mut History, auto_history: bool, cmd: &str) -> Result<(), PromptError> {
    if auto_history {
        return Err(PromptError::ExternalHistoryPushForbidden);
    }
    let cmd = Buffer::from_text(cmd).replace_tabs(TAB_WIDTH);
    history.add(cmd.text());
    Ok(())
}

/// How a [`Prompt::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Ctrl-D on an empty line, the exit checker, or closed input.
    Finished,
    /// An OS signal asked the process to exit with this code.
    Signal(i32),
}

#[derive(Debug, Default)]
struct Fed {
    exit: bool,
    exec: Option<String>,
}

enum LoopEvent {
    Input(Option<Vec<u8>>),
    Resize(WinSize),
    Exit(i32),
}

/// Holds back a UTF-8 sequence cut off at the end of a read so it can be
/// completed by the next chunk.
#[derive(Debug, Default)]
pub(crate) struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    /// Decode `bytes` after any held-back prefix. Invalid sequences become
    /// U+FFFD; an incomplete tail is kept for the next call.
    fn decode(&mut self, bytes: &[u8]) -> String {
        let mut data = std::mem::take(&mut self.pending);
        data.extend_from_slice(bytes);

        let mut out = String::with_capacity(data.len());
        let mut rest = data.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, tail) = rest.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[bad..];
                        }
                        None => {
                            trace!(target: "prompt", held = tail.len(), "utf8_tail_held");
                            self.pending = tail.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Drop a held-back tail that the next chunk did not complete.
    fn discard(&mut self) {
        if !self.pending.is_empty() {
            debug!(target: "prompt", dropped = self.pending.len(), "utf8_tail_dropped");
            self.pending.clear();
        }
    }
}

/// Background tasks feeding the loop. Restarted around every executor call.
struct Watchers {
    parser: Arc<dyn ConsoleParser>,
    signals: Option<(Sender<WinSize>, Sender<i32>)>,
    reader: Option<TaskHandle>,
    signal_task: Option<TaskHandle>,
}

impl Watchers {
    fn new(parser: Arc<dyn ConsoleParser>, signals: Option<(Sender<WinSize>, Sender<i32>)>) -> Self {
        Self {
            parser,
            signals,
            reader: None,
            signal_task: None,
        }
    }

    /// Spawn the reader (and the signal task when enabled) and return the
    /// receiver the new reader feeds. Chunks still queued in `carry` are
    /// moved over first so nothing typed during the handoff is lost.
    fn start(&mut self, carry: Option<&mut Receiver<Vec<u8>>>) -> Result<Receiver<Vec<u8>>, PromptError> {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAP);
        if let Some(old) = carry {
            let mut carried = 0usize;
            while let Ok(chunk) = old.try_recv() {
                if tx.try_send(chunk).is_err() {
                    break;
                }
                carried += 1;
            }
            if carried > 0 {
                debug!(target: "prompt", carried, "input_carried_over");
            }
        }
        self.reader = Some(spawn_reader(self.parser.clone(), tx));
        #[cfg(unix)]
        if let Some((resize, exit)) = &self.signals {
            self.signal_task = Some(core_input::spawn_signal_watcher(
                self.parser.clone(),
                resize.clone(),
                exit.clone(),
            )?);
        }
        Ok(rx)
    }

    async fn stop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.stop().await;
        }
        if let Some(signals) = self.signal_task.take() {
            signals.stop().await;
        }
    }
}

/// Interactive line editor bound to a terminal.
///
/// Built with [`crate::PromptBuilder`]. All editing state lives here and is
/// only touched by the loop driving it; the reader and signal tasks talk to
/// the loop through channels.
pub struct Prompt<W: ConsoleWriter> {
    pub(crate) parser: Arc<dyn ConsoleParser>,
    pub(crate) renderer: Renderer<W>,
    pub(crate) buf: Buffer,
    pub(crate) cursor: Location,
    pub(crate) end_cursor: Location,
    pub(crate) executor: Executor,
    pub(crate) history: History,
    pub(crate) completion: CompletionManager,
    pub(crate) builtin_bindings: Vec<KeyBind>,
    pub(crate) key_bindings: Vec<KeyBind>,
    pub(crate) ascii_bindings: Vec<AsciiCodeBind>,
    pub(crate) completion_on_down: bool,
    pub(crate) exit_checker: Option<ExitChecker>,
    pub(crate) skip_tear_down: bool,
    pub(crate) prefix: String,
    pub(crate) live_prefix: Option<LivePrefix>,
    pub(crate) title: String,
    /// `Some` while reverse search is active.
    pub(crate) reverse_search: Option<ReverseSearch>,
    pub(crate) reverse_search_enabled: bool,
    pub(crate) auto_history: bool,
    pub(crate) utf8_carry: Utf8Carry,
}

impl<W: ConsoleWriter> Prompt<W> {
    /// Run the prompt on a fresh current-thread runtime until it finishes.
    pub fn run(&mut self) -> Result<RunOutcome, PromptError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(self.run_async())
    }

    /// Read lines and hand each to the executor until Ctrl-D, the exit
    /// checker, closed input or an exit signal.
    pub async fn run_async(&mut self) -> Result<RunOutcome, PromptError> {
        let (resize_tx, resize_rx) = mpsc::channel(RESIZE_CHANNEL_CAP);
        let (exit_tx, exit_rx) = mpsc::channel(EXIT_CHANNEL_CAP);
        self.run_watching(Some((resize_tx, exit_tx)), resize_rx, exit_rx)
            .await
    }

    /// Like [`Prompt::run_async`], but window sizes and exit codes come from
    /// the caller instead of OS signals. A closed channel is ignored.
    pub async fn run_with_channels(
        &mut self,
        resize_rx: Receiver<WinSize>,
        exit_rx: Receiver<i32>,
    ) -> Result<RunOutcome, PromptError> {
        self.run_watching(None, resize_rx, exit_rx).await
    }

    async fn run_watching(
        &mut self,
        signals: Option<(Sender<WinSize>, Sender<i32>)>,
        resize_rx: Receiver<WinSize>,
        exit_rx: Receiver<i32>,
    ) -> Result<RunOutcome, PromptError> {
        self.skip_tear_down = false;
        info!(target: "prompt", "prompt_started");
        self.set_up_or_restore()?;

        let mut watchers = Watchers::new(self.parser.clone(), signals);
        let result = self.event_loop(&mut watchers, resize_rx, exit_rx).await;
        watchers.stop().await;

        let torn = self.tear_down();
        let outcome = result?;
        torn?;
        info!(target: "prompt", ?outcome, "prompt_stopped");
        Ok(outcome)
    }

    /// Read a single line and return it without calling the executor.
    /// Empty when input ended instead (Ctrl-D, exit checker, closed input).
    pub fn input(&mut self) -> Result<String, PromptError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(self.input_async())
    }

    pub async fn input_async(&mut self) -> Result<String, PromptError> {
        self.skip_tear_down = false;
        self.set_up_or_restore()?;

        let mut watchers = Watchers::new(self.parser.clone(), None);
        let result = self.input_loop(&mut watchers).await;
        watchers.stop().await;

        let torn = self.tear_down();
        let line = result?;
        torn?;
        Ok(line)
    }

    /// Record `cmd` in the history from outside a run. Only allowed when
    /// automatic history is disabled.
    pub fn push_to_history(&mut self, cmd: &str) -> Result<(), PromptError> {
        push_history(&mut self.history, self.auto_history, cmd)
    }

    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    pub fn clear_screen(&mut self) -> Result<(), PromptError> {
        self.renderer.clear_screen()?;
        self.cursor = Location::default();
        self.end_cursor = Location::default();
        Ok(())
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buf
    }

    pub fn writer(&self) -> &W {
        self.renderer.writer()
    }

    pub fn win_size(&self) -> WinSize {
        self.renderer.win_size()
    }

    async fn event_loop(
        &mut self,
        watchers: &mut Watchers,
        mut resize_rx: Receiver<WinSize>,
        mut exit_rx: Receiver<i32>,
    ) -> Result<RunOutcome, PromptError> {
        if self.completion.show_at_start() {
            self.completion.update(&self.buf.document());
        }
        self.render(RenderEvent::Basic)?;
        let mut input_rx = watchers.start(None)?;

        loop {
            let event = tokio::select! {
                chunk = input_rx.recv() => LoopEvent::Input(chunk),
                Some(size) = resize_rx.recv() => LoopEvent::Resize(size),
                Some(code) = exit_rx.recv() => LoopEvent::Exit(code),
            };

            match event {
                LoopEvent::Input(None) => {
                    warn!(target: "prompt", "input_closed");
                    self.render(RenderEvent::BreakLine)?;
                    return Ok(RunOutcome::Finished);
                }
                LoopEvent::Input(Some(chunk)) => {
                    let fed = self.feed(&chunk)?;
                    self.on_input_update();

                    if fed.exit {
                        self.render(RenderEvent::BreakLine)?;
                        return Ok(RunOutcome::Finished);
                    }
                    let Some(line) = fed.exec else {
                        self.render(RenderEvent::Basic)?;
                        continue;
                    };

                    watchers.stop().await;
                    self.parser.tear_down()?;

                    debug!(target: "prompt.exec", len = line.len(), "execute");
                    let mut ctx = ExecContext {
                        history: &mut self.history,
                        auto_history: self.auto_history,
                    };
                    (self.executor)(&line, &mut ctx);
                    self.render(RenderEvent::Basic)?;

                    if self.should_exit(&line, true) {
                        debug!(target: "prompt.exec", "exit_after_execute");
                        self.skip_tear_down = true;
                        return Ok(RunOutcome::Finished);
                    }

                    self.parser.setup()?;
                    input_rx = watchers.start(Some(&mut input_rx))?;
                }
                LoopEvent::Resize(size) => {
                    self.on_input_update();
                    self.renderer.update_win_size(size);
                    self.render(RenderEvent::Resize)?;
                }
                LoopEvent::Exit(code) => {
                    info!(target: "prompt", code, "exit_signal");
                    self.on_input_update();
                    self.render(RenderEvent::BreakLine)?;
                    return Ok(RunOutcome::Signal(code));
                }
            }
        }
    }

    async fn input_loop(&mut self, watchers: &mut Watchers) -> Result<String, PromptError> {
        if self.completion.show_at_start() {
            self.completion.update(&self.buf.document());
        }
        self.render(RenderEvent::Basic)?;
        let mut input_rx = watchers.start(None)?;

        loop {
            let Some(chunk) = input_rx.recv().await else {
                warn!(target: "prompt", "input_closed");
                self.render(RenderEvent::BreakLine)?;
                return Ok(String::new());
            };
            let fed = self.feed(&chunk)?;
            if fed.exit {
                self.render(RenderEvent::BreakLine)?;
                return Ok(String::new());
            }
            if let Some(line) = fed.exec {
                return Ok(line);
            }
            self.on_input_update();
            self.render(RenderEvent::Basic)?;
        }
    }

    /// Apply one raw chunk to the editing state.
    fn feed(&mut self, bytes: &[u8]) -> Result<Fed, PromptError> {
        let key = decode(bytes);
        trace!(target: "prompt", key = key.name(), len = bytes.len(), "key");
        if key != Key::NotDefined {
            self.utf8_carry.discard();
        }
        self.buf.set_last_key_stroke(key);

        let completing = self.completion.completing();
        self.handle_completion_key_binding(key, completing);

        let mut fed = Fed::default();
        match key {
            Key::Enter | Key::ControlJ | Key::ControlM => {
                let mut line = self.buf.text().to_string();
                if let Some(search) = &self.reverse_search {
                    search.matched_cmd().clone_into(&mut line);
                    self.disable_reverse_search();
                    self.render(RenderEvent::Basic)?;
                }
                self.render(RenderEvent::BreakLine)?;
                self.buf = Buffer::new();
                if !line.is_empty() && self.auto_history {
                    self.history.add(line.as_str());
                }
                fed.exec = Some(line);
            }
            Key::ControlC => {
                self.disable_reverse_search();
                self.render(RenderEvent::BreakLine)?;
                self.buf = Buffer::new();
                self.history.clear();
            }
            Key::Up | Key::ControlP => {
                if self.reverse_search.is_some() {
                    self.disable_reverse_search();
                } else if !completing {
                    if let Some(buf) = self.history.older(&self.buf) {
                        self.buf = buf;
                    }
                }
            }
            Key::Down | Key::ControlN => {
                if self.reverse_search.is_some() {
                    self.disable_reverse_search();
                } else if !completing {
                    if let Some(buf) = self.history.newer(&self.buf) {
                        self.buf = buf;
                    }
                }
            }
            Key::Left | Key::Right => self.disable_reverse_search(),
            Key::ControlD => {
                if self.buf.text().is_empty() {
                    fed.exit = true;
                    return Ok(fed);
                }
            }
            Key::ControlR => match self.reverse_search.as_mut() {
                Some(search) => search.reduce_prefix(),
                None => self.enable_reverse_search(),
            },
            Key::NotDefined => {
                if let Some(result) = apply_ascii_bindings(&self.ascii_bindings, bytes, &mut self.buf) {
                    self.apply_dispatch(result)?;
                    return Ok(fed);
                }
                let text = self.utf8_carry.decode(bytes);
                self.buf.insert_text(&text, false, true);
            }
            _ => {}
        }

        fed.exit = self.handle_key_binding(key)?;
        Ok(fed)
    }

    fn handle_completion_key_binding(&mut self, key: Key, completing: bool) {
        match key {
            Key::Down => {
                if completing || self.completion_on_down {
                    self.completion.next();
                }
            }
            Key::Tab | Key::ControlI => self.completion.next(),
            Key::Up => {
                if completing {
                    self.completion.previous();
                }
            }
            Key::BackTab => self.completion.previous(),
            _ => {
                if let Some(text) = self.completion.selected_suggestion().map(|s| s.text.clone()) {
                    let doc = self.buf.document();
                    let word = doc.get_word_before_cursor_until_separator(self.completion.word_separator());
                    let n = word.chars().count();
                    if n > 0 {
                        self.buf.delete_before_cursor(n);
                    }
                    self.buf.insert_text(&text, false, true);
                    trace!(target: "prompt", replaced = n, "suggestion_accepted");
                }
                self.completion.reset();
            }
        }
    }

    /// Built-in tables, then user bindings; returns the exit checker's verdict.
    fn handle_key_binding(&mut self, key: Key) -> Result<bool, PromptError> {
        let result = apply_key_bindings(&self.builtin_bindings, key, &mut self.buf)
            .merge(apply_key_bindings(&self.key_bindings, key, &mut self.buf));
        self.apply_dispatch(result)?;
        Ok(self.should_exit(self.buf.text(), false))
    }

    fn apply_dispatch(&mut self, result: DispatchResult) -> Result<(), PromptError> {
        if result.clear_screen {
            self.clear_screen()?;
        }
        Ok(())
    }

    fn should_exit(&self, text: &str, committed: bool) -> bool {
        self.exit_checker.as_ref().is_some_and(|check| check(text, committed))
    }

    fn on_input_update(&mut self) {
        self.buf = self.buf.replace_tabs(TAB_WIDTH);
        if let Some(search) = self.reverse_search.as_mut() {
            search.update(&self.history, self.buf.text());
            return;
        }
        self.history.set_current_cmd(self.buf.text());
        self.completion.update(&self.buf.document());
    }

    fn current_prefix(&self) -> String {
        if let Some(search) = &self.reverse_search {
            return search.prefix(self.buf.text());
        }
        if let Some(prefix) = self.live_prefix.as_ref().and_then(|live| live()) {
            return prefix;
        }
        self.prefix.clone()
    }

    /// Prefix followed by the input, or by the current match while searching.
    fn cmd_to_render(&self) -> (Buffer, String) {
        let prefix = self.current_prefix();
        let mut cmd = Buffer::new();
        cmd.insert_text(&prefix, false, true);
        match &self.reverse_search {
            Some(search) => cmd.insert_text(search.matched_cmd(), false, true),
            None => {
                cmd.insert_text(self.buf.text(), false, true);
                cmd.set_cursor_position(prefix.chars().count() + self.buf.cursor_position());
            }
        }
        (cmd, prefix)
    }

    fn render(&mut self, event: RenderEvent) -> Result<(), PromptError> {
        let (cmd, prefix) = self.cmd_to_render();
        let ctx = RenderCtx {
            cmd: &cmd,
            prefix: &prefix,
            cursor: self.cursor,
            end_cursor: self.end_cursor,
            completion: &self.completion,
            render_completion: self.reverse_search.is_none() && !self.buf.text().contains('\n'),
            event,
        };
        let (cursor, end_cursor) = self.renderer.render(&ctx)?;
        self.cursor = cursor;
        self.end_cursor = end_cursor;
        Ok(())
    }

    fn enable_reverse_search(&mut self) {
        if !self.reverse_search_enabled || self.reverse_search.is_some() {
            return;
        }
        debug!(target: "prompt", "reverse_search_enabled");
        self.buf = Buffer::new();
        self.reverse_search = Some(ReverseSearch::new(&self.history));
    }

    /// Leave search mode, moving the history selection and the buffer to the
    /// last match.
    fn disable_reverse_search(&mut self) {
        let Some(search) = self.reverse_search.take() else {
            return;
        };
        debug!(target: "prompt", matched = ?search.matched_index(), "reverse_search_disabled");
        self.history.clear();
        self.buf = Buffer::new();
        if let Some(index) = search.matched_index() {
            self.history.select(index);
            self.history.set_current_cmd(search.matched_cmd());
            self.buf.insert_text(search.matched_cmd(), false, true);
        }
    }

    fn set_up(&mut self) -> Result<(), PromptError> {
        self.parser.setup()?;
        self.renderer.setup(&self.title)?;
        match self.parser.get_win_size() {
            Ok(size) => self.renderer.update_win_size(size),
            Err(err) => warn!(target: "prompt", error = %err, "win_size_failed"),
        }
        Ok(())
    }

    /// Set up, restoring the terminal if a later step fails.
    fn set_up_or_restore(&mut self) -> Result<(), PromptError> {
        if let Err(err) = self.set_up() {
            if let Err(restore) = self.parser.tear_down() {
                warn!(target: "prompt", error = %restore, "restore_failed");
            }
            return Err(err);
        }
        Ok(())
    }

    fn tear_down(&mut self) -> Result<(), PromptError> {
        if !self.skip_tear_down {
            self.parser.tear_down()?;
        }
        self.renderer.tear_down()?;
        Ok(())
    }
}
