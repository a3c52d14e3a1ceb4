//! Frame drawing.
//!
//! Moves are always relative to where the previous frame left the cursor and
//! are issued as up/backward deltas. A frame ends with the cursor at or
//! before the end of the text it wrote, so the deltas are normally positive.

use anyhow::Result;
use core_events::WinSize;
use core_state::CompletionManager;
use core_terminal::ConsoleWriter;
use core_text::width::str_width;
use core_text::{Buffer, Document};
use crossterm::style::Color;
use tracing::trace;

use crate::format::format_suggestions;
use crate::style::RenderStyle;
use crate::{Location, RenderCtx, RenderEvent};

/// Called with the committed document after every break-line frame.
pub type BreakLineCallback = Box<dyn FnMut(&Document)>;

fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Rows the scrollbar thumb occupies: `(top, height)`.
fn scrollbar(window_height: usize, total: usize, scroll: usize) -> (usize, usize) {
    if window_height == 0 || total == 0 {
        return (0, 0);
    }
    let height = (window_height * window_height / total).clamp(1, window_height);
    let top = window_height * scroll / total;
    (top, height)
}

/// Byte index where the prefix ends inside the wrapped command text.
///
/// Wrapping may have inserted line breaks inside the prefix; those are
/// skipped rather than counted.
fn prefix_split(text: &str, prefix: &str) -> usize {
    let mut want = prefix.chars().peekable();
    for (i, c) in text.char_indices() {
        match want.peek() {
            None => return i,
            Some(&p) if p == c => {
                want.next();
            }
            Some(_) if c == '\n' => {}
            Some(_) => return i,
        }
    }
    text.len()
}

pub struct Renderer<W: ConsoleWriter> {
    out: W,
    style: RenderStyle,
    break_line_callback: Option<BreakLineCallback>,
    rows: u16,
    cols: u16,
}

impl<W: ConsoleWriter> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            style: RenderStyle::default(),
            break_line_callback: None,
            rows: 0,
            cols: 0,
        }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: RenderStyle) {
        self.style = style;
    }

    pub fn set_break_line_callback(&mut self, cb: BreakLineCallback) {
        self.break_line_callback = Some(cb);
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn win_size(&self) -> WinSize {
        WinSize::new(self.rows, self.cols)
    }

    pub fn setup(&mut self, title: &str) -> Result<()> {
        if !title.is_empty() {
            self.out.set_title(title);
            self.out.flush()?;
        }
        Ok(())
    }

    pub fn tear_down(&mut self) -> Result<()> {
        self.out.clear_title();
        self.out.erase_down();
        self.out.flush()
    }

    pub fn update_win_size(&mut self, ws: WinSize) {
        trace!(target: "render", rows = ws.rows, cols = ws.cols, "win_size");
        self.rows = ws.rows;
        self.cols = ws.cols;
    }

    pub fn clear_screen(&mut self) -> Result<()> {
        self.out.erase_screen();
        self.out.cursor_goto(0, 0);
        self.out.flush()
    }

    /// Draw one frame and return the new `(cursor, end_cursor)`.
    ///
    /// Basic and resize frames are skipped while the column count is still
    /// unknown (0).
    pub fn render(&mut self, ctx: &RenderCtx<'_>) -> Result<(Location, Location)> {
        if ctx.event == RenderEvent::BreakLine {
            return self.render_break_line(ctx);
        }
        if self.cols == 0 {
            return Ok((Location::default(), Location::default()));
        }

        self.out.hide_cursor();
        let (mut cursor, end) = self.render_ctx(ctx, ctx.cmd);

        if ctx.render_completion {
            self.render_completion(ctx.cmd, ctx.prefix, ctx.completion);
            if let Some(suggest) = ctx.completion.selected_suggestion() {
                let doc = ctx.cmd.document();
                let word =
                    doc.get_word_before_cursor_until_separator(ctx.completion.word_separator());
                cursor.col = self.backward(cursor.col, to_i32(str_width(word)));

                self.out.set_color(
                    self.style.preview_suggestion_text,
                    self.style.preview_suggestion_bg,
                    false,
                );
                self.out.write_str(&suggest.text);
                self.out.set_color(Color::Reset, Color::Reset, false);
                cursor.col += to_i32(str_width(&suggest.text));

                let rest = doc.text_after_cursor();
                self.out.write_str(rest);
                cursor.col += to_i32(str_width(rest));
                self.line_wrap(cursor.col);
                cursor.col = self.backward(cursor.col, to_i32(str_width(rest)));
            }
        }

        self.out.show_cursor();
        self.out.flush()?;
        Ok((cursor, end))
    }

    fn render_break_line(&mut self, ctx: &RenderCtx<'_>) -> Result<(Location, Location)> {
        let committed = ctx.cmd.document();
        if self.cols > 0 {
            self.out.hide_cursor();
            let mut finished = String::with_capacity(ctx.cmd.text().len() + 1);
            finished.push_str(ctx.cmd.text());
            finished.push('\n');
            self.render_ctx(ctx, &Buffer::from_text(&finished));
            self.out.show_cursor();
            self.out.flush()?;
        }
        trace!(target: "render", rows = committed.line_count(), "break_line");
        if let Some(cb) = self.break_line_callback.as_mut() {
            cb(&committed);
        }
        Ok((Location::default(), Location::default()))
    }

    fn render_ctx(&mut self, ctx: &RenderCtx<'_>, cmd: &Buffer) -> (Location, Location) {
        let cmd = cmd.split_wide_lines(usize::from(self.cols));
        let doc = cmd.document();
        let (cursor_row, cursor_col) = doc.get_cursor_position();
        let (end_row, end_col) = doc.get_custom_cursor_position(doc.len_chars());
        let cursor = Location::new(to_i32(cursor_row), to_i32(cursor_col));
        let end = Location::new(to_i32(end_row), to_i32(end_col));

        let prev_cursor = self.linear(ctx.cursor);
        let prev_end = self.linear(ctx.end_cursor);
        if ctx.event == RenderEvent::Resize {
            self.clear(prev_cursor, true);
        } else {
            self.move_to(prev_cursor, prev_end);
            self.clear(prev_end, false);
        }

        self.write_cmd_with_prefix(cmd.text(), ctx.prefix);
        self.line_wrap(end.col);
        self.move_to(self.linear(end), self.linear(cursor));
        (cursor, end)
    }

    fn write_cmd_with_prefix(&mut self, text: &str, prefix: &str) {
        let (head, tail) = text.split_at(prefix_split(text, prefix));
        self.out
            .set_color(self.style.prefix_text, self.style.prefix_bg, false);
        self.out.write_str(head);
        self.out
            .set_color(self.style.input_text, self.style.input_bg, false);
        self.out.write_str(tail);
    }

    fn render_completion(&mut self, cmd: &Buffer, prefix: &str, completion: &CompletionManager) {
        let suggestions = completion.suggestions();
        if suggestions.is_empty() {
            return;
        }
        let cols = i32::from(self.cols);
        // One column is kept for the scrollbar.
        let available = usize::from(self.cols).saturating_sub(str_width(prefix) + 1);
        let (formatted, width) = format_suggestions(suggestions, available);
        if formatted.is_empty() {
            return;
        }
        let width = to_i32(width + 1);

        let window_height = formatted.len().min(completion.max());
        if window_height == 0 {
            return;
        }
        let scroll = completion.vertical_scroll().min(formatted.len() - window_height);
        let visible = &formatted[scroll..scroll + window_height];
        let (thumb_top, thumb_height) = scrollbar(window_height, suggestions.len(), scroll);
        let selected = completion.selected().and_then(|s| s.checked_sub(scroll));
        trace!(
            target: "render.completion",
            rows = window_height,
            scroll,
            selected = ?completion.selected(),
            "popup"
        );

        self.prepare_area(window_height);

        let mut cursor = to_i32(str_width(cmd.document().text_before_cursor()));
        let (x, _) = self.to_pos(cursor);
        let overflow = x + width - cols;
        if overflow >= 0 {
            cursor = self.backward(cursor, overflow);
        }

        for (i, row) in visible.iter().enumerate() {
            self.out.cursor_down(1);
            let is_selected = selected == Some(i);
            if is_selected {
                self.out.set_color(
                    self.style.selected_suggestion_text,
                    self.style.selected_suggestion_bg,
                    true,
                );
            } else {
                self.out.set_color(
                    self.style.suggestion_text,
                    self.style.suggestion_bg,
                    false,
                );
            }
            self.out.write_str(&row.text);

            if is_selected {
                self.out.set_color(
                    self.style.selected_description_text,
                    self.style.selected_description_bg,
                    false,
                );
            } else {
                self.out.set_color(
                    self.style.description_text,
                    self.style.description_bg,
                    false,
                );
            }
            self.out.write_str(&row.description);

            let bar = if thumb_top <= i && i < thumb_top + thumb_height {
                self.style.scrollbar_thumb
            } else {
                self.style.scrollbar_bg
            };
            self.out.set_color(Color::Reset, bar, false);
            self.out.write_str(" ");
            self.out.set_color(Color::Reset, Color::Reset, false);

            self.line_wrap(cursor + width);
            self.backward(cursor + width, width);
        }

        if overflow >= 0 {
            self.out.cursor_forward(overflow);
        }
        self.out.cursor_up(to_i32(window_height));
        self.out.set_color(Color::Reset, Color::Reset, false);
    }

    /// Scroll the terminal so `lines` rows below the prompt exist, keeping
    /// the cursor where it was.
    fn prepare_area(&mut self, lines: usize) {
        for _ in 0..lines {
            self.out.scroll_down();
        }
        for _ in 0..lines {
            self.out.scroll_up();
        }
    }

    /// Erase the previous frame. `cursor` is where the terminal cursor is.
    ///
    /// Soft clears walk back up line by line; hard clears jump to the origin
    /// and erase everything below it.
    fn clear(&mut self, cursor: i32, hard: bool) {
        self.out.erase_down();
        if hard {
            self.move_to(cursor, 0);
            self.out.erase_down();
            return;
        }
        let (x, y) = self.to_pos(cursor);
        self.out.cursor_backward(x);
        for _ in 0..y {
            self.out.erase_end_of_line();
            self.out.cursor_up(1);
        }
        self.out.erase_end_of_line();
    }

    fn backward(&mut self, from: i32, n: i32) -> i32 {
        self.move_to(from, from - n)
    }

    fn move_to(&mut self, from: i32, to: i32) -> i32 {
        let (from_x, from_y) = self.to_pos(from);
        let (to_x, to_y) = self.to_pos(to);
        self.out.cursor_up(from_y - to_y);
        self.out.cursor_backward(from_x - to_x);
        to
    }

    fn linear(&self, loc: Location) -> i32 {
        loc.row * i32::from(self.cols) + loc.col
    }

    fn to_pos(&self, cursor: i32) -> (i32, i32) {
        let cols = i32::from(self.cols.max(1));
        (cursor % cols, cursor / cols)
    }

    /// Text that ends exactly on the last column leaves the terminal in a
    /// pending-wrap state; force the wrap so the next move is unambiguous.
    fn line_wrap(&mut self, cursor: i32) {
        if cfg!(windows) {
            return;
        }
        if cursor > 0 && cursor % i32::from(self.cols.max(1)) == 0 {
            self.out.write_raw(b"\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::Suggest;
    use core_terminal::Vt100Writer;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    type TestRenderer = Renderer<Vt100Writer<Vec<u8>>>;

    fn renderer(cols: u16) -> TestRenderer {
        let mut r = Renderer::new(Vt100Writer::new(Vec::new()));
        r.update_win_size(WinSize::new(24, cols));
        r
    }

    fn output(r: &TestRenderer) -> String {
        String::from_utf8(r.writer().get_ref().clone()).unwrap()
    }

    fn prompt_buffer(prefix: &str, text: &str, cursor: usize) -> Buffer {
        let mut b = Buffer::from_text(&format!("{prefix}{text}"));
        b.set_cursor_position(prefix.chars().count() + cursor);
        b
    }

    fn ctx<'a>(cmd: &'a Buffer, prefix: &'a str, completion: &'a CompletionManager) -> RenderCtx<'a> {
        RenderCtx {
            cmd,
            prefix,
            cursor: Location::default(),
            end_cursor: Location::default(),
            completion,
            render_completion: false,
            event: RenderEvent::Basic,
        }
    }

    #[test]
    fn break_line_callback_fires_every_commit() {
        let mut r = renderer(1);
        let cmd = Buffer::new();
        let completion = CompletionManager::default();
        r.render(&RenderCtx {
            event: RenderEvent::BreakLine,
            ..ctx(&cmd, "", &completion)
        })
        .unwrap();

        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        r.set_break_line_callback(Box::new(move |_: &Document| seen.set(seen.get() + 1)));
        for _ in 0..3 {
            let out = r
                .render(&RenderCtx {
                    event: RenderEvent::BreakLine,
                    ..ctx(&cmd, "", &completion)
                })
                .unwrap();
            assert_eq!(out, (Location::default(), Location::default()));
        }
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn break_line_passes_document_before_the_break() {
        let mut r = renderer(80);
        let cmd = prompt_buffer("> ", "ls -la", 2);
        let completion = CompletionManager::default();
        let seen = Rc::new(Cell::new(None));
        let sink = seen.clone();
        r.set_break_line_callback(Box::new(move |doc: &Document| {
            sink.set(Some((doc.text().to_string(), doc.cursor_position())));
        }));
        r.render(&RenderCtx {
            event: RenderEvent::BreakLine,
            ..ctx(&cmd, "> ", &completion)
        })
        .unwrap();
        assert_eq!(seen.take(), Some(("> ls -la".to_string(), 4)));
        assert!(output(&r).contains("ls -la\n"));
    }

    #[test]
    fn zero_columns_skip_basic_frames() {
        let mut r = renderer(0);
        let cmd = prompt_buffer("> ", "abc", 3);
        let completion = CompletionManager::default();
        let out = r.render(&ctx(&cmd, "> ", &completion)).unwrap();
        assert_eq!(out, (Location::default(), Location::default()));
        assert_eq!(r.writer().pending(), 0);
        assert!(r.writer().get_ref().is_empty());
    }

    #[test]
    fn zero_columns_still_fire_break_line_callback() {
        let mut r = renderer(0);
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        r.set_break_line_callback(Box::new(move |_: &Document| seen.set(seen.get() + 1)));
        let cmd = Buffer::from_text("x");
        let completion = CompletionManager::default();
        r.render(&RenderCtx {
            event: RenderEvent::BreakLine,
            ..ctx(&cmd, "", &completion)
        })
        .unwrap();
        assert_eq!(calls.get(), 1);
        assert!(r.writer().get_ref().is_empty());
    }

    #[test]
    fn prefix_is_written_in_its_own_color() {
        let mut r = renderer(80);
        r.write_cmd_with_prefix("prefix> command1\ncommand2\n¥¥¼", "prefix>");
        r.writer_mut().flush().unwrap();
        let out = output(&r);
        let (before, after) = out.split_once("prefix>").unwrap();
        assert!(before.starts_with("\x1b[0m"));
        assert!(after.starts_with("\x1b[0m"));
        assert!(after.ends_with(" command1\ncommand2\n¥¥¼"));
    }

    #[test]
    fn prefix_split_skips_wrap_breaks() {
        assert_eq!(prefix_split("abc\ndef", "abcde"), 6);
        assert_eq!(prefix_split("> ls", "> "), 2);
        assert_eq!(prefix_split("ls", ""), 0);
        assert_eq!(prefix_split("> ", "> "), 2);
    }

    #[test]
    fn basic_frame_returns_to_logical_cursor() {
        let mut r = renderer(80);
        let cmd = prompt_buffer("> ", "abc", 1);
        let completion = CompletionManager::default();
        let (cursor, end) = r.render(&ctx(&cmd, "> ", &completion)).unwrap();
        assert_eq!(cursor, Location::new(0, 3));
        assert_eq!(end, Location::new(0, 5));
        let out = output(&r);
        assert!(out.starts_with("\x1b[?25l\x1b[J\x1b[K"), "{out:?}");
        assert!(out.ends_with("abc\x1b[2D\x1b[?25h"), "{out:?}");
    }

    #[cfg(not(windows))]
    #[test]
    fn text_filling_last_column_forces_wrap() {
        let mut r = renderer(5);
        let cmd = prompt_buffer("> ", "abc", 3);
        let completion = CompletionManager::default();
        let (cursor, end) = r.render(&ctx(&cmd, "> ", &completion)).unwrap();
        assert_eq!(end, Location::new(0, 5));
        assert_eq!(cursor, end);
        assert!(output(&r).contains("abc\n"));
    }

    #[test]
    fn soft_clear_walks_up_previous_rows() {
        let mut r = renderer(10);
        let cmd = Buffer::from_text("x");
        let completion = CompletionManager::default();
        r.render(&RenderCtx {
            cursor: Location::new(2, 3),
            end_cursor: Location::new(2, 3),
            ..ctx(&cmd, "", &completion)
        })
        .unwrap();
        assert!(
            output(&r).contains("\x1b[J\x1b[3D\x1b[K\x1b[1A\x1b[K\x1b[1A\x1b[K"),
            "{:?}",
            output(&r)
        );
    }

    #[test]
    fn soft_clear_first_moves_to_previous_end() {
        let mut r = renderer(10);
        let cmd = Buffer::from_text("x");
        let completion = CompletionManager::default();
        r.render(&RenderCtx {
            cursor: Location::new(0, 1),
            end_cursor: Location::new(1, 4),
            ..ctx(&cmd, "", &completion)
        })
        .unwrap();
        // From (0,1) to (1,4): both deltas are negative, so they come out
        // as down/forward moves.
        assert!(output(&r).starts_with("\x1b[?25l\x1b[1B\x1b[3C\x1b[J\x1b[4D"));
    }

    #[test]
    fn resize_frames_clear_hard() {
        let mut r = renderer(10);
        let cmd = Buffer::from_text("x");
        let completion = CompletionManager::default();
        r.render(&RenderCtx {
            cursor: Location::new(1, 4),
            end_cursor: Location::new(1, 9),
            event: RenderEvent::Resize,
            ..ctx(&cmd, "", &completion)
        })
        .unwrap();
        assert!(output(&r).starts_with("\x1b[?25l\x1b[J\x1b[1A\x1b[4D\x1b[J"));
    }

    #[test]
    fn scrollbar_geometry() {
        assert_eq!(scrollbar(2, 3, 0), (0, 1));
        assert_eq!(scrollbar(6, 12, 6), (3, 3));
        assert_eq!(scrollbar(6, 6, 0), (0, 6));
        assert_eq!(scrollbar(3, 100, 97), (2, 1));
        assert_eq!(scrollbar(0, 5, 0), (0, 0));
    }

    fn completer_of(words: &'static [&'static str]) -> CompletionManager {
        let mut c = CompletionManager::new(
            Box::new(move |_| words.iter().map(|w| Suggest::new(*w, "")).collect()),
            2,
        );
        c.update(&Document::default());
        c
    }

    #[test]
    fn completion_popup_makes_room_and_returns() {
        let mut r = renderer(40);
        let cmd = prompt_buffer("> ", "s", 1);
        let completion = completer_of(&["select", "show", "set"]);
        r.render(&RenderCtx {
            render_completion: true,
            ..ctx(&cmd, "> ", &completion)
        })
        .unwrap();
        let out = output(&r);
        assert!(out.contains("\x1bD\x1bD\x1bM\x1bM"), "{out:?}");
        assert!(out.contains(" select "));
        assert!(out.contains(" show   "));
        assert!(!out.contains(" set    "), "third row is scrolled out");
        assert_eq!(out.matches("\x1b[1B").count(), 2);
        assert!(out.contains("\x1b[2A"));
        assert!(out.ends_with("\x1b[?25h"));
    }

    #[test]
    fn completion_is_skipped_without_flag() {
        let mut r = renderer(40);
        let cmd = prompt_buffer("> ", "s", 1);
        let completion = completer_of(&["select"]);
        r.render(&ctx(&cmd, "> ", &completion)).unwrap();
        assert!(!output(&r).contains("select"));
    }

    #[test]
    fn selected_suggestion_is_previewed_inline() {
        let mut r = renderer(40);
        let cmd = prompt_buffer("> ", "se", 2);
        let mut completion = completer_of(&["select", "set"]);
        completion.next();
        let (cursor, _) = r
            .render(&RenderCtx {
                render_completion: true,
                ..ctx(&cmd, "> ", &completion)
            })
            .unwrap();
        // "se" is replaced on screen by the preview "select".
        assert_eq!(cursor.col, 8);
        let out = output(&r);
        let (_, after_popup) = out.rsplit_once("\x1b[2A").unwrap();
        assert!(after_popup.contains("\x1b[2D"), "{after_popup:?}");
        assert!(after_popup.contains("select"), "{after_popup:?}");
    }
}
