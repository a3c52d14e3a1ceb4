//! Editable text plus cursor.
//!
//! A `Buffer` is created per input line and replaced wholesale when history
//! navigation or a commit resets it. Every query goes through a freshly
//! derived [`Document`], so the buffer itself only stores the text, the
//! cursor, the sticky column used by vertical motion, and the last key.
//!
//! `split_wide_lines` and `replace_tabs` never mutate `self`; they return a
//! new buffer for presentation or normalisation.

use core_events::Key;

use crate::document::Document;
use crate::width::{char_len, char_width};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    text: String,
    cursor_position: usize,
    preferred_column: Option<usize>,
    last_key_stroke: Option<Key>,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor_position: 0,
            preferred_column: None,
            last_key_stroke: None,
        }
    }

    /// Buffer holding `text` with the cursor at its end.
    pub fn from_text(text: &str) -> Self {
        let mut buf = Self::new();
        buf.insert_text(text, false, true);
        buf
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    pub fn preferred_column(&self) -> Option<usize> {
        self.preferred_column
    }

    pub fn last_key_stroke(&self) -> Option<Key> {
        self.last_key_stroke
    }

    pub fn set_last_key_stroke(&mut self, key: Key) {
        self.last_key_stroke = Some(key);
    }

    pub fn document(&self) -> Document {
        Document::new(self.text(), self.cursor_position).with_last_key(self.last_key_stroke)
    }

    pub fn display_cursor_position(&self) -> usize {
        self.document().display_cursor_position()
    }

    /// Move the cursor to an absolute scalar index, clamped to the text.
    pub fn set_cursor_position(&mut self, pos: usize) {
        self.cursor_position = pos.min(char_len(self.text()));
        self.preferred_column = None;
    }

    fn set_text(&mut self, text: String) {
        debug_assert!(self.cursor_position <= char_len(&text));
        self.text = text;
    }

    fn shift_cursor(&mut self, offset: isize) {
        let pos = self.cursor_position as isize + offset;
        self.cursor_position = pos.max(0) as usize;
    }

    /// Insert `s` at the cursor. With `overwrite` the following scalars are
    /// replaced instead of shifted, never reaching past the end of the row.
    pub fn insert_text(&mut self, s: &str, overwrite: bool, move_cursor: bool) {
        let chars: Vec<char> = self.text().chars().collect();
        let oc = self.cursor_position;
        let inserted = char_len(s);

        let mut text: String = chars[..oc].iter().collect();
        text.push_str(s);
        let tail = if overwrite {
            oc + chars[oc..]
                .iter()
                .take(inserted)
                .take_while(|&&c| c != '\n')
                .count()
        } else {
            oc
        };
        text.extend(&chars[tail..]);
        self.set_text(text);

        if move_cursor {
            self.cursor_position += inserted;
        }
        self.preferred_column = None;
    }

    pub fn cursor_left(&mut self, count: usize) {
        let offset = self.document().get_cursor_left_position(count as isize);
        self.shift_cursor(offset);
        self.preferred_column = None;
    }

    pub fn cursor_right(&mut self, count: usize) {
        let offset = self.document().get_cursor_right_position(count as isize);
        self.shift_cursor(offset);
        self.preferred_column = None;
    }

    /// Move up `count` rows keeping the sticky column.
    pub fn cursor_up(&mut self, count: usize) {
        let doc = self.document();
        let col = self
            .preferred_column
            .unwrap_or_else(|| doc.cursor_position_col());
        self.shift_cursor(doc.get_cursor_up_position(count, Some(col)));
        self.preferred_column = Some(col);
    }

    /// Move down `count` rows keeping the sticky column.
    pub fn cursor_down(&mut self, count: usize) {
        let doc = self.document();
        let col = self
            .preferred_column
            .unwrap_or_else(|| doc.cursor_position_col());
        self.shift_cursor(doc.get_cursor_down_position(count, Some(col)));
        self.preferred_column = Some(col);
    }

    /// Remove up to `count` scalars before the cursor and return them.
    pub fn delete_before_cursor(&mut self, count: usize) -> String {
        if self.cursor_position == 0 || count == 0 {
            return String::new();
        }
        let chars: Vec<char> = self.text().chars().collect();
        let end = self.cursor_position;
        let start = end.saturating_sub(count);
        let deleted: String = chars[start..end].iter().collect();
        let mut text: String = chars[..start].iter().collect();
        text.extend(&chars[end..]);
        self.cursor_position = start;
        self.set_text(text);
        self.preferred_column = None;
        deleted
    }

    /// Remove up to `count` scalars at the cursor without moving it.
    pub fn delete(&mut self, count: usize) -> String {
        let chars: Vec<char> = self.text().chars().collect();
        let start = self.cursor_position;
        if start >= chars.len() {
            return String::new();
        }
        let end = start.saturating_add(count).min(chars.len());
        let deleted: String = chars[start..end].iter().collect();
        let mut text: String = chars[..start].iter().collect();
        text.extend(&chars[end..]);
        self.set_text(text);
        self.preferred_column = None;
        deleted
    }

    /// Insert a line break, optionally repeating the current row's indentation.
    pub fn new_line(&mut self, copy_margin: bool) {
        let mut s = String::from("\n");
        if copy_margin {
            s.push_str(&self.document().leading_whitespace_in_current_line());
        }
        self.insert_text(&s, false, true);
    }

    /// Replace the break ending the cursor's row with `separator`. Leading
    /// spaces of the joined row are dropped. No-op on the last row.
    pub fn join_next_line(&mut self, separator: &str) {
        if self.document().on_last_line() {
            return;
        }
        let eol = self.document().get_end_of_line_position();
        self.cursor_position += eol;
        self.delete(1);
        let doc = self.document();
        let text = format!(
            "{}{}{}",
            doc.text_before_cursor(),
            separator,
            doc.text_after_cursor().trim_start_matches(' ')
        );
        self.set_text(text);
    }

    /// Transpose the two scalars before the cursor.
    pub fn swap_characters_before_cursor(&mut self) {
        let pos = self.cursor_position;
        if pos < 2 {
            return;
        }
        let mut chars: Vec<char> = self.text().chars().collect();
        chars.swap(pos - 2, pos - 1);
        self.set_text(chars.into_iter().collect());
    }

    fn derived(&self, text: String, cursor_position: usize) -> Buffer {
        Buffer {
            text,
            cursor_position,
            preferred_column: None,
            last_key_stroke: self.last_key_stroke,
        }
    }

    /// Hard-wrap every row at `max_width` display columns.
    ///
    /// A break is inserted before any scalar that would push its row past the
    /// limit; a glyph wider than the limit still gets a row of its own. The
    /// cursor moves past every break inserted at or before it. A width of 0
    /// returns an unchanged copy.
    pub fn split_wide_lines(&self, max_width: usize) -> Buffer {
        if max_width == 0 {
            return self.derived(self.text().to_string(), self.cursor_position);
        }
        let src = self.text();
        let mut out = String::with_capacity(src.len() + src.len() / max_width.max(1));
        let mut cursor = self.cursor_position;
        let mut line_width = 0usize;
        for (i, c) in src.chars().enumerate() {
            if c == '\n' {
                out.push('\n');
                line_width = 0;
                continue;
            }
            let w = char_width(c);
            if line_width > 0 && line_width + w > max_width {
                out.push('\n');
                line_width = 0;
                if i <= self.cursor_position {
                    cursor += 1;
                }
            }
            out.push(c);
            line_width += w;
        }
        self.derived(out, cursor)
    }

    /// Expand every tab to spaces up to the next multiple of `tab_width`
    /// display columns. A width of 0 removes tabs.
    pub fn replace_tabs(&self, tab_width: usize) -> Buffer {
        let src = self.text();
        let mut out = String::with_capacity(src.len());
        let mut cursor = self.cursor_position;
        let mut col = 0usize;
        for (i, c) in src.chars().enumerate() {
            match c {
                '\n' => {
                    out.push('\n');
                    col = 0;
                }
                '\t' => {
                    let spaces = if tab_width == 0 {
                        0
                    } else {
                        tab_width - col % tab_width
                    };
                    out.extend(std::iter::repeat_n(' ', spaces));
                    col += spaces;
                    if i < self.cursor_position {
                        cursor = cursor + spaces - 1;
                    }
                }
                _ => {
                    out.push(c);
                    col += char_width(c);
                }
            }
        }
        self.derived(out, cursor)
    }
}
