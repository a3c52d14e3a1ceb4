//! Read-only query surface over a `(text, cursor)` pair.
//!
//! Contracts:
//! * `cursor_position` counts scalar values from the start of `text` and is
//!   clamped to `0..=len_chars()` at construction.
//! * Rows split on `\n` only. A trailing `\n` produces a trailing empty row.
//! * Columns returned by the `*_position` navigation helpers are scalar
//!   offsets; [`Document::get_cursor_position`] and
//!   [`Document::get_custom_cursor_position`] report display columns.
//! * Relative helpers (`get_cursor_*_position`, `find_end_of_current_word*`)
//!   return offsets from the cursor; `find_start_of_previous_word*` return
//!   absolute indexes into the text.
//!
//! Word helpers take a separator set. An empty set means Unicode whitespace,
//! so each default variant equals its `*_until_separator("")` counterpart.

use core_events::Key;

use crate::width::{char_len, char_slice, str_width};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
    cursor_position: usize,
    last_key: Option<Key>,
}

#[inline]
fn is_separator(c: char, sep: &str) -> bool {
    if sep.is_empty() {
        c.is_whitespace()
    } else {
        sep.contains(c)
    }
}

impl Document {
    pub fn new(text: impl Into<String>, cursor_position: usize) -> Self {
        let text = text.into();
        let cursor_position = cursor_position.min(char_len(&text));
        Self {
            text,
            cursor_position,
            last_key: None,
        }
    }

    /// Attach the key that produced this snapshot (used by completers).
    pub fn with_last_key(mut self, key: Option<Key>) -> Self {
        self.last_key = key;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    pub fn last_key_stroke(&self) -> Option<Key> {
        self.last_key
    }

    /// Text length in scalar values.
    pub fn len_chars(&self) -> usize {
        char_len(&self.text)
    }

    pub fn text_before_cursor(&self) -> &str {
        char_slice(&self.text, 0, self.cursor_position)
    }

    pub fn text_after_cursor(&self) -> &str {
        char_slice(&self.text, self.cursor_position, usize::MAX)
    }

    /// Scalar at `cursor_position + offset - 1`, so offset 0 is the scalar
    /// just before the cursor and offset 1 the one under it.
    pub fn get_char_relative_to_cursor(&self, offset: isize) -> Option<char> {
        let idx = self.cursor_position as isize + offset - 1;
        if idx < 0 {
            return None;
        }
        self.text.chars().nth(idx as usize)
    }

    pub fn current_line_before_cursor(&self) -> &str {
        let before = self.text_before_cursor();
        match before.rfind('\n') {
            Some(i) => &before[i + 1..],
            None => before,
        }
    }

    pub fn current_line_after_cursor(&self) -> &str {
        let after = self.text_after_cursor();
        match after.find('\n') {
            Some(i) => &after[..i],
            None => after,
        }
    }

    pub fn current_line(&self) -> String {
        let mut line = self.current_line_before_cursor().to_string();
        line.push_str(self.current_line_after_cursor());
        line
    }

    /// Zero based row: count of `\n` before the cursor.
    pub fn cursor_position_row(&self) -> usize {
        self.text_before_cursor().matches('\n').count()
    }

    /// Scalar offset of the cursor within its row.
    pub fn cursor_position_col(&self) -> usize {
        char_len(self.current_line_before_cursor())
    }

    /// Display column of the cursor within its row (wide glyphs count 2).
    pub fn display_cursor_position(&self) -> usize {
        str_width(self.current_line_before_cursor())
    }

    /// `(row, display column)` of the document cursor.
    pub fn get_cursor_position(&self) -> (usize, usize) {
        (
            self.cursor_position_row(),
            self.display_cursor_position(),
        )
    }

    /// `(row, display column)` an arbitrary scalar index would occupy.
    pub fn get_custom_cursor_position(&self, pos: usize) -> (usize, usize) {
        let pos = pos.min(self.len_chars());
        let (row, col) = self.translate_index_to_position(pos);
        let line = self.lines().get(row).copied().unwrap_or("");
        (row, str_width(char_slice(line, 0, col)))
    }

    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }

    pub fn line_count(&self) -> usize {
        self.lines().len()
    }

    /// Scalar index at which each row starts.
    fn line_start_indexes(&self) -> Vec<usize> {
        let mut starts = vec![0];
        for (i, c) in self.text.chars().enumerate() {
            if c == '\n' {
                starts.push(i + 1);
            }
        }
        starts
    }

    /// Linear scalar index to `(row, scalar column)`.
    pub fn translate_index_to_position(&self, index: usize) -> (usize, usize) {
        let starts = self.line_start_indexes();
        let row = starts.partition_point(|&s| s <= index).saturating_sub(1);
        (row, index.saturating_sub(starts[row]))
    }

    /// `(row, col)` to a linear index. The row clamps to the last row and the
    /// column to the length of the target row.
    pub fn translate_row_col_to_index(&self, row: usize, col: usize) -> usize {
        let starts = self.line_start_indexes();
        let lines = self.lines();
        let row = row.min(starts.len() - 1);
        let line_len = lines.get(row).map(|l| char_len(l)).unwrap_or(0);
        (starts[row] + col.min(line_len)).min(self.len_chars())
    }

    /// Like [`Self::translate_row_col_to_index`], except that a row below the
    /// last one maps to the end of the text.
    pub fn translate_row_col_to_cursor(&self, row: usize, col: usize) -> usize {
        if row >= self.line_count() {
            return self.len_chars();
        }
        self.translate_row_col_to_index(row, col)
    }

    pub fn on_last_line(&self) -> bool {
        self.cursor_position_row() + 1 == self.line_count()
    }

    /// Scalars between the cursor and the end of its row.
    pub fn get_end_of_line_position(&self) -> usize {
        char_len(self.current_line_after_cursor())
    }

    pub fn leading_whitespace_in_current_line(&self) -> String {
        self.current_line()
            .chars()
            .take_while(|c| c.is_whitespace())
            .collect()
    }

    /// Relative offset for moving `count` scalars left without leaving the row.
    pub fn get_cursor_left_position(&self, count: isize) -> isize {
        if count < 0 {
            return self.get_cursor_right_position(-count);
        }
        -(self.cursor_position_col().min(count as usize) as isize)
    }

    /// Relative offset for moving `count` scalars right without leaving the row.
    pub fn get_cursor_right_position(&self, count: isize) -> isize {
        if count < 0 {
            return self.get_cursor_left_position(-count);
        }
        (count as usize).min(self.get_end_of_line_position()) as isize
    }

    /// Relative offset for moving `count` rows up. `preferred_column` of
    /// `None` keeps the current column.
    pub fn get_cursor_up_position(&self, count: usize, preferred_column: Option<usize>) -> isize {
        let col = preferred_column.unwrap_or_else(|| self.cursor_position_col());
        let row = self.cursor_position_row().saturating_sub(count);
        self.translate_row_col_to_index(row, col) as isize - self.cursor_position as isize
    }

    /// Relative offset for moving `count` rows down. Moving below the last
    /// row lands on the end of the text.
    pub fn get_cursor_down_position(
        &self,
        count: usize,
        preferred_column: Option<usize>,
    ) -> isize {
        let col = preferred_column.unwrap_or_else(|| self.cursor_position_col());
        let row = self.cursor_position_row() + count;
        self.translate_row_col_to_cursor(row, col) as isize - self.cursor_position as isize
    }

    // ---------------------------------------------------------------------------------------------
    // Word boundaries
    // ---------------------------------------------------------------------------------------------

    pub fn find_start_of_previous_word(&self) -> usize {
        self.find_start_of_previous_word_until_separator("")
    }

    pub fn find_start_of_previous_word_with_space(&self) -> usize {
        self.find_start_of_previous_word_until_separator_ignore_next_to_cursor("")
    }

    /// Absolute index just after the last separator before the cursor.
    pub fn find_start_of_previous_word_until_separator(&self, sep: &str) -> usize {
        let before: Vec<char> = self.text_before_cursor().chars().collect();
        match before.iter().rposition(|&c| is_separator(c, sep)) {
            Some(i) => i + 1,
            None => 0,
        }
    }

    /// Like [`Self::find_start_of_previous_word_until_separator`] but a run
    /// of separators touching the cursor belongs to the word.
    pub fn find_start_of_previous_word_until_separator_ignore_next_to_cursor(
        &self,
        sep: &str,
    ) -> usize {
        let before: Vec<char> = self.text_before_cursor().chars().collect();
        let Some(end) = before.iter().rposition(|&c| !is_separator(c, sep)) else {
            return 0;
        };
        match before[..end].iter().rposition(|&c| is_separator(c, sep)) {
            Some(i) => i + 1,
            None => 0,
        }
    }

    pub fn find_end_of_current_word(&self) -> usize {
        self.find_end_of_current_word_until_separator("")
    }

    pub fn find_end_of_current_word_with_space(&self) -> usize {
        self.find_end_of_current_word_until_separator_ignore_next_to_cursor("")
    }

    /// Offset from the cursor to the first separator after it.
    pub fn find_end_of_current_word_until_separator(&self, sep: &str) -> usize {
        let after: Vec<char> = self.text_after_cursor().chars().collect();
        after
            .iter()
            .position(|&c| is_separator(c, sep))
            .unwrap_or(after.len())
    }

    /// Like [`Self::find_end_of_current_word_until_separator`] but a run of
    /// separators touching the cursor belongs to the word.
    pub fn find_end_of_current_word_until_separator_ignore_next_to_cursor(
        &self,
        sep: &str,
    ) -> usize {
        let after: Vec<char> = self.text_after_cursor().chars().collect();
        let Some(start) = after.iter().position(|&c| !is_separator(c, sep)) else {
            return after.len();
        };
        match after[start..].iter().position(|&c| is_separator(c, sep)) {
            Some(end) => start + end,
            None => after.len(),
        }
    }

    pub fn get_word_before_cursor(&self) -> &str {
        self.get_word_before_cursor_until_separator("")
    }

    pub fn get_word_before_cursor_with_space(&self) -> &str {
        self.get_word_before_cursor_until_separator_ignore_next_to_cursor("")
    }

    pub fn get_word_before_cursor_until_separator(&self, sep: &str) -> &str {
        let start = self.find_start_of_previous_word_until_separator(sep);
        char_slice(self.text_before_cursor(), start, usize::MAX)
    }

    pub fn get_word_before_cursor_until_separator_ignore_next_to_cursor(&self, sep: &str) -> &str {
        let start = self.find_start_of_previous_word_until_separator_ignore_next_to_cursor(sep);
        char_slice(self.text_before_cursor(), start, usize::MAX)
    }

    pub fn get_word_after_cursor(&self) -> &str {
        self.get_word_after_cursor_until_separator("")
    }

    pub fn get_word_after_cursor_with_space(&self) -> &str {
        self.get_word_after_cursor_until_separator_ignore_next_to_cursor("")
    }

    pub fn get_word_after_cursor_until_separator(&self, sep: &str) -> &str {
        let end = self.find_end_of_current_word_until_separator(sep);
        char_slice(self.text_after_cursor(), 0, end)
    }

    pub fn get_word_after_cursor_until_separator_ignore_next_to_cursor(&self, sep: &str) -> &str {
        let end = self.find_end_of_current_word_until_separator_ignore_next_to_cursor(sep);
        char_slice(self.text_after_cursor(), 0, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(text: &str, cursor: usize) -> Document {
        Document::new(text, cursor)
    }

    #[test]
    fn cursor_clamps_on_construction() {
        assert_eq!(doc("abc", 10).cursor_position(), 3);
    }

    #[test]
    fn split_around_cursor() {
        let d = doc("line 1\nline 2\nline 3\nline 4\n", 17);
        assert_eq!(d.text_before_cursor(), "line 1\nline 2\nlin");
        assert_eq!(d.text_after_cursor(), "e 3\nline 4\n");
        assert_eq!(d.current_line_before_cursor(), "lin");
        assert_eq!(d.current_line_after_cursor(), "e 3");
        assert_eq!(d.current_line(), "line 3");
        assert_eq!(d.cursor_position_row(), 2);
        assert_eq!(d.cursor_position_col(), 3);
    }

    #[test]
    fn display_cursor_position_counts_wide_glyphs() {
        assert_eq!(doc("Hello! my name is c-bata.", 5).display_cursor_position(), 5);
        assert_eq!(doc("こんにちは", 2).display_cursor_position(), 4);
        assert_eq!(doc("Добрый день", 3).display_cursor_position(), 3);
    }

    #[test]
    fn char_relative_to_cursor() {
        let d = doc("Добрый\nдень\nдобрый вечер", 9);
        assert_eq!(d.get_char_relative_to_cursor(1), Some('н'));
        assert_eq!(d.get_char_relative_to_cursor(0), Some('е'));
        assert_eq!(doc("abc", 0).get_char_relative_to_cursor(0), None);
        assert_eq!(doc("abc", 3).get_char_relative_to_cursor(1), None);
    }

    #[test]
    fn cursor_position_in_display_columns() {
        let d = doc("строка 1\nстрока 2", 17);
        assert_eq!(d.get_cursor_position(), (1, 8));
        let d = doc("line1\nline2\nlonglongline", 24);
        assert_eq!(d.get_cursor_position(), (2, 12));
        let d = doc("日本\n語", 2);
        assert_eq!(d.get_cursor_position(), (0, 4));
    }

    #[test]
    fn custom_cursor_position() {
        let d = doc("line1\nline2\nlonglongline", 0);
        assert_eq!(d.get_custom_cursor_position(12), (2, 0));
        assert_eq!(d.get_custom_cursor_position(23), (2, 11));
        let d = doc("строка1\nстрока2\nстрока3", 0);
        assert_eq!(d.get_custom_cursor_position(9), (1, 1));
        assert_eq!(d.get_custom_cursor_position(16), (2, 0));
        assert_eq!(d.get_custom_cursor_position(999), (2, 7));
    }

    #[test]
    fn lines_keep_trailing_empty_row() {
        let d = doc("a\nb\n", 0);
        assert_eq!(d.lines(), vec!["a", "b", ""]);
        assert_eq!(d.line_count(), 3);
        assert_eq!(doc("", 0).line_count(), 1);
    }

    #[test]
    fn translate_positions() {
        let d = doc("line 1\nline 2\nline 3", 0);
        assert_eq!(d.translate_index_to_position(0), (0, 0));
        assert_eq!(d.translate_index_to_position(7), (1, 0));
        assert_eq!(d.translate_index_to_position(9), (1, 2));
        assert_eq!(d.translate_index_to_position(20), (2, 6));
        assert_eq!(d.translate_row_col_to_index(1, 2), 9);
        assert_eq!(d.translate_row_col_to_index(1, 100), 13);
        assert_eq!(d.translate_row_col_to_index(100, 0), 14);
    }

    #[test]
    fn translate_row_col_to_cursor_past_last_row() {
        let d = doc("строка 1\nстрока 2\nстрока 3", 0);
        assert_eq!(d.translate_row_col_to_cursor(2, 3), 21);
        assert_eq!(d.translate_row_col_to_cursor(1, 0), 9);
        assert_eq!(d.translate_row_col_to_cursor(0, 4), 4);
        assert_eq!(d.translate_row_col_to_cursor(3, 0), 26);
    }

    #[test]
    fn last_line_and_end_of_line() {
        let d = doc("abc\ndef", 1);
        assert!(!d.on_last_line());
        assert_eq!(d.get_end_of_line_position(), 2);
        let d = doc("abc\ndef", 5);
        assert!(d.on_last_line());
        assert_eq!(d.get_end_of_line_position(), 2);
    }

    #[test]
    fn leading_whitespace() {
        assert_eq!(doc("  hello", 7).leading_whitespace_in_current_line(), "  ");
        assert_eq!(doc("a\n\t x", 5).leading_whitespace_in_current_line(), "\t ");
        assert_eq!(doc("none", 0).leading_whitespace_in_current_line(), "");
    }

    #[test]
    fn left_right_offsets_clamp_to_row() {
        let d = doc("line 1\nline 2\nline 3\nline 4\n", 17);
        assert_eq!(d.get_cursor_left_position(2), -2);
        assert_eq!(d.get_cursor_left_position(10), -3);
        assert_eq!(doc("", 0).get_cursor_left_position(5), 0);

        let d = doc("зеленый\nкрасный\nсиний", 8);
        assert_eq!(d.get_cursor_right_position(-1), 0);
        assert_eq!(d.get_cursor_right_position(3), 3);
        assert_eq!(d.get_cursor_right_position(8), 7);
        assert_eq!(d.get_cursor_left_position(-2), 2);
    }

    #[test]
    fn up_offsets() {
        let d = doc("line 1\nline 2\nline 3\nline 4\n", 17);
        assert_eq!(d.get_cursor_up_position(2, None), -14);
        assert_eq!(d.get_cursor_up_position(100, None), -14);
        assert_eq!(d.get_cursor_up_position(2, Some(0)), -17);

        let d = doc("зеленый\nкрасный\nсиний", 18);
        assert_eq!(d.get_cursor_up_position(1, None), -8);
        assert_eq!(d.get_cursor_up_position(1, Some(0)), -10);
        assert_eq!(d.get_cursor_up_position(2, Some(2)), -16);
        assert_eq!(d.get_cursor_up_position(3, Some(0)), -18);
    }

    #[test]
    fn down_offsets() {
        let d = doc("line 1\nline 2\nline 3\nline 4\n", 3);
        assert_eq!(d.get_cursor_down_position(2, None), 14);
        assert_eq!(d.get_cursor_down_position(100, None), 25);
        assert_eq!(d.get_cursor_down_position(3, Some(2)), 20);
        assert_eq!(d.get_cursor_down_position(2, Some(4)), 15);

        let d = doc("зеленый\nкрасный\nсиний", 2);
        assert_eq!(d.get_cursor_down_position(1, None), 8);
        assert_eq!(d.get_cursor_down_position(1, Some(0)), 6);
        assert_eq!(d.get_cursor_down_position(2, Some(2)), 16);
        assert_eq!(d.get_cursor_down_position(3, Some(0)), 19);
        assert_eq!(d.get_cursor_down_position(4, None), 19);
    }

    #[test]
    fn word_before_cursor() {
        let d = doc("apple bana", 10);
        assert_eq!(d.find_start_of_previous_word(), 6);
        assert_eq!(d.get_word_before_cursor(), "bana");

        let d = doc("apple ", 6);
        assert_eq!(d.find_start_of_previous_word(), 6);
        assert_eq!(d.get_word_before_cursor(), "");

        let d = doc("apply -f ./file/foo.json", 24);
        assert_eq!(d.get_word_before_cursor_until_separator(" /"), "foo.json");

        let d = doc("hello,i am c", 12);
        assert_eq!(d.get_word_before_cursor_until_separator(","), "i am c");
    }

    #[test]
    fn word_before_cursor_with_space() {
        let d = doc("apple bana ", 11);
        assert_eq!(d.find_start_of_previous_word_with_space(), 6);
        assert_eq!(d.get_word_before_cursor_with_space(), "bana ");

        let d = doc("apple ", 6);
        assert_eq!(d.find_start_of_previous_word_with_space(), 0);
        assert_eq!(d.get_word_before_cursor_with_space(), "apple ");

        let d = doc("hello,i am c-bata,", 18);
        assert_eq!(
            d.get_word_before_cursor_until_separator_ignore_next_to_cursor(","),
            "i am c-bata,"
        );
    }

    #[test]
    fn word_after_cursor() {
        let d = doc("apple bana", 5);
        assert_eq!(d.find_end_of_current_word(), 0);
        assert_eq!(d.get_word_after_cursor(), "");
        assert_eq!(d.find_end_of_current_word_with_space(), 5);
        assert_eq!(d.get_word_after_cursor_with_space(), " bana");

        let d = doc("hello,i am c-bata,", 5);
        assert_eq!(
            d.get_word_after_cursor_until_separator_ignore_next_to_cursor(","),
            ",i am c-bata"
        );

        let d = doc("path/to", 4);
        assert_eq!(
            d.get_word_after_cursor_until_separator_ignore_next_to_cursor(" /"),
            "/to"
        );

        let d = doc("りんご ばなな", 2);
        assert_eq!(d.find_end_of_current_word(), 1);
        assert_eq!(d.get_word_after_cursor(), "ご");
    }

    #[test]
    fn default_separator_matches_empty_separator() {
        let d = doc("alpha  beta\tgamma delta", 14);
        assert_eq!(
            d.find_start_of_previous_word(),
            d.find_start_of_previous_word_until_separator("")
        );
        assert_eq!(
            d.find_end_of_current_word_with_space(),
            d.find_end_of_current_word_until_separator_ignore_next_to_cursor("")
        );
        assert_eq!(d.get_word_before_cursor(), "ga");
    }

    #[test]
    fn last_key_is_carried() {
        let d = doc("x", 1).with_last_key(Some(Key::Tab));
        assert_eq!(d.last_key_stroke(), Some(Key::Tab));
    }
}
