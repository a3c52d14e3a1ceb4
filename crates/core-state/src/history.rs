//! Command history with a scratch overlay.
//!
//! Invariants:
//! * `tmp.len() == histories.len() + 1` after every operation.
//! * `tmp[tmp.len() - 1]` is the live scratch slot for the line being typed.
//! * `selected` indexes `tmp` and is reset to the scratch slot by `add`/`clear`.
//!
//! `tmp` mirrors `histories` so a user can edit an older entry while
//! browsing without altering the committed log; `clear` discards those edits.

use core_text::Buffer;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct History {
    histories: Vec<String>,
    tmp: Vec<String>,
    selected: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            histories: Vec::new(),
            tmp: vec![String::new()],
            selected: 0,
        }
    }

    /// History seeded with committed entries, oldest first.
    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut h = Self::new();
        h.histories = entries.into_iter().map(Into::into).collect();
        h.clear();
        h
    }

    pub fn entries(&self) -> &[String] {
        &self.histories
    }

    pub fn tmp(&self) -> &[String] {
        &self.tmp
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Point the selection at `index` (clamped to `tmp`).
    pub fn select(&mut self, index: usize) {
        self.selected = index.min(self.tmp.len() - 1);
    }

    /// Entry of `tmp` at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.tmp.get(index).map(String::as_str)
    }

    pub fn add(&mut self, cmd: impl Into<String>) {
        self.histories.push(cmd.into());
        trace!(target: "state.history", entries = self.histories.len(), "add");
        self.clear();
    }

    /// Drop in-progress edits and select the scratch slot.
    pub fn clear(&mut self) {
        self.tmp = self.histories.clone();
        self.tmp.push(String::new());
        self.selected = self.tmp.len() - 1;
    }

    pub fn set_current_cmd(&mut self, cmd: &str) {
        if let Some(slot) = self.tmp.get_mut(self.selected) {
            cmd.clone_into(slot);
        }
    }

    /// Step to the previous entry, writing `buf` back into the slot being
    /// left. Returns `None` at the oldest entry.
    pub fn older(&mut self, buf: &Buffer) -> Option<Buffer> {
        if self.tmp.len() == 1 || self.selected == 0 {
            return None;
        }
        self.set_current_cmd(buf.text());
        self.selected -= 1;
        trace!(target: "state.history", selected = self.selected, "older");
        Some(Buffer::from_text(&self.tmp[self.selected]))
    }

    /// Step to the next entry, writing `buf` back into the slot being left.
    /// Returns `None` at the scratch slot.
    pub fn newer(&mut self, buf: &Buffer) -> Option<Buffer> {
        if self.selected + 1 >= self.tmp.len() {
            return None;
        }
        self.set_current_cmd(buf.text());
        self.selected += 1;
        trace!(target: "state.history", selected = self.selected, "newer");
        Some(Buffer::from_text(&self.tmp[self.selected]))
    }

    /// Largest index `<= from_index` whose entry contains `query`.
    ///
    /// Scans strictly backward; an empty query matches at `from_index`.
    /// `from_index` past the end starts from the last slot.
    pub fn find_match(&self, query: &str, from_index: usize) -> Option<usize> {
        let from = from_index.min(self.tmp.len() - 1);
        (0..=from).rev().find(|&i| self.tmp[i].contains(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clear_resets_scratch() {
        let mut h = History::new();
        h.add("foo");
        h.clear();
        assert_eq!(h.entries(), ["foo".to_string()]);
        assert_eq!(h.tmp(), ["foo".to_string(), String::new()]);
        assert_eq!(h.selected(), 1);
    }

    #[test]
    fn add_appends_and_resets_selection() {
        let mut h = History::new();
        h.add("echo 1");
        assert_eq!(h.entries(), ["echo 1".to_string()]);
        assert_eq!(h.tmp().len(), 2);
        assert_eq!(h.selected(), 1);
    }

    #[test]
    fn older_and_newer_walk_entries() {
        let mut h = History::with_entries(["echo 1", "echo 2"]);
        let buf = Buffer::from_text("typing");

        let b = h.older(&buf).expect("older entry");
        assert_eq!(b.text(), "echo 2");
        assert_eq!(b.cursor_position(), 6);
        assert_eq!(h.tmp()[2], "typing");

        let b = h.older(&b).expect("oldest entry");
        assert_eq!(b.text(), "echo 1");
        assert!(h.older(&b).is_none());

        let b = h.newer(&b).expect("newer entry");
        assert_eq!(b.text(), "echo 2");
        let b = h.newer(&b).expect("scratch slot");
        assert_eq!(b.text(), "typing");
        assert!(h.newer(&b).is_none());
    }

    #[test]
    fn older_on_empty_history_is_noop() {
        let mut h = History::new();
        assert!(h.older(&Buffer::from_text("x")).is_none());
        assert!(h.newer(&Buffer::from_text("x")).is_none());
        assert_eq!(h.tmp(), [String::new()]);
    }

    #[test]
    fn edits_to_older_entries_survive_until_clear() {
        let mut h = History::with_entries(["one"]);
        let older = h.older(&Buffer::new()).expect("entry");
        let mut edited = older.clone();
        edited.insert_text("!", false, true);
        let _ = h.newer(&edited).expect("scratch");
        assert_eq!(h.tmp()[0], "one!");
        assert_eq!(h.entries()[0], "one");
        h.clear();
        assert_eq!(h.tmp()[0], "one");
    }

    fn scenario() -> History {
        let mut h = History::new();
        for cmd in ["line 0", "cmd1", "cmd2", "", "x"] {
            h.add(cmd);
        }
        h.set_current_cmd("echo");
        h
    }

    #[test]
    fn find_match_scans_backward() {
        let h = scenario();
        assert_eq!(h.find_match("", 5), Some(5));
        assert_eq!(h.find_match("c", 5), Some(5));
        assert_eq!(h.find_match("cmd", 2), Some(2));
        assert_eq!(h.find_match("cmd1", 2), Some(1));
        assert_eq!(h.find_match("line", 5), Some(0));
        assert_eq!(h.find_match("line 10", 5), None);
        assert_eq!(h.find_match("x", 100), Some(4));
    }
}
