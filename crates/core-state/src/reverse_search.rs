//! Incremental backward search over [`History`] (bash-style Ctrl-R).
//!
//! The state never owns the history it scans. Each call takes the history by
//! reference so the engine can keep mutating it between keystrokes.

use crate::history::History;
use tracing::trace;

/// Prompt prefix shown while the current query has a match.
pub const MATCH_PREFIX: &str = "(reverse-i-search)`";
/// Prompt prefix shown while the current query matches nothing.
pub const FAIL_PREFIX: &str = "(failed reverse-i-search)`";
const PREFIX_TAIL: &str = "':";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseSearch {
    search_from: usize,
    matched: Option<usize>,
    matched_cmd: String,
}

impl ReverseSearch {
    /// Start a search bounded by the history's current selection.
    pub fn new(history: &History) -> Self {
        Self {
            search_from: history.selected(),
            matched: None,
            matched_cmd: String::new(),
        }
    }

    pub fn search_from(&self) -> usize {
        self.search_from
    }

    pub fn matched_index(&self) -> Option<usize> {
        self.matched
    }

    /// Text of the current match, empty when nothing matched.
    pub fn matched_cmd(&self) -> &str {
        &self.matched_cmd
    }

    /// Narrow the next scan to entries strictly older than the current match.
    pub fn reduce_prefix(&mut self) {
        if let Some(idx) = self.matched {
            self.search_from = idx.saturating_sub(1);
        }
        trace!(target: "state.search", from = self.search_from, "reduce_prefix");
    }

    /// Re-run the scan for `input` (surrounding whitespace ignored).
    pub fn update(&mut self, history: &History, input: &str) {
        self.matched = history.find_match(input.trim(), self.search_from);
        self.matched_cmd = self
            .matched
            .and_then(|i| history.get(i))
            .unwrap_or_default()
            .to_string();
        trace!(
            target: "state.search",
            query_len = input.len(),
            matched = ?self.matched,
            "update"
        );
    }

    /// Prompt prefix describing the search for `query`.
    pub fn prefix(&self, query: &str) -> String {
        let head = if self.matched.is_some() {
            MATCH_PREFIX
        } else {
            FAIL_PREFIX
        };
        format!("{head}{query}{PREFIX_TAIL}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn history() -> History {
        let mut h = History::new();
        for cmd in ["aa", "ab", "ac", "ad", "ae"] {
            h.add(cmd);
        }
        h
    }

    #[test]
    fn search_walks_older_matches() {
        let h = history();
        let mut rs = ReverseSearch::new(&h);
        assert_eq!(rs.search_from(), h.tmp().len() - 1);
        assert_eq!(rs.matched_cmd(), "");
        assert_eq!(rs.matched_index(), None);

        rs.update(&h, "a");
        assert_eq!(rs.matched_cmd(), "ae");
        assert_eq!(rs.matched_index(), Some(4));
        assert_eq!(rs.search_from(), 5);

        rs.reduce_prefix();
        assert_eq!(rs.search_from(), 3);

        rs.update(&h, "a");
        assert_eq!(rs.matched_cmd(), "ad");
        assert_eq!(rs.matched_index(), Some(3));

        rs.update(&h, "aa");
        assert_eq!(rs.matched_cmd(), "aa");
        assert_eq!(rs.matched_index(), Some(0));

        for _ in 0..10 {
            rs.reduce_prefix();
        }
        assert_eq!(rs.search_from(), 0);
    }

    #[test]
    fn reduce_without_match_keeps_bound() {
        let h = history();
        let mut rs = ReverseSearch::new(&h);
        rs.update(&h, "zz");
        assert_eq!(rs.matched_index(), None);
        rs.reduce_prefix();
        assert_eq!(rs.search_from(), 5);
    }

    #[test]
    fn query_is_trimmed() {
        let h = history();
        let mut rs = ReverseSearch::new(&h);
        rs.update(&h, "  ac ");
        assert_eq!(rs.matched_cmd(), "ac");
    }

    #[test]
    fn prefix_reflects_match_state() {
        let h = history();
        let mut rs = ReverseSearch::new(&h);
        rs.update(&h, "ab");
        assert_eq!(rs.prefix("ab"), "(reverse-i-search)`ab':");
        rs.update(&h, "nope");
        assert_eq!(rs.prefix("nope"), "(failed reverse-i-search)`nope':");
    }
}
