//! Completion candidates with selection and scroll state.
//!
//! `selected == None` means no candidate is highlighted. The visible window
//! is `vertical_scroll..vertical_scroll + max` and `next`/`previous` keep the
//! selection inside it.

use core_text::Document;
use tracing::trace;

/// Default number of visible suggestion rows.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 6;

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Suggest {
    pub text: String,
    pub description: String,
}

impl Suggest {
    pub fn new(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: description.into(),
        }
    }
}

/// Candidate provider.
pub type Completer = Box<dyn Fn(&Document) -> Vec<Suggest>>;

pub struct CompletionManager {
    selected: Option<usize>,
    suggestions: Vec<Suggest>,
    max: usize,
    vertical_scroll: usize,
    word_separator: String,
    show_at_start: bool,
    completer: Completer,
}

impl std::fmt::Debug for CompletionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionManager")
            .field("selected", &self.selected)
            .field("suggestions", &self.suggestions.len())
            .field("max", &self.max)
            .field("vertical_scroll", &self.vertical_scroll)
            .finish_non_exhaustive()
    }
}

impl Default for CompletionManager {
    fn default() -> Self {
        Self::new(Box::new(|_| Vec::new()), DEFAULT_MAX_SUGGESTIONS)
    }
}

impl CompletionManager {
    pub fn new(completer: Completer, max: usize) -> Self {
        Self {
            selected: None,
            suggestions: Vec::new(),
            max,
            vertical_scroll: 0,
            word_separator: String::new(),
            show_at_start: false,
            completer,
        }
    }

    pub fn set_completer(&mut self, completer: Completer) {
        self.completer = completer;
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn set_max(&mut self, max: usize) {
        self.max = max;
    }

    pub fn word_separator(&self) -> &str {
        &self.word_separator
    }

    pub fn set_word_separator(&mut self, sep: impl Into<String>) {
        self.word_separator = sep.into();
    }

    pub fn show_at_start(&self) -> bool {
        self.show_at_start
    }

    pub fn set_show_at_start(&mut self, show: bool) {
        self.show_at_start = show;
    }

    pub fn suggestions(&self) -> &[Suggest] {
        &self.suggestions
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn vertical_scroll(&self) -> usize {
        self.vertical_scroll
    }

    pub fn selected_suggestion(&self) -> Option<&Suggest> {
        self.selected.and_then(|i| self.suggestions.get(i))
    }

    pub fn completing(&self) -> bool {
        self.selected.is_some()
    }

    /// Ask the completer for fresh candidates.
    pub fn update(&mut self, doc: &Document) {
        self.suggestions = (self.completer)(doc);
        trace!(
            target: "state.completion",
            candidates = self.suggestions.len(),
            "update"
        );
    }

    /// Drop the selection and scroll, then refill from an empty document.
    pub fn reset(&mut self) {
        self.selected = None;
        self.vertical_scroll = 0;
        self.update(&Document::default());
    }

    /// Highlight the next candidate. Moving past the last one resets.
    pub fn next(&mut self) {
        let next = match self.selected {
            Some(s) => {
                if self.vertical_scroll + self.max == s + 1 {
                    self.vertical_scroll += 1;
                }
                s + 1
            }
            None => 0,
        };
        if next >= self.suggestions.len() {
            self.reset();
        } else {
            self.selected = Some(next);
        }
    }

    /// Highlight the previous candidate. Moving before "nothing selected"
    /// wraps to the last candidate with the window at the bottom.
    pub fn previous(&mut self) {
        match self.selected {
            Some(s) => {
                if self.vertical_scroll == s && s > 0 {
                    self.vertical_scroll -= 1;
                }
                self.selected = s.checked_sub(1);
            }
            None => {
                let len = self.suggestions.len();
                if len == 0 {
                    self.reset();
                    return;
                }
                self.selected = Some(len - 1);
                self.vertical_scroll = len - self.max.min(len);
            }
        }
    }
}
