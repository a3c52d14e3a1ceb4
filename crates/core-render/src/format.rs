//! Fixed-width suggestion cells for the completion popup.

use core_state::Suggest;
use core_text::width::{fill_right, str_width, truncate};

const SHORTEN_SUFFIX: &str = "...";
const LEFT_PREFIX: &str = " ";
const LEFT_SUFFIX: &str = " ";
const RIGHT_PREFIX: &str = " ";
const RIGHT_SUFFIX: &str = " ";

/// Pad every entry to the widest one and wrap it in `prefix`/`suffix`.
///
/// Entries that do not fit in `max` columns are cut with `...`. Returns the
/// cells and their common width, or empty cells and 0 when every entry is
/// empty or `max` cannot hold even the decorations.
pub fn format_texts(texts: &[&str], max: usize, prefix: &str, suffix: &str) -> (Vec<String>, usize) {
    let prefix_width = str_width(prefix);
    let suffix_width = str_width(suffix);
    let min = prefix_width + suffix_width + str_width(SHORTEN_SUFFIX);

    let mut width = texts.iter().map(|t| str_width(t)).max().unwrap_or(0);
    if width == 0 || min >= max {
        return (vec![String::new(); texts.len()], 0);
    }
    if prefix_width + width + suffix_width > max {
        width = max - prefix_width - suffix_width;
    }

    let cells = texts
        .iter()
        .map(|t| {
            let body = if str_width(t) <= width {
                fill_right(t, width)
            } else {
                // A cut wide glyph can leave the result a column short.
                fill_right(&truncate(t, width, SHORTEN_SUFFIX), width)
            };
            format!("{prefix}{body}{suffix}")
        })
        .collect();
    (cells, prefix_width + width + suffix_width)
}

/// Format texts and descriptions into two aligned columns fitting `max`.
///
/// Descriptions get whatever room the text column leaves. An empty result
/// means the popup cannot be drawn.
pub fn format_suggestions(suggests: &[Suggest], max: usize) -> (Vec<Suggest>, usize) {
    let texts: Vec<String> = suggests.iter().map(|s| strip_line_breaks(&s.text)).collect();
    let texts: Vec<&str> = texts.iter().map(String::as_str).collect();
    let (left, left_width) = format_texts(&texts, max, LEFT_PREFIX, LEFT_SUFFIX);
    if left_width == 0 {
        return (Vec::new(), 0);
    }
    let descriptions: Vec<String> = suggests
        .iter()
        .map(|s| strip_line_breaks(&s.description))
        .collect();
    let descriptions: Vec<&str> = descriptions.iter().map(String::as_str).collect();
    let (right, right_width) = format_texts(
        &descriptions,
        max - left_width,
        RIGHT_PREFIX,
        RIGHT_SUFFIX,
    );

    let formatted = left
        .into_iter()
        .zip(right)
        .map(|(text, description)| Suggest { text, description })
        .collect();
    (formatted, left_width + right_width)
}

/// Popup rows are single lines.
fn strip_line_breaks(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}
