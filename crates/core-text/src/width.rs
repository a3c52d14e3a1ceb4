//! Display width and scalar-value index helpers.
//!
//! Every cursor in this crate counts Unicode scalar values, never bytes.
//! Terminal placement counts display columns: wide East Asian glyphs take two
//! columns, control characters and combining marks take none, everything else
//! takes one. All width decisions flow through [`char_width`] so the renderer
//! and the text model never disagree about where a glyph lands.

use unicode_width::UnicodeWidthChar;

/// Column cost of a single scalar value.
#[inline]
pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Column cost of a string.
pub fn str_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Number of scalar values in `s`.
#[inline]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the scalar at `char_idx`, or `s.len()` when past the end.
pub fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}

/// Slice of `s` covering the scalar range `[start, end)`. Both bounds clamp to the string.
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let end = end.max(start);
    let b_start = byte_offset(s, start);
    let b_end = byte_offset(s, end);
    &s[b_start..b_end]
}

/// Cut `s` to at most `max` columns, replacing the removed tail with `tail`.
///
/// Returns `s` unchanged when it already fits. The result can be narrower than
/// `max` when a wide glyph straddles the boundary; see [`fill_right`].
pub fn truncate(s: &str, max: usize, tail: &str) -> String {
    if str_width(s) <= max {
        return s.to_string();
    }
    let budget = max.saturating_sub(str_width(tail));
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = char_width(c);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(tail);
    out
}

/// Pad `s` with spaces on the right up to `width` columns.
pub fn fill_right(s: &str, width: usize) -> String {
    let w = str_width(s);
    let mut out = String::with_capacity(s.len() + width.saturating_sub(w));
    out.push_str(s);
    for _ in w..width {
        out.push(' ');
    }
    out
}
