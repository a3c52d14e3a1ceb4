//! Color palette used by the renderer.
//!
//! Every slot can be set by name so configuration files can override the
//! palette piecemeal.

use crossterm::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    pub prefix_text: Color,
    pub prefix_bg: Color,
    pub input_text: Color,
    pub input_bg: Color,
    pub preview_suggestion_text: Color,
    pub preview_suggestion_bg: Color,
    pub suggestion_text: Color,
    pub suggestion_bg: Color,
    pub selected_suggestion_text: Color,
    pub selected_suggestion_bg: Color,
    pub description_text: Color,
    pub description_bg: Color,
    pub selected_description_text: Color,
    pub selected_description_bg: Color,
    pub scrollbar_thumb: Color,
    pub scrollbar_bg: Color,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            prefix_text: Color::Blue,
            prefix_bg: Color::Reset,
            input_text: Color::Reset,
            input_bg: Color::Reset,
            preview_suggestion_text: Color::Green,
            preview_suggestion_bg: Color::Reset,
            suggestion_text: Color::White,
            suggestion_bg: Color::DarkCyan,
            selected_suggestion_text: Color::Black,
            selected_suggestion_bg: Color::Cyan,
            description_text: Color::Black,
            description_bg: Color::Cyan,
            selected_description_text: Color::White,
            selected_description_bg: Color::DarkCyan,
            scrollbar_thumb: Color::DarkGrey,
            scrollbar_bg: Color::DarkCyan,
        }
    }
}

impl RenderStyle {
    /// Slot names accepted by [`RenderStyle::set`].
    pub const SLOTS: [&'static str; 16] = [
        "prefix_text",
        "prefix_bg",
        "input_text",
        "input_bg",
        "preview_suggestion_text",
        "preview_suggestion_bg",
        "suggestion_text",
        "suggestion_bg",
        "selected_suggestion_text",
        "selected_suggestion_bg",
        "description_text",
        "description_bg",
        "selected_description_text",
        "selected_description_bg",
        "scrollbar_thumb",
        "scrollbar_bg",
    ];

    fn slot_mut(&mut self, slot: &str) -> Option<&mut Color> {
        let c = match slot {
            "prefix_text" => &mut self.prefix_text,
            "prefix_bg" => &mut self.prefix_bg,
            "input_text" => &mut self.input_text,
            "input_bg" => &mut self.input_bg,
            "preview_suggestion_text" => &mut self.preview_suggestion_text,
            "preview_suggestion_bg" => &mut self.preview_suggestion_bg,
            "suggestion_text" => &mut self.suggestion_text,
            "suggestion_bg" => &mut self.suggestion_bg,
            "selected_suggestion_text" => &mut self.selected_suggestion_text,
            "selected_suggestion_bg" => &mut self.selected_suggestion_bg,
            "description_text" => &mut self.description_text,
            "description_bg" => &mut self.description_bg,
            "selected_description_text" => &mut self.selected_description_text,
            "selected_description_bg" => &mut self.selected_description_bg,
            "scrollbar_thumb" => &mut self.scrollbar_thumb,
            "scrollbar_bg" => &mut self.scrollbar_bg,
            _ => return None,
        };
        Some(c)
    }

    /// Set one slot by name. Returns false for an unknown slot.
    pub fn set(&mut self, slot: &str, color: Color) -> bool {
        match self.slot_mut(slot) {
            Some(c) => {
                *c = color;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_slot_is_settable() {
        let mut style = RenderStyle::default();
        for slot in RenderStyle::SLOTS {
            assert!(style.set(slot, Color::Magenta), "{slot}");
        }
        assert_eq!(style.prefix_text, Color::Magenta);
        assert_eq!(style.scrollbar_bg, Color::Magenta);
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let mut style = RenderStyle::default();
        assert!(!style.set("cursor", Color::Red));
        assert_eq!(style, RenderStyle::default());
    }
}
