//! Color names used in configuration files.

use crossterm::style::Color;

/// Map a color name onto a terminal color.
///
/// Names are case-insensitive and ignore `-`, `_` and spaces. Accepts the
/// sixteen ANSI names in both their crossterm spelling (`dark_cyan`) and
/// the classic prompt palette spelling (`turquoise`, `fuchsia`, `brown`),
/// `default`/`reset`, and `#rrggbb`.
pub fn parse_color(name: &str) -> Option<Color> {
    let key: String = name
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect();
    if let Some(hex) = key.strip_prefix('#') {
        return parse_hex(hex);
    }
    let c = match key.as_str() {
        "default" | "reset" => Color::Reset,
        "black" => Color::Black,
        "darkred" => Color::DarkRed,
        "darkgreen" => Color::DarkGreen,
        "brown" | "darkyellow" => Color::DarkYellow,
        "darkblue" => Color::DarkBlue,
        "purple" | "darkmagenta" => Color::DarkMagenta,
        "darkcyan" => Color::DarkCyan,
        "lightgray" | "lightgrey" | "gray" | "grey" => Color::Grey,
        "darkgray" | "darkgrey" => Color::DarkGrey,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "fuchsia" | "magenta" => Color::Magenta,
        "turquoise" | "cyan" => Color::Cyan,
        "white" => Color::White,
        _ => return None,
    };
    Some(c)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}
