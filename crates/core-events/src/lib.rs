//! Core event types shared by the input pipeline and the prompt loop.
//!
//! The reader and signal tasks never touch editing state. They only emit the
//! plain values defined here (raw byte chunks, [`WinSize`], exit codes) over
//! bounded channels consumed by the single prompt loop.

use std::fmt;
use std::sync::atomic::AtomicU64;

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// All channels are bounded. The input channel is sized so a burst of pasted chunks never parks the
// reader task in practice; resize and exit notifications are rare and need very little room.
// Producers use `send(..).await`, so a full channel applies backpressure rather than dropping data.
// -------------------------------------------------------------------------------------------------
pub const INPUT_CHANNEL_CAP: usize = 128;
pub const RESIZE_CHANNEL_CAP: usize = 8;
pub const EXIT_CHANNEL_CAP: usize = 1;

/// Largest raw chunk returned by a single terminal read.
pub const MAX_READ_BYTES: usize = 1024;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counters, inspected by tests and logged on shutdown.
// -------------------------------------------------------------------------------------------------
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static INPUT_CHUNKS: AtomicU64 = AtomicU64::new(0);
pub static INPUT_BYTES: AtomicU64 = AtomicU64::new(0);
pub static READER_STARTS: AtomicU64 = AtomicU64::new(0);
pub static READER_STOP_SIGNAL: AtomicU64 = AtomicU64::new(0);
pub static READER_STOP_CHANNEL: AtomicU64 = AtomicU64::new(0);
pub static READER_STOP_ERROR: AtomicU64 = AtomicU64::new(0);
pub static SIGNAL_TASK_STARTS: AtomicU64 = AtomicU64::new(0);
pub static SIGNAL_TASK_STOPS: AtomicU64 = AtomicU64::new(0);

/// Terminal dimensions as reported by the console parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WinSize {
    pub rows: u16,
    pub cols: u16,
}

impl WinSize {
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

/// Logical keys decoded from raw terminal input.
///
/// The set is closed: every raw chunk decodes to exactly one variant, with
/// `NotDefined` standing for printable text and unknown sequences. `Tab` and
/// `Enter` are the decoded forms of `0x09` and `0x0a`; `ControlI` and
/// `ControlJ` exist so bindings can name them, but the decoder never
/// produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,

    ControlA,
    ControlB,
    ControlC,
    ControlD,
    ControlE,
    ControlF,
    ControlG,
    ControlH,
    ControlI,
    ControlJ,
    ControlK,
    ControlL,
    ControlM,
    ControlN,
    ControlO,
    ControlP,
    ControlQ,
    ControlR,
    ControlS,
    ControlT,
    ControlU,
    ControlV,
    ControlW,
    ControlX,
    ControlY,
    ControlZ,

    ControlSpace,
    ControlBackslash,
    ControlSquareClose,
    ControlCircumflex,
    ControlUnderscore,
    ControlLeft,
    ControlRight,
    ControlUp,
    ControlDown,

    Up,
    Down,
    Right,
    Left,

    ShiftLeft,
    ShiftUp,
    ShiftDown,
    ShiftRight,

    Home,
    End,
    Delete,
    ShiftDelete,
    ControlDelete,
    PageUp,
    PageDown,
    BackTab,
    Insert,
    Backspace,

    Tab,
    Enter,

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,

    /// Sequences that are recognised but deliberately produce no action.
    Ignore,
    /// Anything not present in the decode table.
    NotDefined,
}

impl Key {
    /// Returns true for the keys that commit the current line.
    pub fn is_commit(self) -> bool {
        matches!(self, Key::Enter | Key::ControlJ | Key::ControlM)
    }

    /// Stable name used in logs. Never includes raw input.
    pub fn name(self) -> &'static str {
        match self {
            Key::Escape => "escape",
            Key::ControlA => "c-a",
            Key::ControlB => "c-b",
            Key::ControlC => "c-c",
            Key::ControlD => "c-d",
            Key::ControlE => "c-e",
            Key::ControlF => "c-f",
            Key::ControlG => "c-g",
            Key::ControlH => "c-h",
            Key::ControlI => "c-i",
            Key::ControlJ => "c-j",
            Key::ControlK => "c-k",
            Key::ControlL => "c-l",
            Key::ControlM => "c-m",
            Key::ControlN => "c-n",
            Key::ControlO => "c-o",
            Key::ControlP => "c-p",
            Key::ControlQ => "c-q",
            Key::ControlR => "c-r",
            Key::ControlS => "c-s",
            Key::ControlT => "c-t",
            Key::ControlU => "c-u",
            Key::ControlV => "c-v",
            Key::ControlW => "c-w",
            Key::ControlX => "c-x",
            Key::ControlY => "c-y",
            Key::ControlZ => "c-z",
            Key::ControlSpace => "c-space",
            Key::ControlBackslash => "c-backslash",
            Key::ControlSquareClose => "c-]",
            Key::ControlCircumflex => "c-^",
            Key::ControlUnderscore => "c-_",
            Key::ControlLeft => "c-left",
            Key::ControlRight => "c-right",
            Key::ControlUp => "c-up",
            Key::ControlDown => "c-down",
            Key::Up => "up",
            Key::Down => "down",
            Key::Right => "right",
            Key::Left => "left",
            Key::ShiftLeft => "s-left",
            Key::ShiftUp => "s-up",
            Key::ShiftDown => "s-down",
            Key::ShiftRight => "s-right",
            Key::Home => "home",
            Key::End => "end",
            Key::Delete => "delete",
            Key::ShiftDelete => "s-delete",
            Key::ControlDelete => "c-delete",
            Key::PageUp => "pageup",
            Key::PageDown => "pagedown",
            Key::BackTab => "backtab",
            Key::Insert => "insert",
            Key::Backspace => "backspace",
            Key::Tab => "tab",
            Key::Enter => "enter",
            Key::F1 => "f1",
            Key::F2 => "f2",
            Key::F3 => "f3",
            Key::F4 => "f4",
            Key::F5 => "f5",
            Key::F6 => "f6",
            Key::F7 => "f7",
            Key::F8 => "f8",
            Key::F9 => "f9",
            Key::F10 => "f10",
            Key::F11 => "f11",
            Key::F12 => "f12",
            Key::F13 => "f13",
            Key::F14 => "f14",
            Key::F15 => "f15",
            Key::F16 => "f16",
            Key::F17 => "f17",
            Key::F18 => "f18",
            Key::F19 => "f19",
            Key::F20 => "f20",
            Key::F21 => "f21",
            Key::F22 => "f22",
            Key::F23 => "f23",
            Key::F24 => "f24",
            Key::Ignore => "ignore",
            Key::NotDefined => "not-defined",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_display_uses_log_name() {
        assert_eq!(format!("{}", Key::ControlR), "c-r");
        assert_eq!(Key::NotDefined.to_string(), "not-defined");
    }

    #[test]
    fn commit_keys() {
        assert!(Key::Enter.is_commit());
        assert!(Key::ControlJ.is_commit());
        assert!(Key::ControlM.is_commit());
        assert!(!Key::Tab.is_commit());
        assert!(!Key::ControlD.is_commit());
    }

    #[test]
    fn win_size_default_is_degenerate() {
        let ws = WinSize::default();
        assert_eq!(ws.cols, 0);
        assert_eq!(WinSize::new(24, 80).cols, 80);
    }
}
