//! core-keymap: raw terminal byte sequences to logical [`Key`]s.
//!
//! Decoding is an exact match of a whole read chunk against a static table of
//! ASCII control codes and VT100 / xterm / Linux console / rxvt escape
//! sequences, compiled once into a byte trie. A chunk that is not a complete
//! table entry (printable text, a paste, an unknown escape) decodes to
//! [`Key::NotDefined`] and is handled by the caller as literal input.
//!
//! Logging only records the chunk length and the decoded key name. Raw bytes
//! are never logged.

use std::sync::LazyLock;

use core_events::Key;
use smallvec::SmallVec;
use tracing::trace;

// -------------------------------------------------------------------------------------------------
// Sequence Table
// -------------------------------------------------------------------------------------------------
/// Every recognised sequence. Later entries win when a sequence repeats.
pub const ASCII_SEQUENCES: &[(&[u8], Key)] = &[
    (b"\x1b", Key::Escape),
    (b"\x00", Key::ControlSpace),
    (b"\x01", Key::ControlA),
    (b"\x02", Key::ControlB),
    (b"\x03", Key::ControlC),
    (b"\x04", Key::ControlD),
    (b"\x05", Key::ControlE),
    (b"\x06", Key::ControlF),
    (b"\x07", Key::ControlG),
    (b"\x08", Key::ControlH),
    (b"\x09", Key::Tab),
    (b"\x0a", Key::Enter),
    (b"\x0b", Key::ControlK),
    (b"\x0c", Key::ControlL),
    (b"\x0d", Key::ControlM),
    (b"\x0e", Key::ControlN),
    (b"\x0f", Key::ControlO),
    (b"\x10", Key::ControlP),
    (b"\x11", Key::ControlQ),
    (b"\x12", Key::ControlR),
    (b"\x13", Key::ControlS),
    (b"\x14", Key::ControlT),
    (b"\x15", Key::ControlU),
    (b"\x16", Key::ControlV),
    (b"\x17", Key::ControlW),
    (b"\x18", Key::ControlX),
    (b"\x19", Key::ControlY),
    (b"\x1a", Key::ControlZ),
    (b"\x1c", Key::ControlBackslash),
    (b"\x1d", Key::ControlSquareClose),
    (b"\x1e", Key::ControlCircumflex),
    (b"\x1f", Key::ControlUnderscore),
    (b"\x7f", Key::Backspace),
    // cursor keys, normal and application mode
    (b"\x1b[A", Key::Up),
    (b"\x1b[B", Key::Down),
    (b"\x1b[C", Key::Right),
    (b"\x1b[D", Key::Left),
    (b"\x1bOA", Key::Up),
    (b"\x1bOB", Key::Down),
    (b"\x1bOC", Key::Right),
    (b"\x1bOD", Key::Left),
    (b"\x1b[H", Key::Home),
    (b"\x1bOH", Key::Home),
    (b"\x1b[1~", Key::Home),
    (b"\x1b[7~", Key::Home),
    (b"\x1b[F", Key::End),
    (b"\x1bOF", Key::End),
    (b"\x1b[4~", Key::End),
    (b"\x1b[8~", Key::End),
    (b"\x1b[2~", Key::Insert),
    (b"\x1b[3~", Key::Delete),
    (b"\x1b[3;2~", Key::ShiftDelete),
    (b"\x1b[3;5~", Key::ControlDelete),
    (b"\x1b[5~", Key::PageUp),
    (b"\x1b[6~", Key::PageDown),
    (b"\x1b[Z", Key::BackTab),
    // function keys: xterm
    (b"\x1bOP", Key::F1),
    (b"\x1bOQ", Key::F2),
    (b"\x1bOR", Key::F3),
    (b"\x1bOS", Key::F4),
    (b"\x1b[15~", Key::F5),
    (b"\x1b[17~", Key::F6),
    (b"\x1b[18~", Key::F7),
    (b"\x1b[19~", Key::F8),
    (b"\x1b[20~", Key::F9),
    (b"\x1b[21~", Key::F10),
    (b"\x1b[23~", Key::F11),
    (b"\x1b[24~", Key::F12),
    (b"\x1b[1;2P", Key::F13),
    (b"\x1b[1;2Q", Key::F14),
    (b"\x1b[1;2R", Key::F15),
    (b"\x1b[1;2S", Key::F16),
    (b"\x1b[15;2~", Key::F17),
    (b"\x1b[17;2~", Key::F18),
    (b"\x1b[18;2~", Key::F19),
    (b"\x1b[19;2~", Key::F20),
    (b"\x1b[20;2~", Key::F21),
    (b"\x1b[21;2~", Key::F22),
    (b"\x1b[23;2~", Key::F23),
    (b"\x1b[24;2~", Key::F24),
    // function keys: Linux console
    (b"\x1b[[A", Key::F1),
    (b"\x1b[[B", Key::F2),
    (b"\x1b[[C", Key::F3),
    (b"\x1b[[D", Key::F4),
    (b"\x1b[[E", Key::F5),
    // function keys: rxvt
    (b"\x1b[11~", Key::F1),
    (b"\x1b[12~", Key::F2),
    (b"\x1b[13~", Key::F3),
    (b"\x1b[14~", Key::F4),
    // modified arrows
    (b"\x1b[1;5A", Key::ControlUp),
    (b"\x1b[1;5B", Key::ControlDown),
    (b"\x1b[1;5C", Key::ControlRight),
    (b"\x1b[1;5D", Key::ControlLeft),
    (b"\x1b[5A", Key::ControlUp),
    (b"\x1b[5B", Key::ControlDown),
    (b"\x1b[5C", Key::ControlRight),
    (b"\x1b[5D", Key::ControlLeft),
    (b"\x1b[1;2A", Key::ShiftUp),
    (b"\x1b[1;2B", Key::ShiftDown),
    (b"\x1b[1;2C", Key::ShiftRight),
    (b"\x1b[1;2D", Key::ShiftLeft),
    // meta-f / meta-b as sent by macOS terminals for option+arrow
    (b"\x1bf", Key::ControlRight),
    (b"\x1bb", Key::ControlLeft),
    // keypad 5 without numlock
    (b"\x1b[E", Key::Ignore),
    (b"\x1b[G", Key::Ignore),
];

// -------------------------------------------------------------------------------------------------
// Trie Representation
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone)]
struct Edge {
    byte: u8,
    next: usize,
}

#[derive(Debug, Clone)]
struct Node {
    key: Option<Key>,
    edges: SmallVec<[Edge; 4]>,
}

impl Node {
    fn new() -> Self {
        Self {
            key: None,
            edges: SmallVec::new(),
        }
    }
}

/// Byte trie over escape sequences.
#[derive(Debug)]
pub struct SequenceTrie {
    nodes: Vec<Node>,
}

impl SequenceTrie {
    pub fn build<'a, I>(specs: I) -> Self
    where
        I: IntoIterator<Item = (&'a [u8], Key)>,
    {
        let mut trie = SequenceTrie {
            nodes: vec![Node::new()],
        };
        for (seq, key) in specs {
            let mut cur = 0usize;
            for &byte in seq {
                cur = match trie.nodes[cur].edges.iter().find(|e| e.byte == byte) {
                    Some(e) => e.next,
                    None => {
                        let new_idx = trie.nodes.len();
                        trie.nodes.push(Node::new());
                        trie.nodes[cur].edges.push(Edge {
                            byte,
                            next: new_idx,
                        });
                        new_idx
                    }
                };
            }
            if let Some(prev) = trie.nodes[cur].key.replace(key) {
                trace!(
                    target: "input.decode",
                    previous = prev.name(),
                    key = key.name(),
                    "terminal_override"
                );
            }
        }
        trie
    }

    /// Key for an exact sequence, `None` for prefixes and unknown input.
    pub fn lookup(&self, bytes: &[u8]) -> Option<Key> {
        if bytes.is_empty() {
            return None;
        }
        let mut node = 0usize;
        for &byte in bytes {
            node = self.nodes[node]
                .edges
                .iter()
                .find(|e| e.byte == byte)?
                .next;
        }
        self.nodes[node].key
    }

    /// True when `bytes` is a strict prefix of at least one sequence.
    pub fn is_partial(&self, bytes: &[u8]) -> bool {
        let mut node = 0usize;
        for &byte in bytes {
            match self.nodes[node].edges.iter().find(|e| e.byte == byte) {
                Some(e) => node = e.next,
                None => return false,
            }
        }
        !self.nodes[node].edges.is_empty()
    }
}

static SEQUENCES: LazyLock<SequenceTrie> =
    LazyLock::new(|| SequenceTrie::build(ASCII_SEQUENCES.iter().copied()));

/// Decode one raw read chunk.
pub fn decode(bytes: &[u8]) -> Key {
    let key = SEQUENCES.lookup(bytes).unwrap_or(Key::NotDefined);
    trace!(target: "input.decode", len = bytes.len(), key = key.name(), "decode");
    key
}

/// True when `bytes` looks like the start of a longer escape sequence.
pub fn is_partial_sequence(bytes: &[u8]) -> bool {
    SEQUENCES.is_partial(bytes)
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn control_codes() {
        assert_eq!(decode(b"\x01"), Key::ControlA);
        assert_eq!(decode(b"\x12"), Key::ControlR);
        assert_eq!(decode(b"\x09"), Key::Tab);
        assert_eq!(decode(b"\x0a"), Key::Enter);
        assert_eq!(decode(b"\x0d"), Key::ControlM);
        assert_eq!(decode(b"\x7f"), Key::Backspace);
        assert_eq!(decode(b"\x00"), Key::ControlSpace);
    }

    #[test]
    fn escape_sequences() {
        assert_eq!(decode(b"\x1b"), Key::Escape);
        assert_eq!(decode(b"\x1b[A"), Key::Up);
        assert_eq!(decode(b"\x1bOD"), Key::Left);
        assert_eq!(decode(b"\x1b[Z"), Key::BackTab);
        assert_eq!(decode(b"\x1b[3;5~"), Key::ControlDelete);
        assert_eq!(decode(b"\x1b[1;5C"), Key::ControlRight);
        assert_eq!(decode(b"\x1b[24;2~"), Key::F24);
        assert_eq!(decode(b"\x1b[[E"), Key::F5);
        assert_eq!(decode(b"\x1b[G"), Key::Ignore);
    }

    #[test]
    fn text_and_unknown_are_not_defined() {
        assert_eq!(decode(b"a"), Key::NotDefined);
        assert_eq!(decode(b"hello"), Key::NotDefined);
        assert_eq!(decode("日本".as_bytes()), Key::NotDefined);
        assert_eq!(decode(b"\x1b[99~"), Key::NotDefined);
        assert_eq!(decode(b""), Key::NotDefined);
        // A known sequence with trailing bytes is not an exact match.
        assert_eq!(decode(b"\x1b[Ax"), Key::NotDefined);
    }

    #[test]
    fn every_table_entry_round_trips() {
        let trie = SequenceTrie::build(ASCII_SEQUENCES.iter().copied());
        for (seq, key) in ASCII_SEQUENCES {
            assert_eq!(trie.lookup(seq), Some(*key), "sequence {seq:?}");
        }
    }

    #[test]
    fn decoder_never_produces_control_i_or_j() {
        for (_, key) in ASCII_SEQUENCES {
            assert!(!matches!(key, Key::ControlI | Key::ControlJ));
        }
    }

    #[test]
    fn later_entry_overrides() {
        let specs: [(&[u8], Key); 2] = [(b"\x1bx", Key::F1), (b"\x1bx", Key::F2)];
        let trie = SequenceTrie::build(specs);
        assert_eq!(trie.lookup(b"\x1bx"), Some(Key::F2));
    }

    #[test]
    fn partial_sequences() {
        assert!(is_partial_sequence(b"\x1b["));
        assert!(is_partial_sequence(b"\x1b[1;"));
        assert!(!is_partial_sequence(b"\x1b[A"));
        assert!(!is_partial_sequence(b"zz"));
    }
}
