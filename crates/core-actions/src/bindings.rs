//! Key binding tables.

use std::fmt;
use std::sync::Arc;

use core_events::Key;
use core_text::Buffer;
use tracing::trace;

use crate::{Action, DispatchResult, dispatch};

/// What a binding does when its key fires.
#[derive(Clone)]
pub enum Handler {
    Action(Action),
    Custom(Arc<dyn Fn(&mut Buffer) + Send + Sync>),
}

impl Handler {
    pub fn apply(&self, buf: &mut Buffer) -> DispatchResult {
        match self {
            Handler::Action(action) => dispatch(*action, buf),
            Handler::Custom(f) => {
                f(buf);
                DispatchResult::clean()
            }
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Action(a) => f.debug_tuple("Action").field(a).finish(),
            Handler::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<Action> for Handler {
    fn from(action: Action) -> Self {
        Handler::Action(action)
    }
}

/// Binding of a decoded key.
#[derive(Debug, Clone)]
pub struct KeyBind {
    pub key: Key,
    pub handler: Handler,
}

impl KeyBind {
    pub fn new(key: Key, handler: impl Into<Handler>) -> Self {
        Self {
            key,
            handler: handler.into(),
        }
    }

    pub fn custom<F>(key: Key, f: F) -> Self
    where
        F: Fn(&mut Buffer) + Send + Sync + 'static,
    {
        Self {
            key,
            handler: Handler::Custom(Arc::new(f)),
        }
    }
}

/// Binding of an exact raw byte sequence. Only consulted for chunks that
/// decode to [`Key::NotDefined`].
#[derive(Debug, Clone)]
pub struct AsciiCodeBind {
    pub code: Vec<u8>,
    pub handler: Handler,
}

impl AsciiCodeBind {
    pub fn new(code: impl Into<Vec<u8>>, handler: impl Into<Handler>) -> Self {
        Self {
            code: code.into(),
            handler: handler.into(),
        }
    }

    pub fn custom<F>(code: impl Into<Vec<u8>>, f: F) -> Self
    where
        F: Fn(&mut Buffer) + Send + Sync + 'static,
    {
        Self {
            code: code.into(),
            handler: Handler::Custom(Arc::new(f)),
        }
    }
}

/// Which built-in table runs after the common one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyBindMode {
    /// Common bindings only.
    Common,
    /// Common bindings plus the emacs table.
    #[default]
    Emacs,
}

impl KeyBindMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "common" => Some(KeyBindMode::Common),
            "emacs" => Some(KeyBindMode::Emacs),
            _ => None,
        }
    }
}

/// Navigation keys every mode shares.
pub fn common_bindings() -> Vec<KeyBind> {
    vec![
        KeyBind::new(Key::End, Action::GoLineEnd),
        KeyBind::new(Key::Home, Action::GoLineBeginning),
        KeyBind::new(Key::Delete, Action::DeleteChar),
        KeyBind::new(Key::Backspace, Action::DeleteBeforeChar),
        KeyBind::new(Key::Right, Action::GoRightChar),
        KeyBind::new(Key::Left, Action::GoLeftChar),
        KeyBind::new(Key::ControlRight, Action::GoRightWord),
        KeyBind::new(Key::ControlLeft, Action::GoLeftWord),
    ]
}

/// Readline-style control keys.
pub fn emacs_bindings() -> Vec<KeyBind> {
    vec![
        KeyBind::new(Key::ControlE, Action::GoLineEnd),
        KeyBind::new(Key::ControlA, Action::GoLineBeginning),
        KeyBind::new(Key::ControlK, Action::KillLineAfter),
        KeyBind::new(Key::ControlU, Action::KillLineBefore),
        KeyBind::new(Key::ControlD, Action::DeleteCharIfNotEmpty),
        KeyBind::new(Key::ControlH, Action::DeleteBeforeChar),
        KeyBind::new(Key::ControlF, Action::GoRightChar),
        KeyBind::new(Key::ControlB, Action::GoLeftChar),
        KeyBind::new(Key::ControlW, Action::DeleteWord),
        KeyBind::new(Key::ControlL, Action::ClearScreen),
    ]
}

/// Run every binding in `binds` registered for `key`, in table order.
pub fn apply_key_bindings(binds: &[KeyBind], key: Key, buf: &mut Buffer) -> DispatchResult {
    binds
        .iter()
        .filter(|b| b.key == key)
        .fold(DispatchResult::clean(), |acc, b| {
            trace!(target: "actions.bind", key = key.name(), "key_binding");
            acc.merge(b.handler.apply(buf))
        })
}

/// Run the raw-sequence bindings matching `bytes`. `None` when none matched.
pub fn apply_ascii_bindings(
    binds: &[AsciiCodeBind],
    bytes: &[u8],
    buf: &mut Buffer,
) -> Option<DispatchResult> {
    let mut result: Option<DispatchResult> = None;
    for b in binds.iter().filter(|b| b.code == bytes) {
        trace!(target: "actions.bind", len = bytes.len(), "ascii_binding");
        let r = b.handler.apply(buf);
        result = Some(result.unwrap_or_default().merge(r));
    }
    result
}
