//! Keyboard shortcuts.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    Open,
    Print,
    Export,
    Escape,
}

/// The parts of a `keydown` event the shortcut table looks at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyInput {
    pub fn from_event(event: &web_sys::KeyboardEvent) -> Self {
        Self {
            key: event.key(),
            ctrl: event.ctrl_key(),
            meta: event.meta_key(),
        }
    }
}

/// Ctrl on Windows/Linux and Cmd on macOS are interchangeable. A recognised
/// shortcut must have its browser default suppressed by the caller.
pub fn resolve(input: &KeyInput) -> Option<Shortcut> {
    if input.key == "Escape" {
        return Some(Shortcut::Escape);
    }
    if !(input.ctrl || input.meta) {
        return None;
    }
    match input.key.to_ascii_lowercase().as_str() {
        "o" => Some(Shortcut::Open),
        "p" => Some(Shortcut::Print),
        "s" => Some(Shortcut::Export),
        _ => None,
    }
}
