//! Key Names
//!
//! Hotkey combos are `+`-joined, case-insensitive key names such as
//! `ctrl+shift+t`, `cmd+space`, or `alt+f4`.

use super::ActuationError;
use std::fmt;
use std::str::FromStr;

/// A backend-independent key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyName {
    Control,
    Shift,
    Alt,
    /// Command on macOS, Windows/Super elsewhere
    Meta,
    Return,
    Tab,
    Escape,
    Space,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    CapsLock,
    /// Function key F1..=F12
    F(u8),
    /// A printable character
    Char(char),
}

impl FromStr for KeyName {
    type Err = ActuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let key = match name.as_str() {
            "ctrl" | "control" => KeyName::Control,
            "shift" => KeyName::Shift,
            "alt" | "option" | "opt" => KeyName::Alt,
            "cmd" | "command" | "meta" | "win" | "super" => KeyName::Meta,
            "enter" | "return" => KeyName::Return,
            "tab" => KeyName::Tab,
            "esc" | "escape" => KeyName::Escape,
            "space" => KeyName::Space,
            "backspace" => KeyName::Backspace,
            "delete" | "del" => KeyName::Delete,
            "up" => KeyName::Up,
            "down" => KeyName::Down,
            "left" => KeyName::Left,
            "right" => KeyName::Right,
            "home" => KeyName::Home,
            "end" => KeyName::End,
            "pageup" | "pgup" => KeyName::PageUp,
            "pagedown" | "pgdn" => KeyName::PageDown,
            "capslock" => KeyName::CapsLock,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyName::Char(c),
                    (Some('f'), Some(_)) => match name[1..].parse::<u8>() {
                        Ok(n) if (1..=12).contains(&n) => KeyName::F(n),
                        _ => return Err(ActuationError::UnknownKey(s.trim().to_string())),
                    },
                    _ => return Err(ActuationError::UnknownKey(s.trim().to_string())),
                }
            }
        };
        Ok(key)
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyName::F(n) => write!(f, "f{}", n),
            KeyName::Char(c) => write!(f, "{}", c),
            other => write!(f, "{}", format!("{:?}", other).to_ascii_lowercase()),
        }
    }
}

/// Split a combo into recognized keys and the names that were not.
pub fn parse_combo(combo: &str) -> (Vec<KeyName>, Vec<String>) {
    let mut keys = Vec::new();
    let mut unknown = Vec::new();
    for part in combo.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse::<KeyName>() {
            Ok(key) => keys.push(key),
            Err(_) => unknown.push(part.to_string()),
        }
    }
    (keys, unknown)
}

/// The platform paste shortcut
pub fn paste_combo() -> [KeyName; 2] {
    if cfg!(target_os = "macos") {
        [KeyName::Meta, KeyName::Char('v')]
    } else {
        [KeyName::Control, KeyName::Char('v')]
    }
}
