//! Action Values
//!
//! Actions are persisted as `tag:payload` strings and decoded exactly once,
//! when the store is loaded or a mapping is edited. Everything downstream works
//! with the closed [`ActionSpec`] type.
//!
//! | tag            | variant                 | payload                    |
//! |----------------|-------------------------|----------------------------|
//! | `hotkey`       | `Hotkey`                | `ctrl+shift+t`             |
//! | `app`, `shell` | `Launch`                | command line or document   |
//! | `web`          | `OpenWeb`               | URL, scheme optional       |
//! | `type`         | `TypeText`              | literal text               |
//! | `paste`        | `PasteText`             | literal text               |
//! | `mouse`        | `MouseClick`            | `left` `right` `middle` `double` |
//! | `wait`         | `Wait`                  | milliseconds               |
//! | `special`      | `Special`               | command name               |
//! | `chain`        | `Chain`                 | steps joined by `\|`       |

use std::fmt;
use std::str::FromStr;

/// Special command that flips pointer-follow mode
pub const TOGGLE_FOLLOW: &str = "toggle_follow";

/// Separator between chain steps
pub const CHAIN_DELIMITER: char = '|';

/// Mouse button for a click action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Two left clicks
    Double,
}

impl MouseButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
            MouseButton::Double => "double",
        }
    }
}

impl FromStr for MouseButton {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(MouseButton::Left),
            "right" => Ok(MouseButton::Right),
            "middle" => Ok(MouseButton::Middle),
            "double" => Ok(MouseButton::Double),
            other => Err(crate::Error::InvalidAction {
                input: s.to_string(),
                reason: format!("unknown mouse button '{}'", other),
            }),
        }
    }
}

/// Ordered steps of a chain. Never contains another chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain(Vec<ActionSpec>);

impl Chain {
    /// Build a chain, rejecting nested chains.
    pub fn new(steps: Vec<ActionSpec>) -> crate::Result<Self> {
        if steps.iter().any(|s| matches!(s, ActionSpec::Chain(_))) {
            return Err(crate::Error::InvalidAction {
                input: steps
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" | "),
                reason: "a chain cannot contain another chain".to_string(),
            });
        }
        Ok(Self(steps))
    }

    pub fn steps(&self) -> &[ActionSpec] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A decoded action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionSpec {
    /// Simultaneous key combination, `+`-joined key names
    Hotkey(String),
    /// Start a process or open a document, fire-and-forget
    Launch(String),
    /// Open a URL in the default browser
    OpenWeb(String),
    /// Deliver text as if typed
    TypeText(String),
    /// Deliver text through the clipboard
    PasteText(String),
    MouseClick(MouseButton),
    /// Block the control loop for this many milliseconds
    Wait(u64),
    /// Named command handled by the caller
    Special(String),
    Chain(Chain),
}

impl ActionSpec {
    /// Short tag used for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ActionSpec::Hotkey(_) => "hotkey",
            ActionSpec::Launch(_) => "app",
            ActionSpec::OpenWeb(_) => "web",
            ActionSpec::TypeText(_) => "type",
            ActionSpec::PasteText(_) => "paste",
            ActionSpec::MouseClick(_) => "mouse",
            ActionSpec::Wait(_) => "wait",
            ActionSpec::Special(_) => "special",
            ActionSpec::Chain(_) => "chain",
        }
    }

    /// Whether this is the pointer-follow toggle command
    pub fn is_toggle_follow(&self) -> bool {
        matches!(self, ActionSpec::Special(name) if name == TOGGLE_FOLLOW)
    }

    /// Decode a single step (anything but `chain:`).
    fn parse_step(input: &str) -> crate::Result<Self> {
        let invalid = |reason: String| crate::Error::InvalidAction {
            input: input.to_string(),
            reason,
        };

        let (tag, payload) = input
            .split_once(':')
            .ok_or_else(|| invalid("expected 'tag:payload'".to_string()))?;

        let action = match tag.trim().to_ascii_lowercase().as_str() {
            "hotkey" => ActionSpec::Hotkey(payload.trim().to_string()),
            "app" | "shell" => ActionSpec::Launch(payload.trim().to_string()),
            "web" => ActionSpec::OpenWeb(payload.trim().to_string()),
            "type" => ActionSpec::TypeText(payload.to_string()),
            "paste" => ActionSpec::PasteText(payload.to_string()),
            "mouse" => ActionSpec::MouseClick(payload.parse()?),
            "wait" => ActionSpec::Wait(
                payload
                    .trim()
                    .parse()
                    .map_err(|e| invalid(format!("bad wait duration: {}", e)))?,
            ),
            "special" => ActionSpec::Special(payload.trim().to_string()),
            "chain" => return Err(invalid("a chain cannot contain another chain".to_string())),
            other => return Err(invalid(format!("unknown action tag '{}'", other))),
        };

        match &action {
            ActionSpec::Hotkey(p)
            | ActionSpec::Launch(p)
            | ActionSpec::OpenWeb(p)
            | ActionSpec::Special(p)
                if p.is_empty() =>
            {
                Err(invalid("empty payload".to_string()))
            }
            _ => Ok(action),
        }
    }
}

impl FromStr for ActionSpec {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_start();
        match trimmed.split_once(':') {
            Some((tag, steps)) if tag.trim().eq_ignore_ascii_case("chain") => {
                let steps = steps
                    .split(CHAIN_DELIMITER)
                    .map(str::trim)
                    .filter(|step| !step.is_empty())
                    .map(ActionSpec::parse_step)
                    .collect::<crate::Result<Vec<_>>>()?;
                Ok(ActionSpec::Chain(Chain::new(steps)?))
            }
            _ => ActionSpec::parse_step(trimmed),
        }
    }
}

impl fmt::Display for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionSpec::Hotkey(p)
            | ActionSpec::Launch(p)
            | ActionSpec::OpenWeb(p)
            | ActionSpec::TypeText(p)
            | ActionSpec::PasteText(p)
            | ActionSpec::Special(p) => write!(f, "{}:{}", self.kind(), p),
            ActionSpec::MouseClick(b) => write!(f, "mouse:{}", b.as_str()),
            ActionSpec::Wait(ms) => write!(f, "wait:{}", ms),
            ActionSpec::Chain(chain) => {
                write!(f, "chain:")?;
                for (i, step) in chain.steps().iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", CHAIN_DELIMITER)?;
                    }
                    write!(f, "{}", step)?;
                }
                Ok(())
            }
        }
    }
}
