//! Context-Scoped Action Resolution

use super::action::ActionSpec;
use super::store::{ProfileStore, GLOBAL};

/// Outcome of resolving a fired gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Action(&'a ActionSpec),
    /// Neither the active context nor `GLOBAL` maps the gesture
    NoAction,
}

impl<'a> Resolution<'a> {
    pub fn action(self) -> Option<&'a ActionSpec> {
        match self {
            Resolution::Action(action) => Some(action),
            Resolution::NoAction => None,
        }
    }
}

/// Look up `gesture` in the `context` profile, falling back to `GLOBAL`.
pub fn resolve<'a>(store: &'a ProfileStore, gesture: &str, context: &str) -> Resolution<'a> {
    store
        .profile(context)
        .and_then(|p| p.get(gesture))
        .or_else(|| store.profile(GLOBAL).and_then(|p| p.get(gesture)))
        .map_or(Resolution::NoAction, Resolution::Action)
}

impl ProfileStore {
    pub fn resolve(&self, gesture: &str, context: &str) -> Resolution<'_> {
        resolve(self, gesture, context)
    }
}
