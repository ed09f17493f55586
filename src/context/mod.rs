//! Active Context
//!
//! A context is the identifier of whatever the user is currently working in,
//! typically the focused application's name. Profiles are keyed by it.

pub mod frontmost;

pub use frontmost::FrontmostAppContext;

use crate::profile::GLOBAL;

/// Supplies the active context when a gesture fires
pub trait ContextProvider {
    fn active_context(&mut self) -> String;
}

/// Always reports the same context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticContext {
    name: String,
}

impl StaticContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Resolve everything against `GLOBAL`
    pub fn global() -> Self {
        Self::new(GLOBAL)
    }
}

impl ContextProvider for StaticContext {
    fn active_context(&mut self) -> String {
        self.name.clone()
    }
}

/// Build the provider named in configuration.
pub fn from_config(config: &crate::app::config::ContextConfig) -> crate::Result<Box<dyn ContextProvider>> {
    match config.provider.as_str() {
        "static" => Ok(Box::new(StaticContext::new(config.static_context.clone()))),
        "frontmost" => Ok(Box::new(FrontmostAppContext::new(config.static_context.clone()))),
        other => Err(crate::Error::Config(format!(
            "unknown context provider '{}' (expected 'static' or 'frontmost')",
            other
        ))),
    }
}
