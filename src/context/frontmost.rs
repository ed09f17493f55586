//! Frontmost Application Context
//!
//! macOS asks `NSWorkspace` for the frontmost application's localized name.
//! Linux asks `xdotool` for the focused window's class. Anywhere the lookup
//! fails, the configured fallback context is reported.

use super::ContextProvider;
use tracing::{debug, warn};

/// Reports the focused application's name
pub struct FrontmostAppContext {
    fallback: String,
    warned: bool,
}

impl FrontmostAppContext {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            fallback: fallback.into(),
            warned: false,
        }
    }
}

impl ContextProvider for FrontmostAppContext {
    fn active_context(&mut self) -> String {
        match frontmost_app_name() {
            Some(name) => {
                debug!(context = %name, "Frontmost application");
                name
            }
            None => {
                if !self.warned {
                    warn!(fallback = %self.fallback, "Could not determine the frontmost application");
                    self.warned = true;
                }
                self.fallback.clone()
            }
        }
    }
}

#[cfg(target_os = "macos")]
fn frontmost_app_name() -> Option<String> {
    use objc::runtime::{Class, Object};
    use objc::{msg_send, sel, sel_impl};

    unsafe {
        let workspace_class = Class::get("NSWorkspace")?;

        // [[NSWorkspace sharedWorkspace] frontmostApplication]
        let workspace: *mut Object = msg_send![workspace_class, sharedWorkspace];
        if workspace.is_null() {
            return None;
        }
        let app: *mut Object = msg_send![workspace, frontmostApplication];
        if app.is_null() {
            return None;
        }

        let name: *mut Object = msg_send![app, localizedName];
        if name.is_null() {
            return None;
        }
        let utf8: *const std::os::raw::c_char = msg_send![name, UTF8String];
        if utf8.is_null() {
            return None;
        }
        let name = std::ffi::CStr::from_ptr(utf8).to_string_lossy().into_owned();
        (!name.is_empty()).then_some(name)
    }
}

#[cfg(target_os = "linux")]
fn frontmost_app_name() -> Option<String> {
    let output = std::process::Command::new("xdotool")
        .args(["getactivewindow", "getwindowclassname"])
        .stderr(std::process::Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!name.is_empty()).then_some(name)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn frontmost_app_name() -> Option<String> {
    None
}
