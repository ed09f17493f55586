//! Loop Commands
//!
//! Authoring and UI requests reach the frame loop as [`LoopCommand`] values
//! over a channel and are applied between frames, so the store is never
//! mutated while a frame is being processed.
//!
//! Text form, one command per line:
//!
//! ```text
//! save <name>[@scope] [tag:payload ...]   register the hand in view
//! delete <name>[@scope]                   unmap, dropping unused templates
//! set <key> <value>                       change an engine setting
//! pause | resume | toggle | quit
//! ```

use crate::profile::{ActionSpec, GLOBAL};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// A request applied between frames
#[derive(Debug, Clone, PartialEq)]
pub enum LoopCommand {
    /// Capture the hand currently in view as a template
    SaveGesture {
        name: String,
        scope: String,
        action: Option<ActionSpec>,
    },
    DeleteGesture {
        name: String,
        scope: String,
    },
    SetSetting {
        key: String,
        value: String,
    },
    /// Skip perception and triggering until resumed
    Pause,
    Resume,
    ToggleFollow,
    Quit,
}

fn split_scope(target: &str) -> (String, String) {
    match target.split_once('@') {
        Some((name, scope)) if !scope.trim().is_empty() => {
            (name.trim().to_string(), scope.trim().to_string())
        }
        _ => (target.trim_end_matches('@').trim().to_string(), GLOBAL.to_string()),
    }
}

/// Parse one command line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> crate::Result<Option<LoopCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let usage = |text: &str| crate::Error::Config(format!("usage: {}", text));

    let command = match verb.to_ascii_lowercase().as_str() {
        "save" => {
            let (target, action) = match rest.split_once(char::is_whitespace) {
                Some((target, action)) => (target, action.trim()),
                None => (rest, ""),
            };
            if target.is_empty() {
                return Err(usage("save <name>[@scope] [tag:payload]"));
            }
            let (name, scope) = split_scope(target);
            let action = if action.is_empty() {
                None
            } else {
                Some(action.parse::<ActionSpec>()?)
            };
            LoopCommand::SaveGesture { name, scope, action }
        }
        "delete" | "del" | "rm" => {
            if rest.is_empty() {
                return Err(usage("delete <name>[@scope]"));
            }
            let (name, scope) = split_scope(rest);
            LoopCommand::DeleteGesture { name, scope }
        }
        "set" => match rest.split_once(char::is_whitespace) {
            Some((key, value)) if !value.trim().is_empty() => LoopCommand::SetSetting {
                key: key.to_string(),
                value: value.trim().to_string(),
            },
            _ => return Err(usage("set <key> <value>")),
        },
        "pause" => LoopCommand::Pause,
        "resume" => LoopCommand::Resume,
        "toggle" | "follow" => LoopCommand::ToggleFollow,
        "quit" | "exit" | "q" => LoopCommand::Quit,
        other => {
            return Err(crate::Error::Config(format!("unknown command '{}'", other)));
        }
    };
    Ok(Some(command))
}

/// Cloneable handle for talking to a running loop
#[derive(Debug, Clone)]
pub struct ControlHandle {
    sender: Sender<LoopCommand>,
    stop: Arc<AtomicBool>,
}

impl ControlHandle {
    pub(crate) fn new(sender: Sender<LoopCommand>, stop: Arc<AtomicBool>) -> Self {
        Self { sender, stop }
    }

    /// Queue a command. Returns false if the loop is gone.
    pub fn send(&self, command: LoopCommand) -> bool {
        self.sender.send(command).is_ok()
    }

    /// Ask the loop to exit after the current frame.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// The shared stop flag, for signal handlers
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }
}

/// Forward parsed command lines from `reader` until EOF or the loop exits.
pub fn spawn_command_reader<R>(reader: R, handle: ControlHandle) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "Command input closed");
                    break;
                }
            };
            match parse_command(&line) {
                Ok(Some(command)) => {
                    debug!(?command, "Command received");
                    let quit = command == LoopCommand::Quit;
                    if !handle.send(command) || quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Ignoring command"),
            }
            if handle.is_stopped() {
                break;
            }
        }
    })
}
