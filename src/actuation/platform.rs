//! Platform process, browser, and clipboard helpers
//!
//! These shell out to the host's standard tools: `open` / `pbcopy` on macOS,
//! `xdg-open` / `wl-copy` / `xclip` on Linux, `cmd start` / `clip` on Windows.

use super::ActuationError;
use std::io::Write;
use std::process::{Child, Command, Stdio};
use tracing::debug;

/// Prefix `https://` when the string carries no URI scheme.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let has_scheme = match url.split_once(':') {
        Some((scheme, rest)) => {
            !scheme.is_empty()
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c))
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && (rest.starts_with("//") || scheme.eq_ignore_ascii_case("mailto"))
        }
        None => false,
    };
    if has_scheme {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn detached(mut command: Command) -> Command {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    command
}

/// Reap the child in the background so it never lingers as a zombie.
fn reap(mut child: Child, what: String) {
    std::thread::spawn(move || match child.wait() {
        Ok(status) => debug!(command = %what, %status, "Launched process exited"),
        Err(e) => debug!(command = %what, error = %e, "Could not wait for launched process"),
    });
}

/// Start `command` through the platform shell without waiting.
pub fn launch(command: &str) -> Result<(), ActuationError> {
    let cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", command]);
        c
    } else {
        let mut c = Command::new("sh");
        c.args(["-c", command]);
        c
    };
    let child = detached(cmd)
        .spawn()
        .map_err(|source| ActuationError::Launch {
            command: command.to_string(),
            source,
        })?;
    reap(child, command.to_string());
    Ok(())
}

/// Open `url` with the default browser.
pub fn open_url(url: &str) -> Result<(), ActuationError> {
    let url = normalize_url(url);
    let cmd = if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(&url);
        c
    } else if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", &url]);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(&url);
        c
    };
    let child = detached(cmd).spawn().map_err(|source| ActuationError::Launch {
        command: url.clone(),
        source,
    })?;
    reap(child, url);
    Ok(())
}

type ClipboardTool = (&'static str, &'static [&'static str]);

const MACOS_CLIPBOARD: &[ClipboardTool] = &[("pbcopy", &[])];
const WINDOWS_CLIPBOARD: &[ClipboardTool] = &[("clip", &[])];
const WAYLAND_CLIPBOARD: &[ClipboardTool] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
];
const X11_CLIPBOARD: &[ClipboardTool] = &[
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

fn clipboard_commands() -> &'static [ClipboardTool] {
    if cfg!(target_os = "macos") {
        MACOS_CLIPBOARD
    } else if cfg!(windows) {
        WINDOWS_CLIPBOARD
    } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
        WAYLAND_CLIPBOARD
    } else {
        X11_CLIPBOARD
    }
}

/// Replace the clipboard contents with `text`.
pub fn set_clipboard(text: &str) -> Result<(), ActuationError> {
    let mut last_error = String::from("no clipboard tool available");

    for &(program, args) in clipboard_commands() {
        let spawned = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                last_error = format!("{}: {}", program, e);
                continue;
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(text.as_bytes()) {
                last_error = format!("{}: {}", program, e);
                let _ = child.kill();
                let _ = child.wait();
                continue;
            }
        }

        match child.wait() {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => last_error = format!("{} exited with {}", program, status),
            Err(e) => last_error = format!("{}: {}", program, e),
        }
    }

    Err(ActuationError::Clipboard(last_error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_adds_scheme() {
        assert_eq!(normalize_url("youtube.com"), "https://youtube.com");
        assert_eq!(normalize_url(" example.org/a:b "), "https://example.org/a:b");
        assert_eq!(normalize_url("localhost:8080"), "https://localhost:8080");
    }

    #[test]
    fn test_normalize_url_keeps_scheme() {
        assert_eq!(normalize_url("http://example.org"), "http://example.org");
        assert_eq!(normalize_url("file:///tmp/x.html"), "file:///tmp/x.html");
        assert_eq!(normalize_url("mailto:me@example.org"), "mailto:me@example.org");
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_reports_success_for_shell_command() {
        assert!(launch("true").is_ok());
    }
}
