//! Clipboard utilities for dicto.
//!
//! Handles copying transcribed text to the system clipboard using pbcopy
//! (macOS), wl-copy (Wayland) or xclip (X11), whichever is available.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// Copies text to the system clipboard.
///
/// Tries pbcopy first on macOS, then wl-copy, then xclip. Clipboard
/// unavailability is a warning, not an error: the transcription already
/// succeeded and the caller still has the text.
pub fn copy_to_clipboard(text: &str) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    if pipe_to("pbcopy", &[], text) {
        return Ok(());
    }

    if pipe_to("wl-copy", &["--type", "text/plain", "--trim-newline"], text) {
        return Ok(());
    }
    if pipe_to("xclip", &["-selection", "clipboard", "-in", "-quiet"], text) {
        return Ok(());
    }

    tracing::warn!("No clipboard tool available (pbcopy, wl-copy or xclip)");
    Ok(())
}

/// Spawns a clipboard tool and writes `text` to its stdin. Returns false when
/// the tool is missing or the write fails, so the caller can try the next one.
fn pipe_to(tool: &str, args: &[&str], text: &str) -> bool {
    let Ok(mut child) = Command::new(tool).args(args).stdin(Stdio::piped()).spawn() else {
        tracing::debug!("{tool} not found or not executable");
        return false;
    };
    let Some(mut stdin) = child.stdin.take() else {
        return false;
    };
    match write!(stdin, "{text}") {
        Ok(_) => {
            drop(stdin);
            // Give the tool a moment to take ownership of the selection.
            thread::sleep(Duration::from_millis(100));
            tracing::debug!("Transcribed text copied to clipboard via {tool}");
            true
        }
        Err(e) => {
            tracing::warn!("Failed to write to {tool} stdin: {e}");
            false
        }
    }
}
