//! Best-effort image viewer launch
//!
//! Showing the saved figure is optional: on a headless machine there is
//! nothing to show it on. The capability is checked explicitly before any
//! viewer is spawned, and every failure is logged at debug level and
//! otherwise ignored.

use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Check whether a graphical display is available.
///
/// Always true on macOS and Windows. Elsewhere requires a non-empty
/// `DISPLAY` or `WAYLAND_DISPLAY`.
#[must_use]
pub fn is_display_available() -> bool {
    display_available_with(|name| std::env::var_os(name).map(|v| !v.is_empty()))
}

fn display_available_with<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<bool>,
{
    if cfg!(any(target_os = "macos", target_os = "windows")) {
        return true;
    }
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .into_iter()
        .any(|name| lookup(name).unwrap_or(false))
}

fn viewer_command(path: &Path) -> Command {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        Command::new("xdg-open")
    };
    command
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    command
}

/// Open `path` in the platform image viewer.
///
/// Returns whether a viewer was launched successfully. Never fails.
pub fn show<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    if !is_display_available() {
        debug!(path = %path.display(), "no display available, not showing figure");
        return false;
    }

    match viewer_command(path).status() {
        Ok(status) if status.success() => true,
        Ok(status) => {
            debug!(path = %path.display(), %status, "image viewer exited with failure");
            false
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "could not launch image viewer");
            false
        }
    }
}
