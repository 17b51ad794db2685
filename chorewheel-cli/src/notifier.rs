//! Desktop delivery for queued reminders.

use anyhow::{bail, Context, Result};
use chorewheel_core::Platform;
use std::path::PathBuf;

/// Local notification backend found on this machine.
#[derive(Debug, Clone)]
pub enum DesktopNotifier {
    NotifySend(PathBuf),
    Osascript(PathBuf),
}

impl DesktopNotifier {
    pub fn detect() -> Option<Self> {
        if cfg!(target_os = "macos") {
            return which::which("osascript").ok().map(DesktopNotifier::Osascript);
        }
        which::which("notify-send").ok().map(DesktopNotifier::NotifySend)
    }

    pub fn show(&self, title: &str, body: &str) -> Result<()> {
        let output = match self {
            DesktopNotifier::NotifySend(bin) => std::process::Command::new(bin)
                .args(["--app-name", "Chorewheel", title, body])
                .output()
                .context("running notify-send")?,
            DesktopNotifier::Osascript(bin) => {
                let script = format!(
                    r#"display notification "{}" with title "{}""#,
                    escape_applescript(body),
                    escape_applescript(title)
                );
                std::process::Command::new(bin)
                    .arg("-e")
                    .arg(&script)
                    .output()
                    .context("running osascript")?
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("notification failed: {stderr}");
        }
        Ok(())
    }
}

/// Native when a desktop notifier exists, unless config pins it.
pub fn resolve_platform(forced: Option<Platform>) -> Platform {
    forced.unwrap_or_else(|| {
        if DesktopNotifier::detect().is_some() {
            Platform::Native
        } else {
            Platform::Web
        }
    })
}

fn escape_applescript(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
