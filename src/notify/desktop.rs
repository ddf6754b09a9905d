//! Out-of-band alerts shown on the local desktop, used when the run cannot
//! reach the email path (the rate page changed shape).

use std::process::Command;

use log::{error, info};

use crate::error::AlertError;

#[cfg_attr(test, mockall::automock)]
pub trait LocalAlert: Send + Sync {
    fn alert(&self, title: &str, message: &str) -> Result<(), AlertError>;
}

/// Picks the implementation for an OS name as reported by
/// `std::env::consts::OS`.
pub fn for_platform(os: &str) -> Box<dyn LocalAlert> {
    match os {
        "macos" => Box::new(MacAlert),
        "linux" => Box::new(LinuxAlert),
        "windows" => Box::new(WindowsAlert),
        other => {
            info!("No desktop notifications on {:?}, alerts go to the log only", other);
            Box::new(LogOnlyAlert)
        }
    }
}

fn run(program: &'static str, command: &mut Command) -> Result<(), AlertError> {
    let status = command
        .status()
        .map_err(|source| AlertError::Launch { program, source })?;
    if status.success() {
        Ok(())
    } else {
        Err(AlertError::Exit { program, status })
    }
}

pub struct MacAlert;

impl MacAlert {
    fn script(title: &str, message: &str) -> String {
        let quote = |s: &str| s.replace('\\', "\\\\").replace('"', "\\\"");
        format!(
            "display notification \"{}\" with title \"{}\"",
            quote(message),
            quote(title)
        )
    }
}

impl LocalAlert for MacAlert {
    fn alert(&self, title: &str, message: &str) -> Result<(), AlertError> {
        let script = Self::script(title, message);
        run(
            "osascript",
            Command::new("osascript").args(["-e", script.as_str()]),
        )
    }
}

pub struct LinuxAlert;

impl LocalAlert for LinuxAlert {
    fn alert(&self, title: &str, message: &str) -> Result<(), AlertError> {
        run("notify-send", Command::new("notify-send").args([title, message]))
    }
}

pub struct WindowsAlert;

impl WindowsAlert {
    fn script(title: &str, message: &str) -> String {
        let quote = |s: &str| s.replace('\'', "''");
        format!(
            "Add-Type -AssemblyName System.Windows.Forms; \
             $n = New-Object System.Windows.Forms.NotifyIcon; \
             $n.Icon = [System.Drawing.SystemIcons]::Warning; \
             $n.Visible = $true; \
             $n.ShowBalloonTip(10000, '{}', '{}', 'Warning'); \
             Start-Sleep -Seconds 10; $n.Dispose()",
            quote(title),
            quote(message)
        )
    }
}

impl LocalAlert for WindowsAlert {
    fn alert(&self, title: &str, message: &str) -> Result<(), AlertError> {
        let script = Self::script(title, message);
        run(
            "powershell",
            Command::new("powershell").args(["-NoProfile", "-Command", script.as_str()]),
        )
    }
}

/// Fallback for platforms without a supported notification tool.
pub struct LogOnlyAlert;

impl LocalAlert for LogOnlyAlert {
    fn alert(&self, title: &str, message: &str) -> Result<(), AlertError> {
        error!("{}: {}", title, message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applescript_escapes_quotes() {
        let script = MacAlert::script("Rate \"alert\"", "layout changed");
        assert_eq!(
            script,
            r#"display notification "layout changed" with title "Rate \"alert\"""#
        );
    }

    #[test]
    fn powershell_doubles_single_quotes() {
        let script = WindowsAlert::script("title", "page's layout");
        assert!(script.contains("'page''s layout'"));
    }

    #[test]
    fn unknown_platform_logs_only() {
        let alert = for_platform("haiku");
        assert!(alert.alert("title", "message").is_ok());
    }
}
