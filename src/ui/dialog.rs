//! Blocking error dialog for fatal startup failures

use std::process::Command;
use tracing::debug;

/// Report a fatal error on stderr and, where possible, in a modal dialog
pub fn show_fatal_error(message: &str) {
    eprintln!("murmur: {}", message);

    let result = if cfg!(target_os = "macos") {
        Command::new("osascript")
            .arg("-e")
            .arg(format!(
                "display dialog {} with title \"Murmur\" buttons {{\"OK\"}} with icon stop",
                applescript_quote(message)
            ))
            .status()
    } else {
        Command::new("zenity")
            .args(["--error", "--no-markup", "--title=Murmur"])
            .arg(format!("--text={}", message))
            .status()
    };

    match result {
        Ok(status) if !status.success() => debug!("Error dialog exited with {}", status),
        Ok(_) => {}
        Err(e) => debug!("No error dialog available: {}", e),
    }
}

fn applescript_quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applescript_quote() {
        assert_eq!(applescript_quote("plain"), "\"plain\"");
        assert_eq!(
            applescript_quote(r#"bad "path" \x"#),
            r#""bad \"path\" \\x""#
        );
    }
}
