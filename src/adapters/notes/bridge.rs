//! Apple Notes automation bridge
//!
//! [`NotesBridge`] is the narrow set of Notes operations the exporter needs.
//! [`OsaScriptBridge`] implements it by running AppleScript through
//! `osascript`.

use crate::domain::errors::Md2NoteError;
use crate::domain::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Operations against the Notes application
///
/// Implementations are not required to be safe for concurrent use; callers
/// serialize access.
#[async_trait]
pub trait NotesBridge: Send + Sync {
    /// Checks that the bridge can be used on this machine
    ///
    /// # Errors
    ///
    /// Returns [`Md2NoteError::Configuration`] when the automation runtime
    /// is missing.
    async fn check_available(&self) -> Result<()>;

    async fn folder_exists(&self, folder: &str) -> Result<bool>;

    async fn create_folder(&self, folder: &str) -> Result<()>;

    /// Whether a note named `title` whose text contains `marker` exists in
    /// `folder`
    async fn note_exists(&self, folder: &str, title: &str, marker: &str) -> Result<bool>;

    /// Creates a note with an HTML body
    async fn create_note(&self, folder: &str, title: &str, html_body: &str) -> Result<()>;
}

/// Bridge that drives Notes with AppleScript
#[derive(Debug, Clone)]
pub struct OsaScriptBridge {
    osascript_path: PathBuf,
    account: Option<String>,
}

impl OsaScriptBridge {
    pub fn new(osascript_path: impl Into<PathBuf>, account: Option<String>) -> Self {
        Self {
            osascript_path: osascript_path.into(),
            account,
        }
    }

    fn account_target(&self) -> String {
        match &self.account {
            Some(account) => format!("account \"{}\"", escape_applescript(account)),
            None => "default account".to_string(),
        }
    }

    async fn run(&self, script: &str) -> Result<String> {
        let output = Command::new(&self.osascript_path)
            .arg("-e")
            .arg(script)
            .output()
            .await
            .map_err(|e| {
                Md2NoteError::TransientNetwork(format!(
                    "Failed to run {}: {e}",
                    self.osascript_path.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_script_error(stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl NotesBridge for OsaScriptBridge {
    async fn check_available(&self) -> Result<()> {
        if !self.osascript_path.exists() {
            return Err(Md2NoteError::Configuration(format!(
                "Apple Notes export requires osascript, not found at {}",
                self.osascript_path.display()
            )));
        }
        Ok(())
    }

    async fn folder_exists(&self, folder: &str) -> Result<bool> {
        let script = format!(
            "tell application \"Notes\" to tell {} to return (exists folder \"{}\")",
            self.account_target(),
            escape_applescript(folder)
        );
        Ok(self.run(&script).await? == "true")
    }

    async fn create_folder(&self, folder: &str) -> Result<()> {
        let script = format!(
            "tell application \"Notes\" to tell {} to make new folder with properties {{name:\"{}\"}}",
            self.account_target(),
            escape_applescript(folder)
        );
        self.run(&script).await?;
        tracing::info!(folder = %folder, "Created Notes folder");
        Ok(())
    }

    async fn note_exists(&self, folder: &str, title: &str, marker: &str) -> Result<bool> {
        let script = format!(
            "tell application \"Notes\" to tell {} to return ((count of (notes of folder \"{}\" whose name is \"{}\" and plaintext contains \"{}\")) > 0)",
            self.account_target(),
            escape_applescript(folder),
            escape_applescript(title),
            escape_applescript(marker)
        );
        Ok(self.run(&script).await? == "true")
    }

    async fn create_note(&self, folder: &str, title: &str, html_body: &str) -> Result<()> {
        let script = format!(
            "tell application \"Notes\" to tell {} to make new note at folder \"{}\" with properties {{name:\"{}\", body:\"{}\"}}",
            self.account_target(),
            escape_applescript(folder),
            escape_applescript(title),
            escape_applescript(html_body)
        );
        self.run(&script).await?;
        Ok(())
    }
}

/// Escapes text for use inside an AppleScript string literal
pub fn escape_applescript(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

/// Maps `osascript` error output onto the error taxonomy
///
/// AppleScript reports errors as `execution error: <message> (<code>)`.
pub fn classify_script_error(stderr: &str) -> Md2NoteError {
    let message = if stderr.is_empty() {
        "osascript failed without output".to_string()
    } else {
        stderr.to_string()
    };

    // -1743: automation not permitted, -600/-609: app not running or quit
    if stderr.contains("(-1743)") || stderr.contains("Not authorized") {
        Md2NoteError::Authentication(message)
    } else if stderr.contains("(-600)") || stderr.contains("(-609)") || stderr.contains("(-1712)") {
        Md2NoteError::TransientNetwork(message)
    } else {
        Md2NoteError::DestinationRejected(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_escape_applescript() {
        assert_eq!(
            escape_applescript("say \"hi\"\nC:\\dir"),
            "say \\\"hi\\\"\\nC:\\\\dir"
        );
        assert_eq!(escape_applescript("a\r\nb"), "a\\nb");
    }

    #[test_case("execution error: Not authorized to send Apple events to Notes. (-1743)", "Authentication" ; "not authorized")]
    #[test_case("execution error: Notes got an error: Application isn't running. (-600)", "TransientNetwork" ; "not running")]
    #[test_case("execution error: AppleEvent timed out. (-1712)", "TransientNetwork" ; "timed out")]
    #[test_case("execution error: Notes got an error: Can't get folder \"x\". (-1728)", "DestinationRejected" ; "missing folder")]
    #[test_case("", "DestinationRejected" ; "no output")]
    fn test_classify_script_error(stderr: &str, expected: &str) {
        let kind = match classify_script_error(stderr) {
            Md2NoteError::Authentication(_) => "Authentication",
            Md2NoteError::TransientNetwork(_) => "TransientNetwork",
            Md2NoteError::DestinationRejected(_) => "DestinationRejected",
            other => panic!("unexpected error: {other}"),
        };
        assert_eq!(kind, expected);
    }

    #[tokio::test]
    async fn test_missing_osascript_is_configuration_error() {
        let bridge = OsaScriptBridge::new("/nonexistent/osascript", None);
        let err = bridge.check_available().await.unwrap_err();
        assert!(matches!(err, Md2NoteError::Configuration(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_account_target() {
        assert_eq!(
            OsaScriptBridge::new("/usr/bin/osascript", None).account_target(),
            "default account"
        );
        assert_eq!(
            OsaScriptBridge::new("/usr/bin/osascript", Some("iCloud".to_string())).account_target(),
            "account \"iCloud\""
        );
    }
}
