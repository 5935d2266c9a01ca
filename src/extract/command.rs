//! Helpers for running the external extraction tools.

use std::path::Path;
use std::process::Output;

use super::backend::ExtractionError;

/// Turn a finished command into its stdout, or the matching error.
pub fn handle_cmd_output(
    result: std::io::Result<Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, ExtractionError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractionError::ExtractionFailed(format!(
                    "{}: {}",
                    error_prefix,
                    stderr.trim()
                )))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Check if a binary is available, either as an explicit path or in PATH.
pub fn check_binary(name: impl AsRef<Path>) -> bool {
    let name = name.as_ref();
    if name.components().count() > 1 {
        return name.is_file();
    }
    which::which(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_maps_to_tool_not_found() {
        let result = std::process::Command::new("definitely-not-a-real-tool-docsum").output();
        let err = handle_cmd_output(result, "fake tool", "fake failed").unwrap_err();
        assert!(matches!(err, ExtractionError::ToolNotFound(ref t) if t == "fake tool"));
    }

    #[test]
    fn test_check_binary_explicit_missing_path() {
        assert!(!check_binary("/nonexistent/dir/tesseract"));
    }
}
