//! Input validation for CLI arguments

use crate::error::{DebugError, Result};

/// Longest accepted `--timeout`, one day.
const MAX_TIMEOUT_SECS: u64 = 86400;

/// The TaskRun limit must be a positive number
pub fn validate_limit(limit: i64) -> Result<()> {
    if limit <= 0 {
        return Err(DebugError::InvalidLimit(limit));
    }
    Ok(())
}

/// Validate timeout value is reasonable
pub fn validate_timeout(timeout: u64) -> Result<()> {
    if timeout == 0 {
        Err(DebugError::Config(
            "Timeout must be greater than 0".to_string(),
        ))
    } else if timeout > MAX_TIMEOUT_SECS {
        Err(DebugError::Config(format!(
            "Timeout of {} seconds is unreasonably large (max: {})",
            timeout, MAX_TIMEOUT_SECS
        )))
    } else {
        Ok(())
    }
}

/// Polling the API server in a tight loop is not allowed
pub fn validate_poll_interval(millis: u64) -> Result<()> {
    if millis == 0 {
        return Err(DebugError::Config(
            "Poll interval must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Parse a `--shell` value into a command line
pub fn parse_shell(shell: &str) -> Result<Vec<String>> {
    let words = shell_words::split(shell)
        .map_err(|e| DebugError::Config(format!("Invalid shell command '{shell}': {e}")))?;
    if words.is_empty() {
        return Err(DebugError::Config("Shell command is empty".to_string()));
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_limit() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(100).is_ok());
        assert_eq!(
            validate_limit(0).unwrap_err().to_string(),
            "limit was 0 but must be a positive number"
        );
        assert_eq!(
            validate_limit(-5).unwrap_err().to_string(),
            "limit was -5 but must be a positive number"
        );
    }

    #[test]
    fn test_validate_timeout() {
        assert!(validate_timeout(0).is_err());
        assert!(validate_timeout(60).is_ok());
        assert!(validate_timeout(86400).is_ok());
        assert!(validate_timeout(86401).is_err());
    }

    #[test]
    fn test_validate_poll_interval() {
        assert!(validate_poll_interval(1).is_ok());
        assert!(validate_poll_interval(1000).is_ok());
        assert_eq!(
            validate_poll_interval(0).unwrap_err().to_string(),
            "Configuration error: Poll interval must be greater than 0"
        );
    }

    #[test]
    fn test_parse_shell() {
        assert_eq!(parse_shell("sh").unwrap(), vec!["sh"]);
        assert_eq!(
            parse_shell("bash -c 'echo hi; exec bash'").unwrap(),
            vec!["bash", "-c", "echo hi; exec bash"]
        );
        assert!(parse_shell("").is_err());
        assert!(parse_shell("bash 'open").is_err());
    }
}
