//! # Validation Utilities
//!
//! Input validation and sanitisation helpers used by the HTTP handlers.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum message length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// A run of the same character longer than this is treated as spam.
const MAX_REPEATED_RUN: usize = 20;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{3,20}$").expect("valid username regex"));

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("valid script regex"));

static JS_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("valid javascript regex"));

static EVENT_HANDLER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on\w+=").expect("valid event handler regex"));

/// Validate that a string has between `min` and `max` characters (inclusive).
pub fn validate_char_range(value: &str, min: usize, max: usize, field_name: &str) -> Result<(), String> {
    let len = value.chars().count();
    if len < min || len > max {
        Err(format!("{} must be between {} and {} characters", field_name, min, max))
    } else {
        Ok(())
    }
}

/// Basic email shape check: `local@domain.tld` without whitespace.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Usernames are 3-20 characters of letters, digits, `_` or `-`.
pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

/// Validate chat message content.
///
/// Rejects blank content, content over [`MAX_MESSAGE_LENGTH`] characters and
/// content that repeats one character more than twenty times in a row.
pub fn validate_message(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Message cannot be empty".to_string());
    }

    if content.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(format!("Message is too long (max {} characters)", MAX_MESSAGE_LENGTH));
    }

    if has_repeated_run(content, MAX_REPEATED_RUN) {
        return Err("Message contains too much repetition".to_string());
    }

    Ok(())
}

/// Strip script blocks, `javascript:` URLs and inline event handlers, then
/// trim and cap the length.
pub fn sanitize_message(content: &str) -> String {
    let cleaned = SCRIPT_RE.replace_all(content.trim(), "");
    let cleaned = JS_URL_RE.replace_all(&cleaned, "");
    let cleaned = EVENT_HANDLER_RE.replace_all(&cleaned, "");

    cleaned.chars().take(MAX_MESSAGE_LENGTH).collect()
}

fn has_repeated_run(content: &str, max_run: usize) -> bool {
    let mut prev: Option<char> = None;
    let mut run = 0usize;

    for c in content.chars() {
        if Some(c) == prev {
            run += 1;
        } else {
            prev = Some(c);
            run = 1;
        }
        if run > max_run {
            return true;
        }
    }

    false
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(is_valid_username("alice_01"));
        assert!(is_valid_username("a-b"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("this_name_is_way_too_long"));
        assert!(!is_valid_username("John Doe"));
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("jane@example.com"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane example@x.io"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_validate_message() {
        assert!(validate_message("hello").is_ok());
        assert_eq!(validate_message("   ").unwrap_err(), "Message cannot be empty");
        assert!(validate_message(&"x".repeat(MAX_MESSAGE_LENGTH + 1)).is_err());
        assert_eq!(
            validate_message(&format!("no{}", "o".repeat(25))).unwrap_err(),
            "Message contains too much repetition"
        );
        // Exactly twenty in a row is still fine
        assert!(validate_message(&"z".repeat(20)).is_ok());
    }

    #[test]
    fn test_sanitize_message() {
        assert_eq!(
            sanitize_message("  hi <script>alert(1)</script>there "),
            "hi there"
        );
        assert_eq!(sanitize_message("click JavaScript:void(0)"), "click void(0)");
        assert_eq!(sanitize_message("<img onerror=x>"), "<img x>");
    }

    #[test]
    fn test_validate_char_range() {
        assert!(validate_char_range("Test", 1, 50, "Room name").is_ok());
        assert_eq!(
            validate_char_range("", 1, 50, "Room name").unwrap_err(),
            "Room name must be between 1 and 50 characters"
        );
    }
}
// endregion: --- Tests
