//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted event title, in characters.
pub const MAX_TITLE_CHARS: usize = 120;

/// Validates that an event title is 1 to 120 characters and not only whitespace.
///
/// # Examples
///
/// ```ignore
/// validate_event_title("Awards Night") // Ok
/// validate_event_title("   ")          // Err - blank
/// ```
pub fn validate_event_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        let mut err = ValidationError::new("title_blank");
        err.message = Some("Event title must not be blank".into());
        return Err(err);
    }

    let count = title.chars().count();
    if count > MAX_TITLE_CHARS {
        let mut err = ValidationError::new("title_length");
        err.message = Some(
            format!("Event title must be at most {MAX_TITLE_CHARS} characters (got {count})")
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_event_title_valid() {
        assert!(validate_event_title("Awards Night").is_ok());
        assert!(validate_event_title("é").is_ok());
        assert!(validate_event_title(&"x".repeat(MAX_TITLE_CHARS)).is_ok());
    }

    #[test]
    fn test_validate_event_title_invalid() {
        assert!(validate_event_title("").is_err());
        assert!(validate_event_title(" \t ").is_err());
        assert!(validate_event_title(&"x".repeat(MAX_TITLE_CHARS + 1)).is_err());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        assert!(validate_event_title(&"é".repeat(MAX_TITLE_CHARS)).is_ok());
    }
}
