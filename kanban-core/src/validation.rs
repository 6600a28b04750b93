//! Input validation shared by every mutating operation

use crate::{Order, ValidationError};

/// Maximum length of titles and names, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// Trim a required name or title, rejecting empty and oversized values.
pub fn require_name(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        });
    }
    let len = trimmed.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            len,
            max: MAX_NAME_LEN,
        });
    }
    Ok(trimmed.to_string())
}

/// Normalize an optional free-text field: blank becomes `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Convert a requested position into a list index.
pub fn require_index(field: &str, value: Order) -> Result<usize, ValidationError> {
    usize::try_from(value).map_err(|_| ValidationError::InvalidValue {
        field: field.to_string(),
        reason: format!("must be zero or greater, got {}", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_name_trims() {
        assert_eq!(require_name("title", "  Ship it "), Ok("Ship it".to_string()));
    }

    #[test]
    fn test_require_name_rejects_blank() {
        assert_eq!(
            require_name("title", "   "),
            Err(ValidationError::RequiredFieldMissing {
                field: "title".to_string()
            })
        );
    }

    #[test]
    fn test_require_name_rejects_long() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            require_name("name", &long),
            Err(ValidationError::TooLong { len, .. }) if len == MAX_NAME_LEN + 1
        ));
        assert!(require_name("name", &"x".repeat(MAX_NAME_LEN)).is_ok());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(Some(" bug ".to_string())), Some("bug".to_string()));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_require_index() {
        assert_eq!(require_index("new_index", 3), Ok(3));
        assert!(matches!(
            require_index("new_index", -1),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
