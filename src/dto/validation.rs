//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted sub-activity or timer name.
const MAX_LABEL_LENGTH: usize = 64;

/// Validates a short human-chosen label (sub-activity or timer name):
/// non-blank and at most 64 characters.
pub fn validate_label(label: &str) -> Result<(), ValidationError> {
    if label.trim().is_empty() {
        let mut err = ValidationError::new("label_blank");
        err.message = Some("label must not be blank".into());
        return Err(err);
    }

    if label.len() > MAX_LABEL_LENGTH {
        let mut err = ValidationError::new("label_length");
        err.message = Some(
            format!(
                "label must be at most {MAX_LABEL_LENGTH} characters (got {})",
                label.len()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates a rejection reason: present and non-blank.
pub fn validate_reason(reason: &str) -> Result<(), ValidationError> {
    if reason.trim().is_empty() {
        let mut err = ValidationError::new("reason_blank");
        err.message = Some("a rejection requires a non-empty reason".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_label_valid() {
        assert!(validate_label("quiz").is_ok());
        assert!(validate_label("weekly sprint").is_ok());
    }

    #[test]
    fn test_validate_label_invalid() {
        assert!(validate_label("").is_err());
        assert!(validate_label("   ").is_err());
        assert!(validate_label(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_reason() {
        assert!(validate_reason("no evidence attached").is_ok());
        assert!(validate_reason("").is_err());
        assert!(validate_reason(" \t ").is_err());
    }
}
