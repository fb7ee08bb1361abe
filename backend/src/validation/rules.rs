//! Common validation rules shared across request payloads.

use validator::ValidationError;

pub const REQUIRED: &str = "required";
pub const EMAIL_FORMAT: &str = "email_format";

/// Rejects empty and whitespace-only values.
pub fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(REQUIRED));
    }
    Ok(())
}

/// Accepts `local@domain.tld`: no whitespace, exactly one `@`, and a dot
/// inside the domain with text on both sides.
pub fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::new(REQUIRED));
    }
    if is_email_like(email) {
        Ok(())
    } else {
        Err(ValidationError::new(EMAIL_FORMAT))
    }
}

fn is_email_like(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(idx, c)| c == '.' && idx > 0 && idx + 1 < domain.len())
}
