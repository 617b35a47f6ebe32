//! Input validation for registration.

use crate::types::AuthError;

/// Validate email shape: one `@`, a non-empty local part, and a domain with
/// a dot.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.len() > 255 {
        return Err(AuthError::Validation("Email too long".to_string()));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::Validation("Invalid email format".to_string()));
    };

    let domain_ok = domain.split_once('.').is_some_and(|(host, tld)| {
        !host.is_empty() && !tld.is_empty() && !tld.ends_with('.')
    });

    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(AuthError::Validation("Invalid email format".to_string()));
    }

    Ok(())
}

/// Validate password strength requirements
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < 8 {
        return Err(AuthError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(AuthError::Validation(
            "Password must be less than 128 characters long".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::Validation(
            "Password must contain at least one digit".to_string(),
        ));
    }

    if !password.chars().any(char::is_alphabetic) {
        return Err(AuthError::Validation(
            "Password must contain at least one letter".to_string(),
        ));
    }

    Ok(())
}

/// Validate display name
pub fn validate_display_name(display_name: &str) -> Result<(), AuthError> {
    if display_name.trim().is_empty() {
        return Err(AuthError::Validation(
            "Display name cannot be empty".to_string(),
        ));
    }

    if display_name.len() > 50 {
        return Err(AuthError::Validation(
            "Display name must be less than 50 characters long".to_string(),
        ));
    }

    let disallowed_chars = ['\n', '\r', '\t', '\0'];
    if display_name.chars().any(|c| disallowed_chars.contains(&c)) {
        return Err(AuthError::Validation(
            "Display name contains invalid characters".to_string(),
        ));
    }

    Ok(())
}
