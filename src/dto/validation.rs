//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates a CSS hex color: `#` followed by 3 or 6 hexadecimal digits.
///
/// # Examples
///
/// ```ignore
/// validate_hex_color("#d63384") // Ok
/// validate_hex_color("#fff")    // Ok
/// validate_hex_color("d63384")  // Err - missing '#'
/// ```
pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    let Some(digits) = color.strip_prefix('#') else {
        let mut err = ValidationError::new("color_prefix");
        err.message = Some("Color must start with '#'".into());
        return Err(err);
    };

    if !matches!(digits.len(), 3 | 6) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        let mut err = ValidationError::new("color_format");
        err.message =
            Some(format!("Color must be '#' plus 3 or 6 hexadecimal digits (got `{color}`)").into());
        return Err(err);
    }

    Ok(())
}

/// Rejects names made only of whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        return Err(err);
    }
    Ok(())
}
