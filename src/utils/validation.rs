use crate::utils::error::{MarksError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MarksError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MarksError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(MarksError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MarksError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

pub fn validate_log_level(field_name: &str, level: &str) -> Result<()> {
    if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        return Err(MarksError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: level.to_string(),
            reason: format!("Unsupported level. Valid levels: {}", LOG_LEVELS.join(", ")),
        });
    }
    Ok(())
}

/// Inclusive range check for user input. Unlike the config validators this
/// yields a `ValidationError` carrying only the given message, since it is
/// returned to HTTP callers verbatim.
pub fn validate_range<T: PartialOrd>(value: T, min: T, max: T, message: &str) -> Result<()> {
    if value < min || value > max {
        return Err(MarksError::validation(message));
    }
    Ok(())
}
