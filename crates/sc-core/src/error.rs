use thiserror::Error;

/// A document entity failed validation. `path` names the offending field
/// (e.g. `pages[2].textBoxes[0].geometry.w`), so callers can surface the
/// exact location to the user.
///
/// Missing-id conditions are deliberately *not* errors: operations that
/// reference an id that no longer exists return `None`/`false`, since those
/// races are expected during concurrent UI interaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid value at {path}: {message}")]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias for validation results.
pub type Result<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path() {
        let err = ValidationError::new("pages[0].width", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid value at pages[0].width: must be positive"
        );
    }
}
