use thiserror::Error;

/// Rejections raised synchronously by the widget configuration setters.
///
/// These signal caller contract violations, not runtime conditions; there is
/// no recovery policy beyond fixing the offending value.
#[derive(Debug, Error)]
pub enum ChooserError {
    #[error("invalid MIME type {0:?}: expected \"type\" or \"type/subtype\"")]
    InvalidMimeType(String),
    #[error("invalid filter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_error_names_the_offending_value() {
        let err = ChooserError::InvalidMimeType("not a type".into());
        assert!(err.to_string().contains("not a type"));
    }

    #[test]
    fn pattern_error_wraps_the_regex_failure() {
        let err: ChooserError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, ChooserError::InvalidPattern(_)));
    }
}
