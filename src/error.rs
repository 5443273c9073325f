use thiserror::Error;

/// Errors produced while validating, invoking or parsing a similarity check
#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SimilarityError {
    /// Human-readable message for the page, the MCP client or the terminal.
    pub fn user_message(&self) -> String {
        match self {
            SimilarityError::Validation { reason, .. } => reason.clone(),
            SimilarityError::Transport(msg) | SimilarityError::Parse(msg) => {
                format!("Failed to check plagiarism: {msg}")
            }
            SimilarityError::Config(msg) => msg.clone(),
            SimilarityError::Internal(_) => "An unexpected error occurred.".to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SimilarityError::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, SimilarityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefixes_upstream_failures() {
        let err = SimilarityError::Parse("Invalid response format from API".to_string());
        assert_eq!(
            err.user_message(),
            "Failed to check plagiarism: Invalid response format from API"
        );
    }

    #[test]
    fn test_user_message_keeps_validation_reason() {
        let err = SimilarityError::Validation {
            field: "text_to_check".to_string(),
            reason: "Please provide the text to check against the web.".to_string(),
        };
        assert!(err.is_validation());
        assert_eq!(
            err.user_message(),
            "Please provide the text to check against the web."
        );
    }
}
