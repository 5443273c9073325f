use crate::error::{Result, SimilarityError};
use crate::models::AnalysisMode;

pub const MISSING_WEB_TEXT: &str = "Please provide the text to check against the web.";
pub const MISSING_BOTH_TEXTS: &str = "Please provide both a source text and a text to check.";

/// Input validator, run before any external call is made
pub struct InputValidator {
    max_text_chars: usize,
}

impl InputValidator {
    pub fn new(max_text_chars: usize) -> Self {
        Self { max_text_chars }
    }

    pub fn validate(
        &self,
        source_text: &str,
        text_to_check: &str,
        mode: AnalysisMode,
    ) -> Result<()> {
        match mode {
            AnalysisMode::WebSearch => {
                if text_to_check.trim().is_empty() {
                    return Err(SimilarityError::Validation {
                        field: "text_to_check".to_string(),
                        reason: MISSING_WEB_TEXT.to_string(),
                    });
                }
            }
            AnalysisMode::Strict => {
                if source_text.trim().is_empty() || text_to_check.trim().is_empty() {
                    let field = if source_text.trim().is_empty() {
                        "source_text"
                    } else {
                        "text_to_check"
                    };
                    return Err(SimilarityError::Validation {
                        field: field.to_string(),
                        reason: MISSING_BOTH_TEXTS.to_string(),
                    });
                }
            }
        }

        self.validate_length("source_text", "Source text", source_text)?;
        self.validate_length("text_to_check", "Text to check", text_to_check)
    }

    fn validate_length(&self, field: &str, label: &str, text: &str) -> Result<()> {
        let len = text.chars().count();
        if len > self.max_text_chars {
            return Err(SimilarityError::Validation {
                field: field.to_string(),
                reason: format!(
                    "{label} is too long ({len} characters, maximum {})",
                    self.max_text_chars
                ),
            });
        }
        Ok(())
    }
}
