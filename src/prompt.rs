use serde_json::{Value, json};

use crate::models::AnalysisMode;

const NOT_PROVIDED: &str = "Not provided.";

/// What the invoker sends to the model for one check.
///
/// Strict requests carry a response schema the service enforces; web-search
/// requests cannot, because the search tool and structured output do not
/// combine, so the shape is described in the prompt instead.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    Strict { prompt: String, response_schema: Value },
    WebSearch { prompt: String },
}

impl AnalysisRequest {
    /// Callers validate inputs first; building never fails.
    pub fn build(source_text: &str, text_to_check: &str, use_web_search: bool) -> Self {
        Self::for_mode(source_text, text_to_check, AnalysisMode::from_flag(use_web_search))
    }

    pub fn for_mode(source_text: &str, text_to_check: &str, mode: AnalysisMode) -> Self {
        match mode {
            AnalysisMode::Strict => AnalysisRequest::Strict {
                prompt: strict_prompt(source_text, text_to_check),
                response_schema: response_schema(),
            },
            AnalysisMode::WebSearch => AnalysisRequest::WebSearch {
                prompt: web_search_prompt(source_text, text_to_check),
            },
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        match self {
            AnalysisRequest::Strict { .. } => AnalysisMode::Strict,
            AnalysisRequest::WebSearch { .. } => AnalysisMode::WebSearch,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            AnalysisRequest::Strict { prompt, .. } | AnalysisRequest::WebSearch { prompt } => {
                prompt
            }
        }
    }
}

fn texts_section(source_text: &str, text_to_check: &str) -> String {
    format!(
        "Here are the texts:\n\n---\n**Source Text:**\n{source_text}\n---\n**Text to Check:**\n{text_to_check}\n---\n"
    )
}

fn strict_prompt(source_text: &str, text_to_check: &str) -> String {
    let mut prompt = String::from(
        r#"You are a highly accurate plagiarism detection tool. Your task is to analyze two pieces of text: a "Source Text" and a "Text to Check".

Compare them meticulously and identify all instances of plagiarism, including direct copies and heavily paraphrased sentences.

Your output must be in JSON format.

Based on your analysis, provide:
1. An 'overallSimilarityPercentage' as a number between 0 and 100.
2. A concise 'summary' of your findings.
3. An array called 'similarities', where each object represents a specific instance of plagiarism. Each object in the array must contain:
   - 'sourceText': The exact text snippet from the "Source Text".
   - 'checkedText': The corresponding plagiarized snippet from the "Text to Check".
   - 'explanation': A brief explanation of why this is considered a similarity.

"#,
    );
    prompt.push_str(&texts_section(source_text, text_to_check));
    prompt
}

fn web_search_prompt(source_text: &str, text_to_check: &str) -> String {
    let source = match source_text.trim() {
        "" => NOT_PROVIDED,
        trimmed => trimmed,
    };

    let mut prompt = String::from(
        r#"You are a highly accurate plagiarism detection tool with access to Google Search.
Your task is to analyze the "Text to Check".

1. Use your search capabilities to find any published online sources that contain similar or identical text.
2. If a "Source Text" is provided, also compare the "Text to Check" against it. If "Source Text" is empty, focus solely on web sources.
3. Identify all instances of plagiarism, including direct copies and heavily paraphrased sentences from any source you find (web or provided).

Your final output MUST be a single JSON object wrapped in ```json ... ```. Do not include any other text outside of the JSON block.

The JSON object must conform to this structure:
- 'overallSimilarityPercentage': A number between 0 and 100, considering all sources.
- 'summary': A concise summary of your findings.
- 'similarities': An array where each object represents a specific instance of plagiarism. Each object must contain:
  - 'sourceText': The text snippet from the original source (either the provided "Source Text" or a web source).
  - 'checkedText': The corresponding plagiarized snippet from the "Text to Check".
  - 'explanation': A brief explanation, mentioning the source if it was from the web.

"#,
    );
    prompt.push_str(&texts_section(source, text_to_check));
    prompt
}

/// Structured-output schema in the OpenAPI subset Gemini accepts.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "overallSimilarityPercentage": {
                "type": "NUMBER",
                "description": "A numerical percentage (0-100) representing the overall similarity."
            },
            "summary": {
                "type": "STRING",
                "description": "A brief summary of the plagiarism findings."
            },
            "similarities": {
                "type": "ARRAY",
                "description": "A list of specific text matches found.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "sourceText": {
                            "type": "STRING",
                            "description": "The original text snippet from the source document."
                        },
                        "checkedText": {
                            "type": "STRING",
                            "description": "The matching text snippet from the document being checked."
                        },
                        "explanation": {
                            "type": "STRING",
                            "description": "An explanation of the similarity."
                        }
                    },
                    "required": ["sourceText", "checkedText", "explanation"]
                }
            }
        },
        "required": ["overallSimilarityPercentage", "summary", "similarities"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_request_embeds_texts_and_schema() {
        let req = AnalysisRequest::build("The sky is blue.", "The sky is azure.", false);
        assert_eq!(req.mode(), AnalysisMode::Strict);
        assert!(req.prompt().contains("**Source Text:**\nThe sky is blue.\n"));
        assert!(req.prompt().contains("**Text to Check:**\nThe sky is azure.\n"));
        match req {
            AnalysisRequest::Strict {
                response_schema, ..
            } => {
                assert_eq!(
                    response_schema["required"],
                    json!(["overallSimilarityPercentage", "summary", "similarities"])
                );
                assert_eq!(
                    response_schema["properties"]["similarities"]["items"]["required"],
                    json!(["sourceText", "checkedText", "explanation"])
                );
            }
            other => panic!("expected strict request, got {other:?}"),
        }
    }

    #[test]
    fn test_for_mode_matches_flag_build() {
        let strict = AnalysisRequest::for_mode("a", "b", AnalysisMode::Strict);
        assert_eq!(strict, AnalysisRequest::build("a", "b", false));
        assert_eq!(strict.mode(), AnalysisMode::Strict);

        let web = AnalysisRequest::for_mode("", "b", AnalysisMode::WebSearch);
        assert_eq!(web, AnalysisRequest::build("", "b", true));
        assert_eq!(web.mode(), AnalysisMode::WebSearch);
    }

    #[test]
    fn test_web_search_request_marks_missing_source() {
        let req = AnalysisRequest::build("   ", "Some unique sentence.", true);
        assert_eq!(req.mode(), AnalysisMode::WebSearch);
        assert!(req.prompt().contains("**Source Text:**\nNot provided.\n"));
        assert!(req.prompt().contains("wrapped in ```json ... ```"));
    }

    #[test]
    fn test_web_search_request_keeps_text_to_check_verbatim() {
        let text = "  indented line\nsecond line  ";
        let req = AnalysisRequest::build("source", text, true);
        assert!(req.prompt().contains(&format!("**Text to Check:**\n{text}\n")));
        assert!(req.prompt().contains("**Source Text:**\nsource\n"));
    }
}
