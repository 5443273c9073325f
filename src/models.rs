use serde::{Deserialize, Serialize};

/// One overlapping passage reported by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityMatch {
    pub source_text: String,
    pub checked_text: String,
    pub explanation: String,
}

/// A web page the model reports having consulted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebCitation {
    pub uri: String,
    pub title: String,
}

/// Validated outcome of a single similarity check.
///
/// Built once by the parser and never mutated afterwards; a new check
/// produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    overall_similarity_percentage: f64,
    summary: String,
    matches: Vec<SimilarityMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_citations: Option<Vec<WebCitation>>,
}

impl AnalysisResult {
    pub(crate) fn new(
        overall_similarity_percentage: f64,
        summary: String,
        matches: Vec<SimilarityMatch>,
        web_citations: Option<Vec<WebCitation>>,
    ) -> Self {
        Self {
            overall_similarity_percentage,
            summary,
            matches,
            web_citations,
        }
    }

    pub fn overall_similarity_percentage(&self) -> f64 {
        self.overall_similarity_percentage
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn matches(&self) -> &[SimilarityMatch] {
        &self.matches
    }

    pub fn web_citations(&self) -> Option<&[WebCitation]> {
        self.web_citations.as_deref()
    }
}

/// Which comparison the caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Strict,
    WebSearch,
}

impl AnalysisMode {
    pub fn from_flag(use_web_search: bool) -> Self {
        if use_web_search {
            AnalysisMode::WebSearch
        } else {
            AnalysisMode::Strict
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Strict => "strict",
            AnalysisMode::WebSearch => "web_search",
        }
    }
}

/// Parameters for the check_similarity tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CheckSimilarityParams {
    #[schemars(
        description = "Original text to compare against. Optional when use_web_search is true"
    )]
    #[serde(default)]
    pub source_text: Option<String>,

    #[schemars(description = "The text to check for similarity")]
    pub text_to_check: String,

    #[schemars(description = "Also search published web sources (default false)")]
    #[serde(default)]
    pub use_web_search: Option<bool>,
}

/// Body of POST /api/check
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckRequest {
    pub source_text: String,
    pub text_to_check: String,
    pub use_web_search: bool,
}

// Gemini generateContent request format
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<GeminiTool>>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

impl GeminiContent {
    pub fn user(text: String) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![GeminiPart { text: Some(text) }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeminiTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct GoogleSearch {}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

// Gemini generateContent response format
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebChunk>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct WebChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }

    pub fn grounding_chunks(&self) -> Vec<GroundingChunk> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| m.grounding_chunks.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_serializes_camel_case_without_citations() {
        let result = AnalysisResult::new(
            42.0,
            "Some overlap".to_string(),
            vec![SimilarityMatch {
                source_text: "a".to_string(),
                checked_text: "b".to_string(),
                explanation: "c".to_string(),
            }],
            None,
        );
        let value = serde_json::to_value(&result).expect("serialize result");
        assert_eq!(value["overallSimilarityPercentage"], json!(42.0));
        assert_eq!(value["matches"][0]["checkedText"], json!("b"));
        assert!(value.get("webCitations").is_none());
    }

    #[test]
    fn test_web_search_request_serializes_tool() {
        let req = GenerateContentRequest {
            contents: vec![GeminiContent::user("hi".to_string())],
            tools: Some(vec![GeminiTool {
                google_search: Some(GoogleSearch {}),
            }]),
            generation_config: GenerationConfig {
                temperature: 0.2,
                response_mime_type: None,
                response_schema: None,
            },
        };
        let value = serde_json::to_value(&req).expect("serialize request");
        assert_eq!(value["tools"], json!([{ "googleSearch": {} }]));
        assert_eq!(value["contents"][0]["parts"][0]["text"], json!("hi"));
        assert!(value["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_response_text_and_grounding() {
        let raw = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hello, " }, { "text": "world" }] },
                "finishReason": "STOP",
                "groundingMetadata": {
                    "groundingChunks": [{ "web": { "uri": "https://a.com", "title": "A" } }]
                }
            }]
        });
        let resp: GenerateContentResponse =
            serde_json::from_value(raw).expect("deserialize response");
        assert_eq!(resp.text().as_deref(), Some("Hello, world"));
        let chunks = resp.grounding_chunks();
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].web.as_ref().and_then(|w| w.uri.as_deref()),
            Some("https://a.com")
        );
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let resp: GenerateContentResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))
                .expect("deserialize response");
        assert!(resp.text().is_none());
        assert!(resp.grounding_chunks().is_empty());
    }
}
