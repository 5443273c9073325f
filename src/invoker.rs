use std::sync::Arc;

use crate::error::{Result, SimilarityError};
use crate::models::{
    AnalysisMode, GeminiContent, GeminiTool, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, GoogleSearch, GroundingChunk,
};
use crate::prompt::AnalysisRequest;
use crate::transport::Transport;

/// Unparsed model output, tagged by the mode that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    Strict {
        text: String,
    },
    WebSearch {
        text: String,
        grounding_chunks: Vec<GroundingChunk>,
    },
}

impl RawResponse {
    pub fn mode(&self) -> AnalysisMode {
        match self {
            RawResponse::Strict { .. } => AnalysisMode::Strict,
            RawResponse::WebSearch { .. } => AnalysisMode::WebSearch,
        }
    }
}

pub struct AnalysisInvoker {
    tx: Arc<dyn Transport>,
    model: String,
    temperature: f64,
}

impl AnalysisInvoker {
    pub fn new(tx: Arc<dyn Transport>, model: String, temperature: f64) -> Self {
        Self {
            tx,
            model,
            temperature,
        }
    }

    fn to_wire(&self, request: &AnalysisRequest) -> GenerateContentRequest {
        match request {
            AnalysisRequest::Strict {
                prompt,
                response_schema,
            } => GenerateContentRequest {
                contents: vec![GeminiContent::user(prompt.clone())],
                tools: None,
                generation_config: GenerationConfig {
                    temperature: self.temperature,
                    response_mime_type: Some("application/json".to_string()),
                    response_schema: Some(response_schema.clone()),
                },
            },
            AnalysisRequest::WebSearch { prompt } => GenerateContentRequest {
                contents: vec![GeminiContent::user(prompt.clone())],
                tools: Some(vec![GeminiTool {
                    google_search: Some(GoogleSearch {}),
                }]),
                generation_config: GenerationConfig {
                    temperature: self.temperature,
                    response_mime_type: None,
                    response_schema: None,
                },
            },
        }
    }

    /// Single call to the model service; no retry, no caching.
    pub async fn invoke(&self, request: &AnalysisRequest) -> Result<RawResponse> {
        let wire = self.to_wire(request);
        tracing::info!(
            model = %self.model,
            mode = request.mode().as_str(),
            "Invoking model for similarity analysis"
        );

        let response = self.tx.generate_content(&self.model, &wire).await?;
        let text = response_text(&response)?;

        Ok(match request {
            AnalysisRequest::Strict { .. } => RawResponse::Strict { text },
            AnalysisRequest::WebSearch { .. } => RawResponse::WebSearch {
                text,
                grounding_chunks: response.grounding_chunks(),
            },
        })
    }
}

fn response_text(response: &GenerateContentResponse) -> Result<String> {
    if let Some(text) = response.text() {
        return Ok(text);
    }
    let reason = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone())
        .or_else(|| {
            response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
        });
    Err(SimilarityError::Transport(match reason {
        Some(reason) => format!("Gemini API returned no text (reason: {reason})"),
        None => "Gemini API returned no text".to_string(),
    }))
}
