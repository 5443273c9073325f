use tracing::Instrument;

use crate::error::Result;
use crate::invoker::AnalysisInvoker;
use crate::models::{AnalysisMode, AnalysisResult};
use crate::parser;
use crate::prompt::AnalysisRequest;
use crate::validation::InputValidator;
use crate::visual::VisualOutput;

/// Validate, build, invoke, parse: one similarity check end to end.
pub struct SimilarityChecker {
    invoker: AnalysisInvoker,
    validator: InputValidator,
    visual: VisualOutput,
}

impl SimilarityChecker {
    pub fn new(invoker: AnalysisInvoker, validator: InputValidator) -> Self {
        Self {
            invoker,
            validator,
            visual: VisualOutput::new(),
        }
    }

    pub async fn check(
        &self,
        source_text: &str,
        text_to_check: &str,
        use_web_search: bool,
    ) -> Result<AnalysisResult> {
        let mode = AnalysisMode::from_flag(use_web_search);
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("similarity_check", %request_id, mode = mode.as_str());

        async {
            let outcome = self.run(&request_id, source_text, text_to_check, mode).await;
            match &outcome {
                Ok(result) => {
                    tracing::info!(
                        percentage = result.overall_similarity_percentage(),
                        matches = result.matches().len(),
                        citations = result.web_citations().map_or(0, |c| c.len()),
                        "Similarity check complete"
                    );
                    self.visual.analysis_result(result);
                }
                Err(e) if e.is_validation() => {
                    tracing::warn!("Similarity check rejected: {}", e);
                    self.visual.analysis_failed(e);
                }
                Err(e) => {
                    tracing::error!("Similarity check failed: {}", e);
                    self.visual.analysis_failed(e);
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        request_id: &str,
        source_text: &str,
        text_to_check: &str,
        mode: AnalysisMode,
    ) -> Result<AnalysisResult> {
        self.validator.validate(source_text, text_to_check, mode)?;
        self.visual.analysis_start(request_id, mode);

        let request = AnalysisRequest::for_mode(source_text, text_to_check, mode);
        let raw = self.invoker.invoke(&request).await?;
        parser::parse(raw)
    }
}
