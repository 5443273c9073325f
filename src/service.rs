use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{CallToolResult, Content, ErrorData, ServerCapabilities, ServerInfo},
};
use rmcp_macros::{tool, tool_handler, tool_router};
use std::future::Future;
use std::sync::Arc;

use crate::checker::SimilarityChecker;
use crate::config::Config;
use crate::models::CheckSimilarityParams;
use crate::visual::render_text;

/// MCP server exposing the similarity check as a tool
#[derive(Clone)]
pub struct SimilarityService {
    tool_router: ToolRouter<Self>,
    checker: Arc<SimilarityChecker>,
    config: Arc<Config>,
}

impl SimilarityService {
    pub fn new(checker: Arc<SimilarityChecker>, config: Arc<Config>) -> Self {
        tracing::info!("Service::new() - similarity tool router ready");
        Self {
            tool_router: Self::tool_router(),
            checker,
            config,
        }
    }
}

#[tool_router]
impl SimilarityService {
    #[tool(
        description = "Compare a text against a source text (or published web sources) and report an overall similarity percentage, a summary and matched passages"
    )]
    pub async fn check_similarity(
        &self,
        params: Parameters<CheckSimilarityParams>,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        let params = params.0;
        let source_text = params.source_text.unwrap_or_default();
        let use_web_search = params.use_web_search.unwrap_or(false);

        match self
            .checker
            .check(&source_text, &params.text_to_check, use_web_search)
            .await
        {
            Ok(result) => {
                let content = Content::json(&result).map_err(|e| {
                    ErrorData::internal_error(format!("Failed to create JSON content: {e}"), None)
                })?;
                Ok(CallToolResult::success(vec![
                    content,
                    Content::text(render_text(&result)),
                ]))
            }
            Err(e) if e.is_validation() => Err(ErrorData::invalid_params(e.user_message(), None)),
            Err(e) => {
                tracing::error!("check_similarity error: {}", e);
                Err(ErrorData::internal_error(e.user_message(), None))
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for SimilarityService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: rmcp::model::ProtocolVersion::V_2024_11_05,
            server_info: rmcp::model::Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
            },
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            instructions: Some(
                "Similarity checker: call check_similarity with text_to_check, plus source_text or use_web_search".into(),
            ),
        }
    }
}
