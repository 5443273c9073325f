//! Turns raw model output into a validated [`AnalysisResult`].
//!
//! Strict responses are JSON produced under a response schema. Web-search
//! responses are free text carrying a fenced ```json block, plus grounding
//! chunks reported by the search tool.

use serde::Deserialize;
use std::collections::HashSet;

use crate::error::{Result, SimilarityError};
use crate::invoker::RawResponse;
use crate::models::{AnalysisResult, GroundingChunk, SimilarityMatch, WebCitation};

pub const STRICT_PARSE_ERROR: &str = "Invalid response format from API";
pub const WEB_SEARCH_PARSE_ERROR: &str =
    "Could not parse JSON response from the model when searching the web";

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE_LINE: &str = "\n```";

/// Shape both modes must produce. Every field is required and typed, so a
/// document that parses but lacks a field is still rejected. Match fields
/// must also be non-empty, see [`first_blank_field`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelAnswer {
    overall_similarity_percentage: f64,
    summary: String,
    #[serde(alias = "matches")]
    similarities: Vec<SimilarityMatch>,
}

pub fn parse(raw: RawResponse) -> Result<AnalysisResult> {
    match raw {
        RawResponse::Strict { text } => parse_strict(&text),
        RawResponse::WebSearch {
            text,
            grounding_chunks,
        } => parse_web_search(&text, &grounding_chunks),
    }
}

fn parse_strict(text: &str) -> Result<AnalysisResult> {
    let answer: ModelAnswer = serde_json::from_str(text.trim()).map_err(|e| {
        tracing::error!("Strict response failed validation: {e}");
        SimilarityError::Parse(STRICT_PARSE_ERROR.to_string())
    })?;
    if let Some((index, field)) = first_blank_field(&answer.similarities) {
        tracing::error!(index, field, "Strict response has an empty match field");
        return Err(SimilarityError::Parse(STRICT_PARSE_ERROR.to_string()));
    }

    Ok(AnalysisResult::new(
        answer.overall_similarity_percentage,
        answer.summary,
        answer.similarities,
        None,
    ))
}

fn parse_web_search(text: &str, chunks: &[GroundingChunk]) -> Result<AnalysisResult> {
    let answer: ModelAnswer = extract_fenced_json(text)
        .and_then(|block| {
            serde_json::from_str(block)
                .map_err(|e| tracing::error!("Fenced JSON block failed validation: {e}"))
                .ok()
        })
        .ok_or_else(|| {
            tracing::error!("Raw response text: {text}");
            SimilarityError::Parse(WEB_SEARCH_PARSE_ERROR.to_string())
        })?;
    if let Some((index, field)) = first_blank_field(&answer.similarities) {
        tracing::error!(index, field, "Fenced JSON block has an empty match field");
        return Err(SimilarityError::Parse(WEB_SEARCH_PARSE_ERROR.to_string()));
    }

    let citations = dedup_citations(collect_citations(chunks));
    let web_citations = if citations.is_empty() {
        None
    } else {
        Some(citations)
    };

    Ok(AnalysisResult::new(
        answer.overall_similarity_percentage,
        answer.summary,
        answer.similarities,
        web_citations,
    ))
}

/// Position and wire name of the first empty snippet or explanation.
///
/// Whitespace counts as content; snippets are kept verbatim.
fn first_blank_field(matches: &[SimilarityMatch]) -> Option<(usize, &'static str)> {
    matches.iter().enumerate().find_map(|(index, m)| {
        let field = if m.source_text.is_empty() {
            "sourceText"
        } else if m.checked_text.is_empty() {
            "checkedText"
        } else if m.explanation.is_empty() {
            "explanation"
        } else {
            return None;
        };
        Some((index, field))
    })
}

/// Body of the first ```json fenced block, if one is present and closed.
///
/// The opening marker must be followed by a line break; the body ends at the
/// next ``` fence that starts a line.
pub fn extract_fenced_json(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(pos) = text[search_from..].find(FENCE_OPEN) {
        let after_marker = search_from + pos + FENCE_OPEN.len();
        let rest = &text[after_marker..];
        let body_start = if rest.starts_with("\r\n") {
            Some(after_marker + 2)
        } else if rest.starts_with('\n') {
            Some(after_marker + 1)
        } else {
            None
        };

        if let Some(start) = body_start {
            let body_end = start + text[start..].find(FENCE_CLOSE_LINE)?;
            let body = &text[start..body_end];
            let body = body.strip_suffix('\r').unwrap_or(body);
            if body.trim().is_empty() {
                return None;
            }
            return Some(body);
        }
        search_from = after_marker;
    }
    None
}

/// Usable web sources from the grounding chunks, in their original order.
///
/// Chunks without a non-empty `uri` are dropped; a missing or empty title
/// falls back to the uri.
pub fn collect_citations(chunks: &[GroundingChunk]) -> Vec<WebCitation> {
    chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .filter_map(|web| {
            let uri = web.uri.as_deref().filter(|u| !u.is_empty())?;
            let title = web
                .title
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(uri);
            Some(WebCitation {
                uri: uri.to_string(),
                title: title.to_string(),
            })
        })
        .collect()
}

/// Keeps the first citation for each uri.
pub fn dedup_citations(citations: Vec<WebCitation>) -> Vec<WebCitation> {
    let mut seen = HashSet::new();
    citations
        .into_iter()
        .filter(|c| seen.insert(c.uri.clone()))
        .collect()
}
