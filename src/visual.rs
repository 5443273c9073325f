use colored::*;

use crate::error::SimilarityError;
use crate::models::{AnalysisMode, AnalysisResult};

/// Bucket used to colour the similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Low,
    Moderate,
    High,
    Severe,
}

impl ScoreBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage > 75.0 {
            ScoreBand::Severe
        } else if percentage > 50.0 {
            ScoreBand::High
        } else if percentage > 25.0 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Low
        }
    }

    fn paint(&self, s: &str) -> ColoredString {
        match self {
            ScoreBand::Low => s.bright_green(),
            ScoreBand::Moderate => s.bright_yellow(),
            ScoreBand::High => s.yellow(),
            ScoreBand::Severe => s.bright_red(),
        }
    }
}

/// Terminal rendering of checks. Writes to stderr; stdout belongs to MCP.
#[derive(Debug, Clone, Default)]
pub struct VisualOutput;

impl VisualOutput {
    pub fn new() -> Self {
        Self
    }

    pub fn analysis_start(&self, request_id: &str, mode: AnalysisMode) {
        let label = match mode {
            AnalysisMode::Strict => "text-to-text",
            AnalysisMode::WebSearch => "web search",
        };
        eprintln!(
            "{} {} {}",
            "🔎".bright_cyan(),
            format!("Checking similarity ({label})").bright_cyan(),
            request_id.dimmed()
        );
    }

    pub fn analysis_result(&self, result: &AnalysisResult) {
        let pct = result.overall_similarity_percentage();
        let band = ScoreBand::from_percentage(pct);
        eprintln!(
            "   {} {}",
            "Overall similarity:".white(),
            band.paint(&format!("{}%", pct.round())).bold()
        );
        if !result.summary().is_empty() {
            eprintln!("   {}", result.summary().italic());
        }
        if let Some(citations) = result.web_citations() {
            eprintln!("   {} {}", "🌐".bright_blue(), "Web sources:".bright_blue());
            for c in citations {
                eprintln!("      {} {}", c.title.white(), c.uri.dimmed());
            }
        }
        if result.matches().is_empty() {
            eprintln!("   {}", "No significant similarities found".bright_green());
        }
        for (i, m) in result.matches().iter().enumerate() {
            eprintln!(
                "   {} {}",
                format!("Match #{}", i + 1).bright_blue(),
                m.explanation.italic()
            );
            eprintln!("      {} {}", "source:".red(), m.source_text);
            eprintln!("      {} {}", "checked:".green(), m.checked_text);
        }
    }

    pub fn analysis_failed(&self, err: &SimilarityError) {
        eprintln!("   {} {}", "❌".bright_red(), err.user_message().red());
    }
}

/// Plain-text report, used alongside the JSON payload for MCP clients.
pub fn render_text(result: &AnalysisResult) -> String {
    let mut out = format!(
        "Overall similarity: {}%\n{}\n",
        result.overall_similarity_percentage().round(),
        result.summary()
    );
    if let Some(citations) = result.web_citations() {
        out.push_str("\nWeb sources:\n");
        for c in citations {
            out.push_str(&format!("- {} <{}>\n", c.title, c.uri));
        }
    }
    if result.matches().is_empty() {
        out.push_str("\nNo significant similarities found.\n");
    }
    for (i, m) in result.matches().iter().enumerate() {
        out.push_str(&format!(
            "\nMatch #{}: {}\n  Source:  {}\n  Checked: {}\n",
            i + 1,
            m.explanation,
            m.source_text,
            m.checked_text
        ));
    }
    out
}
