pub mod checker;
pub mod config;
pub mod error;
pub mod invoker;
pub mod models;
pub mod parser;
pub mod prompt;
pub mod service;
pub mod transport;
pub mod validation;
pub mod visual;
pub mod web;

use std::sync::Arc;

use crate::checker::SimilarityChecker;
use crate::config::Config;
use crate::invoker::AnalysisInvoker;
use crate::transport::Transport;
use crate::validation::InputValidator;

/// Wire a checker around an already-constructed transport.
pub fn build_checker(cfg: &Config, transport: Arc<dyn Transport>) -> SimilarityChecker {
    let invoker = AnalysisInvoker::new(
        transport,
        cfg.gemini.model.clone(),
        cfg.gemini.temperature,
    );
    SimilarityChecker::new(invoker, InputValidator::new(cfg.limits.max_text_chars))
}
