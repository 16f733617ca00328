//! Fact-check commentary for a title/subtitle pair, backed by a grounded language model.
//!
//! Failures here are reported as [`FactCheckError`] and never touch video generation.

pub(crate) mod gemini;

use serde::{Deserialize, Serialize};

/// A web page the analysis was grounded on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisSource {
    pub uri: String,
    pub title: String,
}

/// Commentary text plus its deduplicated sources.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub text: String,
    pub sources: Vec<AnalysisSource>,
}

#[derive(thiserror::Error, Debug)]
pub enum FactCheckError {
    /// Missing or empty credentials.
    #[error("{0}")]
    Config(String),

    /// The HTTP call failed or its response could not be decoded.
    #[error("{0}")]
    Upstream(String),

    /// Both title and subtitles were empty; nothing was sent.
    #[error("please provide a title or subtitles to analyze")]
    NothingToAnalyze,
}

impl FactCheckError {
    pub fn kind(&self) -> FactCheckFailure {
        match self {
            Self::Config(_) => FactCheckFailure::Config,
            Self::Upstream(_) => FactCheckFailure::Upstream,
            Self::NothingToAnalyze => FactCheckFailure::NothingToAnalyze,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactCheckFailure {
    Config,
    Upstream,
    NothingToAnalyze,
}

/// Result of one fact-check as a plain value, for callers that display rather than propagate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FactCheckOutcome {
    Analysis(AnalysisResult),
    Failed {
        kind: FactCheckFailure,
        message: String,
    },
}

impl From<Result<AnalysisResult, FactCheckError>> for FactCheckOutcome {
    fn from(res: Result<AnalysisResult, FactCheckError>) -> Self {
        match res {
            Ok(a) => Self::Analysis(a),
            Err(e) => Self::Failed {
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }
}

/// Anything that can comment on a title/subtitle pair.
pub trait ContentAnalyzer {
    fn analyze(&self, title: &str, subtitles: &str) -> Result<AnalysisResult, FactCheckError>;
}

/// Drop sources whose `uri` was already seen, keeping first-occurrence order.
pub fn dedup_sources(sources: Vec<AnalysisSource>) -> Vec<AnalysisSource> {
    let mut seen = std::collections::HashSet::new();
    sources
        .into_iter()
        .filter(|s| seen.insert(s.uri.clone()))
        .collect()
}

/// Reject requests with nothing to analyze before any network traffic.
///
/// Only empty strings count as nothing; whitespace is sent as-is.
pub fn ensure_content(title: &str, subtitles: &str) -> Result<(), FactCheckError> {
    if title.is_empty() && subtitles.is_empty() {
        return Err(FactCheckError::NothingToAnalyze);
    }
    Ok(())
}

/// Instruction sent to the model.
pub fn analysis_prompt(title: &str, subtitles: &str) -> String {
    let subtitles = if subtitles.is_empty() {
        "(No subtitles provided)"
    } else {
        subtitles
    };
    format!(
        "Analyze the following video content for factual accuracy, coherence, and potential \
         improvements.\n\
         The video title is \"{title}\".\n\
         The script/subtitles are:\n\
         ---\n\
         {subtitles}\n\
         ---\n\
         Provide a concise, 4-sentence analysis of the content's strengths and any potential \
         areas for improvement or factual correction. Use Google Search to verify any facts or \
         claims. If the content seems fine, state that."
    )
}

#[cfg(test)]
#[path = "../../tests/unit/factcheck/mod.rs"]
mod tests;
