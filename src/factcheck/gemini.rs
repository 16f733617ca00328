use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::factcheck::{
    AnalysisResult, AnalysisSource, ContentAnalyzer, FactCheckError, analysis_prompt,
    dedup_sources, ensure_content,
};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_VAR: &str = "API_KEY";
const MODEL_VAR: &str = "FACTCHECK_MODEL";
const ENDPOINT_VAR: &str = "FACTCHECK_ENDPOINT";

/// Connection settings, read from the environment at call time.
#[derive(Clone, PartialEq, Eq)]
pub struct FactCheckConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL; `/models/{model}:generateContent` is appended.
    pub endpoint: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for FactCheckConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactCheckConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl FactCheckConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_env() -> Result<Self, FactCheckError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, FactCheckError> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                FactCheckError::Config(
                    "API_KEY environment variable not set. Please configure it to use AI features."
                        .to_owned(),
                )
            })?;
        let mut cfg = Self::new(api_key.trim());
        if let Some(model) = lookup(MODEL_VAR).filter(|m| !m.trim().is_empty()) {
            cfg.model = model.trim().to_owned();
        }
        if let Some(endpoint) = lookup(ENDPOINT_VAR).filter(|e| !e.trim().is_empty()) {
            cfg.endpoint = endpoint.trim().trim_end_matches('/').to_owned();
        }
        Ok(cfg)
    }

    pub fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
    tools: [Tool; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

fn request_body(prompt: &str) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: [RequestContent {
            role: "user",
            parts: [RequestPart { text: prompt }],
        }],
        tools: [Tool {
            google_search: serde_json::Map::new(),
        }],
    }
}

/// Extract text and deduplicated web sources from a `generateContent` response body.
pub(crate) fn parse_response(body: &str) -> Result<AnalysisResult, FactCheckError> {
    let resp: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| FactCheckError::Upstream(format!("malformed analysis response: {e}")))?;
    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Err(FactCheckError::Upstream(
            "analysis response contained no candidates".to_owned(),
        ));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let sources = candidate
        .grounding_metadata
        .map(|g| g.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| {
            let uri = web.uri?;
            let title = web.title.unwrap_or_else(|| uri.clone());
            Some(AnalysisSource { uri, title })
        })
        .collect();

    Ok(AnalysisResult {
        text,
        sources: dedup_sources(sources),
    })
}

/// Blocking client for the Gemini `generateContent` API with Google Search grounding.
#[derive(Debug)]
pub struct GeminiClient {
    cfg: FactCheckConfig,
    http: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(cfg: FactCheckConfig) -> Result<Self, FactCheckError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| FactCheckError::Upstream(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { cfg, http })
    }

    pub fn from_env() -> Result<Self, FactCheckError> {
        Self::new(FactCheckConfig::from_env()?)
    }

    pub fn config(&self) -> &FactCheckConfig {
        &self.cfg
    }
}

impl ContentAnalyzer for GeminiClient {
    #[tracing::instrument(skip_all, fields(model = %self.cfg.model))]
    fn analyze(&self, title: &str, subtitles: &str) -> Result<AnalysisResult, FactCheckError> {
        ensure_content(title, subtitles)?;
        let prompt = analysis_prompt(title, subtitles);
        let body = request_body(&prompt);

        let resp = self
            .http
            .post(self.cfg.url())
            .header("x-goog-api-key", &self.cfg.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                tracing::warn!(error = %e, "analysis request failed");
                FactCheckError::Upstream(format!("Failed to get analysis from Gemini: {e}"))
            })?;

        let status = resp.status();
        let text = resp.text().map_err(|e| {
            FactCheckError::Upstream(format!("failed to read analysis response: {e}"))
        })?;
        if !status.is_success() {
            tracing::warn!(%status, "analysis request rejected");
            return Err(FactCheckError::Upstream(format!(
                "Failed to get analysis from Gemini: HTTP {status}: {}",
                text.chars().take(300).collect::<String>()
            )));
        }

        let result = parse_response(&text)?;
        tracing::info!(sources = result.sources.len(), "analysis complete");
        Ok(result)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/factcheck/gemini.rs"]
mod tests;
