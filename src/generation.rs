//! Generation service adapter.
//!
//! One prompt in, one text out. The engine talks to the service through the
//! [`TextGenerator`] trait so tests can script responses; production uses
//! [`GeminiClient`], a thin `reqwest` wrapper around the Gemini
//! `generateContent` REST endpoint. No retry and no streaming; a timed-out
//! or failed call surfaces as a [`GenerationError`] and the user retries by
//! resubmitting.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::prompts::PromptConfig;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Failure modes of a generation call.
#[derive(Debug, Clone)]
pub enum GenerationError {
    /// The request never produced an HTTP response.
    Request(String),
    /// The service answered with a non-success status.
    Status(u16, String),
    /// The request exceeded the configured timeout.
    Timeout(u64),
    /// The service answered but the candidate text was empty.
    Empty,
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::Request(msg) => write!(f, "request error: {msg}"),
            GenerationError::Status(code, msg) => write!(f, "status {code}: {msg}"),
            GenerationError::Timeout(secs) => write!(f, "timed out after {secs}s"),
            GenerationError::Empty => write!(f, "empty response"),
        }
    }
}

impl std::error::Error for GenerationError {}

/// The narrow interface the engine sees: a prompt string in, generated text
/// out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    system_instruction: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(config: &Config, prompts: &PromptConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            system_instruction: prompts.system_instruction.clone(),
            timeout: config.request_timeout,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{GEMINI_API_BASE}/{model}:generateContent?key={key}",
            model = self.model,
            key = self.api_key
        );

        let body = GenerateContentRequest {
            system_instruction: Content {
                parts: vec![Part {
                    text: &self.system_instruction,
                }],
            },
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "sending generation request");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    GenerationError::Timeout(self.timeout.as_secs())
                } else {
                    GenerationError::Request(err.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&body_text)
                .map(|wrapper| wrapper.error.message)
                .unwrap_or(body_text);
            error!(status, %message, "generation request rejected");
            return Err(GenerationError::Status(status, message));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::Request(err.to_string()))?;

        let text = extract_candidate_text(parsed)?;

        info!(response_len = text.len(), "generation request completed");

        Ok(text)
    }
}

fn extract_candidate_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::Empty);
    }

    Ok(text)
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_text_extraction() {
        let response = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(ResponseContent {
                    parts: vec![
                        ResponsePart {
                            text: Some("first ".to_string()),
                        },
                        ResponsePart {
                            text: Some("second".to_string()),
                        },
                    ],
                }),
            }],
        };

        assert_eq!(extract_candidate_text(response).unwrap(), "first second");
    }

    #[test]
    fn test_empty_candidates_are_an_error() {
        let no_candidates = GenerateContentResponse { candidates: vec![] };
        assert!(matches!(
            extract_candidate_text(no_candidates),
            Err(GenerationError::Empty)
        ));

        let blank = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(ResponseContent {
                    parts: vec![ResponsePart {
                        text: Some("   ".to_string()),
                    }],
                }),
            }],
        };
        assert!(matches!(
            extract_candidate_text(blank),
            Err(GenerationError::Empty)
        ));
    }
}
