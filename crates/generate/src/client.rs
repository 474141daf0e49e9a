//! The `generateContent` call.
//!
//! One request per generation, no retries. A non-success status surfaces the
//! upstream `error.message` when the body carries one.

use deck_core::prompt::{designer_prompt, parse_generated_deck};
use deck_core::{Deck, Error, Result};
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<UpstreamError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    message: Option<String>,
}

/// Client for the Gemini API. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GenerationConfig,
}

impl GeminiClient {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate a deck for a free-text request.
    pub async fn generate_deck(&self, request: &str) -> Result<Deck> {
        let text = self.generate_text(&designer_prompt(request)).await?;
        parse_generated_deck(&text)
    }

    /// Send one prompt and return the first candidate's text.
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let url = self.config.endpoint()?;
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        log::info!("requesting generation from model {}", self.config.model);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::GenerationFailed(e.without_url().to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| Error::GenerationFailed(e.without_url().to_string()))?;
        log::debug!("generation response: HTTP {} ({} bytes)", status, raw.len());

        response_text(status.is_success(), status.as_u16(), &raw)
    }
}

/// Pull the generated text out of a response body.
fn response_text(success: bool, status: u16, raw: &str) -> Result<String> {
    let parsed: Option<GenerateResponse> = serde_json::from_str(raw).ok();

    if !success {
        let message = parsed
            .and_then(|r| r.error)
            .and_then(|e| e.message)
            .unwrap_or_else(|| format!("HTTP {}", status));
        return Err(Error::GenerationFailed(message));
    }

    let response = parsed.ok_or_else(|| {
        Error::MalformedResponse("response body is not valid JSON".to_string())
    })?;
    if let Some(message) = response.error.and_then(|e| e.message) {
        return Err(Error::GenerationFailed(message));
    }
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| Error::MalformedResponse("response has no candidate text".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: "hello" }],
            }],
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"contents":[{"parts":[{"text":"hello"}]}]}"#
        );
    }

    #[test]
    fn test_candidate_text() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"{\"title\":\"x\"}"}],"role":"model"}}]}"#;
        assert_eq!(response_text(true, 200, raw).unwrap(), r#"{"title":"x"}"#);
    }

    #[test]
    fn test_upstream_error_message_is_surfaced() {
        let raw = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        match response_text(false, 400, raw) {
            Err(Error::GenerationFailed(msg)) => assert_eq!(msg, "API key not valid."),
            other => panic!("unexpected: {:?}", other),
        }
        match response_text(false, 503, "Service Unavailable") {
            Err(Error::GenerationFailed(msg)) => assert_eq!(msg, "HTTP 503"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_candidates_is_malformed() {
        assert!(matches!(
            response_text(true, 200, r#"{"candidates":[]}"#),
            Err(Error::MalformedResponse(_))
        ));
        assert!(matches!(
            response_text(true, 200, r#"{"candidates":[{"finishReason":"SAFETY"}]}"#),
            Err(Error::MalformedResponse(_))
        ));
        assert!(matches!(
            response_text(true, 200, "<html>"),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let client = GeminiClient::new(GenerationConfig::default());
        assert!(matches!(
            client.generate_deck("3 slides on renewable energy").await,
            Err(Error::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_generation_failure() {
        let config = GenerationConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..GenerationConfig::default()
        }
        .with_api_key("test");
        let client = GeminiClient::new(config);
        assert!(matches!(
            client.generate_text("hi").await,
            Err(Error::GenerationFailed(_))
        ));
    }
}
