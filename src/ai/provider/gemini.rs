//! Gemini API Provider
//!
//! Generative model client over the `generateContent` and
//! `streamGenerateContent` endpoints. JSON-constrained requests set
//! `responseMimeType`/`responseSchema`; search-grounded requests attach the
//! `googleSearch` tool. Safety declines surface as `StudyError::SafetyBlocked`
//! so the caller can say so instead of reporting a generic failure.

use async_trait::async_trait;
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{FragmentStream, GenerativeModel, ModelRequest};
use crate::config::ModelConfig;
use crate::constants::network;
use crate::types::{Result, StudyError};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client with secure API key handling
pub struct GeminiModel {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiModel")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GeminiModel {
    /// Construct a client for the given credential. Fails on an empty key,
    /// an invalid endpoint URL, or an HTTP client that cannot be built; the
    /// Key Manager treats any of these as a bad credential.
    pub fn new(api_key: SecretString, config: &ModelConfig) -> Result<Self> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(StudyError::Config("API key is empty".to_string()));
        }

        let api_base = Self::validate_endpoint(&config.api_base)?;
        let model = config.model.clone();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StudyError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            api_base,
            model,
            temperature: config.temperature,
            client,
        })
    }

    /// Validate endpoint URL: http/https only, trailing slash normalized
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            StudyError::Config(format!("Invalid API endpoint URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(StudyError::Config(format!(
                "API endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        let mut result = url.to_string();
        if result.ends_with('/') {
            result.pop();
        }
        Ok(result)
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.api_base, self.model, method)
    }

    fn request_body(&self, request: &ModelRequest) -> Value {
        let mut contents: Vec<Value> = request
            .history
            .iter()
            .map(|turn| {
                json!({
                    "role": turn.role.as_str(),
                    "parts": [{"text": turn.text}]
                })
            })
            .collect();
        contents.push(json!({
            "role": "user",
            "parts": [{"text": request.prompt}]
        }));

        let mut body = json!({ "contents": contents });

        if let Some(instruction) = &request.system_instruction {
            body["systemInstruction"] = json!({ "parts": [{"text": instruction}] });
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(temperature) = self.temperature {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }
        if request.expect_json {
            generation_config.insert(
                "responseMimeType".to_string(),
                json!("application/json"),
            );
        }
        if let Some(schema) = &request.response_schema {
            generation_config.insert("responseSchema".to_string(), schema.clone());
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }

        if request.web_search {
            body["tools"] = json!([{ "googleSearch": {} }]);
        }

        body
    }

    async fn post(&self, url: &str, body: &Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StudyError::api(status.as_u16(), message));
        }

        Ok(response)
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate(&self, request: &ModelRequest) -> Result<String> {
        info!(model = %self.model, json = request.expect_json, "generating");
        debug!("POST {}", self.endpoint("generateContent"));

        let body = self.request_body(request);
        let response = self.post(&self.endpoint("generateContent"), &body).await?;

        let payload: GenerateResponse = response.json().await?;

        extract_text(payload)
    }

    async fn generate_stream(&self, request: &ModelRequest) -> Result<FragmentStream> {
        info!(model = %self.model, "generating (streaming)");

        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let body = self.request_body(request);
        let response = self.post(&url, &body).await?;

        let (tx, rx) = mpsc::channel(network::STREAM_CHANNEL_CAPACITY);
        tokio::spawn(process_sse(response, tx));

        Ok(FragmentStream::new(rx))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Consume the SSE byte stream and forward text fragments in emission order.
/// The channel closes when the upstream response ends; a receiver that went
/// away stops the forwarding without failing the request.
async fn process_sse(response: reqwest::Response, tx: mpsc::Sender<Result<String>>) {
    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tx.send(Err(StudyError::Stream(e.to_string()))).await;
                return;
            }
        };

        buffer.extend_from_slice(&bytes);

        // SSE events are newline-delimited; a complete line is complete UTF-8.
        while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let Some(data) = line.trim().strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();
            if data.is_empty() {
                continue;
            }

            let payload: GenerateResponse = match serde_json::from_str(data) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("skipping unparseable stream event: {}", e);
                    continue;
                }
            };

            match extract_text(payload) {
                Ok(text) if text.is_empty() => {}
                Ok(text) => {
                    if tx.send(Ok(text)).await.is_err() {
                        return;
                    }
                }
                Err(err) => {
                    let _ = tx.send(Err(err)).await;
                    return;
                }
            }
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Reduce a response payload to its text, mapping safety declines to the
/// dedicated error. An absent candidate yields empty text; the calling task
/// decides what an empty response means for it.
fn extract_text(payload: GenerateResponse) -> Result<String> {
    if let Some(feedback) = &payload.prompt_feedback
        && let Some(reason) = &feedback.block_reason
    {
        return Err(StudyError::SafetyBlocked(reason.clone()));
    }

    let Some(candidate) = payload.candidates.first() else {
        return Ok(String::new());
    };

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(StudyError::SafetyBlocked("SAFETY".to_string()));
    }

    let text = candidate
        .content
        .as_ref()
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(text)
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ChatTurn;

    fn test_model() -> GeminiModel {
        GeminiModel::new(SecretString::from("test-key"), &ModelConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_empty_key() {
        let result = GeminiModel::new(SecretString::from("   "), &ModelConfig::default());
        assert!(matches!(result, Err(StudyError::Config(_))));
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let config = ModelConfig {
            api_base: "ftp://example.com".to_string(),
            ..ModelConfig::default()
        };
        let result = GeminiModel::new(SecretString::from("key"), &config);
        assert!(matches!(result, Err(StudyError::Config(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", test_model());
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("test-key"));
    }

    #[test]
    fn test_request_body_plain_text() {
        let model = test_model();
        let body = model.request_body(&ModelRequest::text("explain this"));

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "explain this");
        assert!(body.get("generationConfig").is_none());
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_request_body_json_with_schema() {
        let model = test_model();
        let request = ModelRequest::json("structured")
            .with_schema(json!({"type": "OBJECT", "properties": {}}));
        let body = model.request_body(&request);

        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_request_body_web_search_and_history() {
        let model = test_model();
        let mut request = ModelRequest::text("next question").with_web_search();
        request.system_instruction = Some("be helpful".to_string());
        request.history = vec![ChatTurn::user("hi"), ChatTurn::model("hello")];
        let body = model.request_body(&request);

        assert_eq!(body["tools"][0]["googleSearch"], json!({}));
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be helpful");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "next question");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let payload: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(payload).unwrap(), "Hello, world");
    }

    #[test]
    fn test_extract_text_maps_safety_block() {
        let blocked: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [], "promptFeedback": {"blockReason": "SAFETY"}}"#,
        )
        .unwrap();
        assert!(matches!(
            extract_text(blocked),
            Err(StudyError::SafetyBlocked(_))
        ));

        let stopped: GenerateResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert!(matches!(
            extract_text(stopped),
            Err(StudyError::SafetyBlocked(_))
        ));
    }

    #[test]
    fn test_extract_text_empty_when_no_candidates() {
        let payload: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(extract_text(payload).unwrap(), "");
    }
}
