//! Google Gemini API client (generateContent endpoint).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::{classify_http_status, LlmError, LlmErrorKind};
use super::TextGenerator;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini API client.
///
/// Performs exactly one request per call; transient failures are reported
/// to the caller rather than retried here.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client for the given model.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (used by tests against a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        self.base_url = base_url;
        self
    }

    /// Create an LlmError from HTTP response status and body.
    fn create_error(status: reqwest::StatusCode, body: &str) -> LlmError {
        let status_code = status.as_u16();
        match classify_http_status(status_code) {
            LlmErrorKind::RateLimited => LlmError::rate_limited(status_code, body.to_string()),
            LlmErrorKind::ClientError => LlmError::client_error(status_code, body.to_string()),
            _ => LlmError::server_error(status_code, body.to_string()),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        tracing::debug!("Sending request to Gemini: model={}", self.model);

        let response = match self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(LlmError::network_error(format!("Request timeout: {}", e)));
                } else if e.is_connect() {
                    return Err(LlmError::network_error(format!("Connection failed: {}", e)));
                } else {
                    return Err(LlmError::network_error(format!("Request failed: {}", e)));
                }
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Self::create_error(status, &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::parse_error(format!("Failed to parse response: {}, body: {}", e, body))
        })?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::parse_error("No candidates in response".to_string()))?;

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(LlmError::parse_error(
                "Candidate contained no text parts".to_string(),
            ));
        }

        Ok(text)
    }
}

/// Gemini generateContent request format.
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

/// Gemini generateContent response format.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::{routing::post, Json, Router};

    /// Bind a stub provider on an ephemeral port and return its base URL.
    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve stub");
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_success_parses_candidate_text() {
        let router = Router::new().route(
            "/v1beta/models/gemini-2.5-flash:generateContent",
            post(|| async {
                Json(serde_json::json!({
                    "candidates": [{
                        "content": {
                            "parts": [{"text": "Sure! [\"a\", \"b\"]"}]
                        }
                    }]
                }))
            }),
        );
        let base = spawn_stub(router).await;

        let client = GeminiClient::new("test-key".to_string(), "gemini-2.5-flash".to_string())
            .with_base_url(base);
        let text = client.generate("anything").await.expect("generate");
        assert_eq!(text, "Sure! [\"a\", \"b\"]");
    }

    #[tokio::test]
    async fn test_busy_status_maps_to_transient() {
        let router = Router::new().route(
            "/v1beta/models/gemini-2.5-flash:generateContent",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model overloaded") }),
        );
        let base = spawn_stub(router).await;

        let client = GeminiClient::new("test-key".to_string(), "gemini-2.5-flash".to_string())
            .with_base_url(base);
        let err = client.generate("anything").await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::RateLimited);
        assert!(err.is_transient());
        assert_eq!(err.status_code, Some(503));
    }

    #[tokio::test]
    async fn test_auth_failure_is_permanent() {
        let router = Router::new().route(
            "/v1beta/models/gemini-2.5-flash:generateContent",
            post(|| async { (StatusCode::FORBIDDEN, "invalid api key") }),
        );
        let base = spawn_stub(router).await;

        let client = GeminiClient::new("bad-key".to_string(), "gemini-2.5-flash".to_string())
            .with_base_url(base);
        let err = client.generate("anything").await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ClientError);
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_empty_candidates_is_parse_error() {
        let router = Router::new().route(
            "/v1beta/models/gemini-2.5-flash:generateContent",
            post(|| async { Json(serde_json::json!({"candidates": []})) }),
        );
        let base = spawn_stub(router).await;

        let client = GeminiClient::new("test-key".to_string(), "gemini-2.5-flash".to_string())
            .with_base_url(base);
        let err = client.generate("anything").await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ParseError);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Port that nothing listens on.
        let client = GeminiClient::new("test-key".to_string(), "gemini-2.5-flash".to_string())
            .with_base_url("http://127.0.0.1:1");
        let err = client.generate("anything").await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::NetworkError);
        assert!(err.is_transient());
    }
}
