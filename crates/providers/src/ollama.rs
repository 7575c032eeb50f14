//! Ollama provider implementation.
//!
//! Talks to the native `/api/generate` endpoint with streaming disabled, so
//! one HTTP request yields one complete completion. Model listing and health
//! checks go through `/api/tags`.

use async_trait::async_trait;
use puzzlebot_core::error::ProviderError;
use puzzlebot_core::provider::*;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::diagnostics::DiagnosticsDump;

/// A locally hosted Ollama server.
pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
    diagnostics: Option<DiagnosticsDump>,
}

impl OllamaProvider {
    /// Create a provider for the server at `base_url`.
    ///
    /// Accepts either the server root (`http://host:11434`) or the full
    /// generate URL (`http://host:11434/api/generate`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: normalize_base_url(&base_url.into()),
            client,
            diagnostics: None,
        })
    }

    /// Dump every request and response body into `dump`.
    pub fn with_diagnostics(mut self, dump: DiagnosticsDump) -> Self {
        self.diagnostics = Some(dump);
        self
    }
}

fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    trimmed
        .strip_suffix("/api/generate")
        .unwrap_or(trimmed)
        .to_string()
}

fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<GenerateResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let body = serde_json::json!({
            "model": request.model,
            "stream": false,
            "prompt": request.prompt,
        });

        if let Some(dump) = &self.diagnostics {
            dump.record_request(&body).await;
        }

        debug!(model = %request.model, prompt_len = request.prompt.len(), "Calling Ollama");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        let raw = response.text().await.map_err(map_send_error)?;

        if let Some(dump) = &self.diagnostics {
            dump.record_response(&raw).await;
        }

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %raw, "Ollama returned error");
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: raw,
            });
        }

        let parsed: ApiGenerateResponse = serde_json::from_str(&raw)
            .map_err(|e| ProviderError::InvalidResponse(format!("Unexpected response shape: {e}")))?;

        let usage = match (parsed.prompt_eval_count, parsed.eval_count) {
            (Some(prompt), Some(completion)) => Some(Usage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            }),
            _ => None,
        };

        Ok(GenerateResponse {
            completion: parsed.response,
            model: parsed.model.unwrap_or(request.model),
            usage,
        })
    }

    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let tags: ApiTagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_send_error)?;

        Ok(response.status().is_success())
    }
}

// --- Ollama API types ---

#[derive(Debug, Deserialize)]
struct ApiGenerateResponse {
    response: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiTagsResponse {
    #[serde(default)]
    models: Vec<ApiModel>,
}

#[derive(Debug, Deserialize)]
struct ApiModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, routing::get, routing::post};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn provider(url: &str) -> OllamaProvider {
        OllamaProvider::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn base_url_normalization() {
        assert_eq!(
            normalize_base_url("http://192.168.3.2:1337/api/generate"),
            "http://192.168.3.2:1337"
        );
        assert_eq!(normalize_base_url("http://localhost:11434/"), "http://localhost:11434");
    }

    #[test]
    fn parse_generate_response() {
        let data = r#"{"model":"codestral","created_at":"2024-06-01T10:00:00Z","response":"The answer is `4`","done":true,"prompt_eval_count":12,"eval_count":7}"#;
        let parsed: ApiGenerateResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.response, "The answer is `4`");
        assert_eq!(parsed.eval_count, Some(7));
    }

    #[tokio::test]
    async fn generate_sends_non_streaming_request() {
        let router = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["stream"], serde_json::json!(false));
                Json(serde_json::json!({
                    "model": body["model"],
                    "response": format!("echo: {}", body["prompt"].as_str().unwrap_or("")),
                    "done": true,
                    "prompt_eval_count": 3,
                    "eval_count": 2,
                }))
            }),
        );
        let url = serve(router).await;

        let response = provider(&url)
            .generate(GenerateRequest::new("codestral", "2+2?"))
            .await
            .unwrap();

        assert_eq!(response.completion, "echo: 2+2?");
        assert_eq!(response.model, "codestral");
        assert_eq!(response.usage.unwrap().total_tokens, 5);
    }

    #[tokio::test]
    async fn generate_writes_diagnostics() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async { Json(serde_json::json!({"response": "hi", "done": true})) }),
        );
        let url = serve(router).await;
        let dir = tempfile::tempdir().unwrap();

        let provider = provider(&url).with_diagnostics(DiagnosticsDump::new(dir.path(), "ollama"));
        provider
            .generate(GenerateRequest::new("m", "dump me"))
            .await
            .unwrap();

        let request = std::fs::read_to_string(dir.path().join("last_ollama_request.json")).unwrap();
        let response = std::fs::read_to_string(dir.path().join("last_ollama_response.json")).unwrap();
        assert!(request.contains("dump me"));
        assert!(response.contains("\"hi\""));
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async {
                (
                    axum::http::StatusCode::NOT_FOUND,
                    "model 'nope' not found",
                )
            }),
        );
        let url = serve(router).await;

        let err = provider(&url)
            .generate(GenerateRequest::new("nope", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::ApiError { status_code: 404, .. }));
    }

    #[tokio::test]
    async fn error_response_is_still_dumped() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async {
                (
                    axum::http::StatusCode::NOT_FOUND,
                    Json(serde_json::json!({"error": "model 'x' not found"})),
                )
            }),
        );
        let url = serve(router).await;
        let dir = tempfile::tempdir().unwrap();

        let provider = provider(&url).with_diagnostics(DiagnosticsDump::new(dir.path(), "ollama"));
        let err = provider
            .generate(GenerateRequest::new("x", "hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::ApiError { status_code: 404, .. }));
        let response = std::fs::read_to_string(dir.path().join("last_ollama_response.json")).unwrap();
        assert!(response.contains("model 'x' not found"));
    }

    #[tokio::test]
    async fn missing_response_field_is_invalid() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async { Json(serde_json::json!({"error": "oops"})) }),
        );
        let url = serve(router).await;

        let err = provider(&url)
            .generate(GenerateRequest::new("m", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn list_models_reads_tags() {
        let router = Router::new().route(
            "/api/tags",
            get(|| async {
                Json(serde_json::json!({
                    "models": [{"name": "codestral:22b"}, {"name": "llama3:8b"}]
                }))
            }),
        );
        let url = serve(router).await;

        let provider = provider(&url);
        assert_eq!(
            provider.list_models().await.unwrap(),
            vec!["codestral:22b", "llama3:8b"]
        );
        assert!(provider.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        let err = provider("http://127.0.0.1:1")
            .generate(GenerateRequest::new("m", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_) | ProviderError::Timeout(_)));
    }
}
