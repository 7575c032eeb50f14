//! Provider selection: builds the configured inference provider.

use std::sync::Arc;
use std::time::Duration;
use puzzlebot_config::AppConfig;
use puzzlebot_core::error::ProviderError;
use puzzlebot_core::provider::Provider;
use crate::diagnostics::DiagnosticsDump;
use crate::ollama::OllamaProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider named by `config.inference.provider`.
///
/// Every provider built here dumps its last request and response into
/// `config.diagnostics_dir`.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let inference = &config.inference;
    let timeout = Duration::from_secs(inference.timeout_secs);
    let base_url = inference
        .url
        .clone()
        .unwrap_or_else(|| default_base_url(&inference.provider));

    let provider: Arc<dyn Provider> = match inference.provider.as_str() {
        "ollama" => Arc::new(
            OllamaProvider::new(&base_url, timeout)?
                .with_diagnostics(DiagnosticsDump::new(&config.diagnostics_dir, "ollama")),
        ),
        "openai_compat" => Arc::new(
            OpenAiCompatProvider::new(
                "openai_compat",
                &base_url,
                inference.api_key.clone().unwrap_or_default(),
                timeout,
            )?
            .with_diagnostics(DiagnosticsDump::new(&config.diagnostics_dir, "openai")),
        ),
        other => {
            return Err(ProviderError::NotConfigured(format!(
                "unknown inference provider '{other}'"
            )));
        }
    };

    Ok(provider)
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "ollama" => "http://localhost:11434".into(),
        _ => "http://localhost:8080/v1".into(),
    }
}
