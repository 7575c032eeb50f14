//! Configuration loading, validation, and management for puzzlebot.
//!
//! Loads configuration from `~/.puzzlebot/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.puzzlebot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Name the agent registers under on first run
    #[serde(default = "default_agent_name")]
    pub agent_name: String,

    /// Maximum solve→check cycles per task
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Directory holding the `agent_id` and `agent_token` files
    #[serde(default = "default_local_dir")]
    pub credentials_dir: PathBuf,

    /// Directory receiving the last inference request/response dumps
    #[serde(default = "default_local_dir")]
    pub diagnostics_dir: PathBuf,

    /// Task server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Inference endpoint configuration
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Code execution sandbox configuration
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

fn default_agent_name() -> String {
    "puzzlebot.rs".into()
}
fn default_max_attempts() -> u32 {
    8
}
fn default_local_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("agent_name", &self.agent_name)
            .field("max_attempts", &self.max_attempts)
            .field("credentials_dir", &self.credentials_dir)
            .field("diagnostics_dir", &self.diagnostics_dir)
            .field("server", &self.server)
            .field("inference", &self.inference)
            .field("sandbox", &self.sandbox)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the task server API, including the trailing `/api/`
    #[serde(default = "default_server_url")]
    pub base_url: String,

    /// Deployment-wide bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_token: Option<String>,

    #[serde(default = "default_server_timeout")]
    pub timeout_secs: u64,
}

fn default_server_url() -> String {
    "http://localhost:8000/api/".into()
}
fn default_server_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_server_url(),
            user_token: None,
            timeout_secs: default_server_timeout(),
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("base_url", &self.base_url)
            .field("user_token", &redact(&self.user_token))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// `ollama` or `openai_compat`
    #[serde(default = "default_inference_provider")]
    pub provider: String,

    /// Endpoint base URL; the provider's default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Only used by `openai_compat`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
}

fn default_inference_provider() -> String {
    "ollama".into()
}
fn default_model() -> String {
    "codestral:22b-v0.1-q6_K".into()
}
fn default_inference_timeout() -> u64 {
    600
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            provider: default_inference_provider(),
            url: None,
            model: default_model(),
            api_key: None,
            timeout_secs: default_inference_timeout(),
        }
    }
}

impl std::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("provider", &self.provider)
            .field("url", &self.url)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Root of the sibling Rust project that builds generated code
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,

    /// Build-and-run command, executed inside `project_dir`
    #[serde(default = "default_command")]
    pub command: Vec<String>,

    #[serde(default = "default_sandbox_timeout")]
    pub timeout_secs: u64,

    /// How program output is reduced to a solution
    #[serde(default)]
    pub solution_filter: SolutionFilter,
}

fn default_project_dir() -> PathBuf {
    PathBuf::from("../solver-rs")
}
fn default_command() -> Vec<String> {
    vec!["cargo".into(), "run".into()]
}
fn default_sandbox_timeout() -> u64 {
    300
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            project_dir: default_project_dir(),
            command: default_command(),
            timeout_secs: default_sandbox_timeout(),
            solution_filter: SolutionFilter::default(),
        }
    }
}

/// Reduction applied to a generated program's stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionFilter {
    /// Keep only the ASCII digits of the trimmed output
    #[default]
    Digits,
    /// Submit the trimmed output as is
    Raw,
}

const KNOWN_PROVIDERS: &[&str] = &["ollama", "openai_compat"];

impl AppConfig {
    /// Load configuration from the default path (~/.puzzlebot/config.toml).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Load configuration from `path` (or the default path), then apply
    /// environment overrides:
    /// - `PUZZLEBOT_SERVER_URL`
    /// - `PUZZLEBOT_USER_TOKEN`
    /// - `PUZZLEBOT_INFERENCE_URL`
    /// - `PUZZLEBOT_MODEL`
    /// - `PUZZLEBOT_MAX_ATTEMPTS`
    pub fn load_with(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path(),
        };
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup("PUZZLEBOT_SERVER_URL") {
            self.server.base_url = url;
        }
        if let Some(token) = lookup("PUZZLEBOT_USER_TOKEN") {
            self.server.user_token = Some(token);
        }
        if let Some(url) = lookup("PUZZLEBOT_INFERENCE_URL") {
            self.inference.url = Some(url);
        }
        if let Some(model) = lookup("PUZZLEBOT_MODEL") {
            self.inference.model = model;
        }
        if let Some(raw) = lookup("PUZZLEBOT_MAX_ATTEMPTS") {
            self.max_attempts = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "PUZZLEBOT_MAX_ATTEMPTS must be a positive integer, got '{raw}'"
                ))
            })?;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".puzzlebot")
    }

    /// Get the default configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "max_attempts must be at least 1".into(),
            ));
        }

        if self.sandbox.command.is_empty() || self.sandbox.command[0].trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "sandbox.command must name a program".into(),
            ));
        }

        if self.server.timeout_secs == 0
            || self.inference.timeout_secs == 0
            || self.sandbox.timeout_secs == 0
        {
            return Err(ConfigError::ValidationError(
                "timeouts must be greater than zero".into(),
            ));
        }

        if !KNOWN_PROVIDERS.contains(&self.inference.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown inference.provider '{}' (expected one of: {})",
                self.inference.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent_name: default_agent_name(),
            max_attempts: default_max_attempts(),
            credentials_dir: default_local_dir(),
            diagnostics_dir: default_local_dir(),
            server: ServerConfig::default(),
            inference: InferenceConfig::default(),
            sandbox: SandboxConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
