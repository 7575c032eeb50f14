//! Last-call dumps for diagnostic replay.
//!
//! After every inference call the raw request and response bodies are
//! written to `last_<prefix>_request.json` and `last_<prefix>_response.json`.
//! JSON bodies are pretty-printed; a response that is not JSON (an error
//! page, a truncated body) is written as received. Each call overwrites the
//! previous dump. A failed write is logged and otherwise ignored.

use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct DiagnosticsDump {
    request_path: PathBuf,
    response_path: PathBuf,
}

impl DiagnosticsDump {
    pub fn new(dir: impl AsRef<Path>, prefix: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            request_path: dir.join(format!("last_{prefix}_request.json")),
            response_path: dir.join(format!("last_{prefix}_response.json")),
        }
    }

    pub fn request_path(&self) -> &Path {
        &self.request_path
    }

    pub fn response_path(&self) -> &Path {
        &self.response_path
    }

    pub async fn record_request(&self, body: &serde_json::Value) {
        write_pretty(&self.request_path, body).await;
    }

    /// Record the response body exactly as the server sent it, whatever
    /// the status code.
    pub async fn record_response(&self, body: &str) {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(json) => write_pretty(&self.response_path, &json).await,
            Err(_) => write_text(&self.response_path, body).await,
        }
    }
}

async fn write_pretty(path: &Path, body: &serde_json::Value) {
    let text = match serde_json::to_string_pretty(body) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), "Could not serialize diagnostic dump: {e}");
            return;
        }
    };

    write_text(path, &text).await;
}

async fn write_text(path: &Path, text: &str) {
    if let Err(e) = tokio::fs::write(path, text).await {
        warn!(path = %path.display(), "Could not write diagnostic dump: {e}");
    }
}
