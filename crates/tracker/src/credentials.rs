//! File-based agent credential store.
//!
//! The agent id and token are kept in two plain files, `agent_id` and
//! `agent_token`, so they can be inspected or replaced by hand.

use puzzlebot_core::error::CredentialError;
use puzzlebot_core::source::AgentCredentials;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const ID_FILE: &str = "agent_id";
const TOKEN_FILE: &str = "agent_token";

/// Persists one [`AgentCredentials`] pair in a directory.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn id_path(&self) -> PathBuf {
        self.dir.join(ID_FILE)
    }

    pub fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    /// Load stored credentials.
    ///
    /// Returns `Ok(None)` when either file is missing, which means the
    /// agent has to register again.
    pub fn load(&self) -> Result<Option<AgentCredentials>, CredentialError> {
        let Some(id) = read_trimmed(&self.id_path())? else {
            return Ok(None);
        };
        let Some(token) = read_trimmed(&self.token_path())? else {
            return Ok(None);
        };

        debug!(agent_id = %id, "Loaded stored agent credentials");
        Ok(Some(AgentCredentials { id, token }))
    }

    /// Write both files, creating the directory when needed.
    pub fn save(&self, credentials: &AgentCredentials) -> Result<(), CredentialError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CredentialError::Write {
            path: self.dir.clone(),
            reason: e.to_string(),
        })?;

        write_file(&self.id_path(), &credentials.id)?;
        write_file(&self.token_path(), &credentials.token)?;
        Ok(())
    }
}

fn read_trimmed(path: &Path) -> Result<Option<String>, CredentialError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents.trim().to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CredentialError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), CredentialError> {
    std::fs::write(path, contents).map_err(|e| CredentialError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
