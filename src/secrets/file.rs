//! Local JSON secret store for development and tests.
//!
//! The file is a single JSON object keyed by secret id. A value is either the
//! secret string exactly as Secrets Manager would hold it, or an inline JSON
//! object that is re-serialized on lookup:
//!
//! ```json
//! {
//!   "aws/transfer/s-1234/alice": { "Username": "alice", "Password": "pw" },
//!   "aws/transfer/s-1234/bob": "{\"PublicKey\": \"ssh-ed25519 AAAA...\"}"
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use super::{secret_id, SecretPayload, SecretResolver};
use crate::error::IdpError;

/// Secrets loaded once from a JSON file.
pub struct FileResolver {
    secrets: BTreeMap<String, Value>,
}

impl FileResolver {
    /// Load secrets from `path`.
    pub fn load(path: &Path) -> Result<Self, IdpError> {
        let data = std::fs::read_to_string(path)?;
        let secrets: BTreeMap<String, Value> = serde_json::from_str(&data).map_err(|e| {
            IdpError::Config(format!("Invalid secrets file {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), count = secrets.len(), "Loaded secrets file");
        Ok(Self::from_entries(secrets))
    }

    /// Build a resolver from in-memory entries.
    pub fn from_entries(secrets: BTreeMap<String, Value>) -> Self {
        Self { secrets }
    }
}

#[async_trait]
impl SecretResolver for FileResolver {
    async fn resolve(&self, server_id: &str, username: &str) -> Result<SecretPayload, IdpError> {
        let id = secret_id(server_id, username);
        match self.secrets.get(&id) {
            Some(Value::String(text)) => Ok(SecretPayload::Text(text.clone())),
            Some(other) => Ok(SecretPayload::Text(other.to_string())),
            None => Err(IdpError::SecretNotFound { secret_id: id }),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
