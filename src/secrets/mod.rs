//! Secret lookup for per-user credential records.
//!
//! Each (server, user) pair owns one secret named
//! `aws/transfer/{serverId}/{username}` whose value is a JSON object. The
//! `SecretResolver` trait abstracts the store; `manager` talks to AWS Secrets
//! Manager and `file` reads a local JSON file.

pub mod file;
pub mod manager;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::IdpError;

pub use file::FileResolver;
pub use manager::SecretsManagerResolver;

/// Prefix shared by every credential secret.
pub const SECRET_PREFIX: &str = "aws/transfer";

/// Build the secret identifier for a user on a server.
pub fn secret_id(server_id: &str, username: &str) -> String {
    format!("{}/{}/{}", SECRET_PREFIX, server_id, username)
}

/// Raw secret value as returned by the store.
#[derive(Clone)]
pub enum SecretPayload {
    /// `SecretString`.
    Text(String),
    /// `SecretBinary`.
    Binary(Vec<u8>),
}

impl SecretPayload {
    fn as_bytes(&self) -> &[u8] {
        match self {
            SecretPayload::Text(text) => text.as_bytes(),
            SecretPayload::Binary(bytes) => bytes,
        }
    }
}

impl std::fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretPayload::Text(text) => write!(f, "Text({} bytes)", text.len()),
            SecretPayload::Binary(bytes) => write!(f, "Binary({} bytes)", bytes.len()),
        }
    }
}

/// Credential and home-directory settings stored for one user.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretRecord {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Comma-separated list of SSH public keys.
    #[serde(default)]
    pub public_key: Option<String>,

    #[serde(default)]
    pub home_directory: Option<String>,

    /// Virtual folder mapping, passed through untouched. A key stored as
    /// `null` is still present and still selects a logical home.
    #[serde(default, deserialize_with = "present")]
    pub home_directory_details: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl SecretRecord {
    /// Decode a record from the payload of secret `secret_id`.
    ///
    /// The payload must be a JSON object; any other JSON shape is malformed.
    pub fn parse(secret_id: &str, payload: &SecretPayload) -> Result<Self, IdpError> {
        let malformed = |reason: String| IdpError::MalformedSecret {
            secret_id: secret_id.to_string(),
            reason,
        };
        let value: Value =
            serde_json::from_slice(payload.as_bytes()).map_err(|e| malformed(e.to_string()))?;
        if !value.is_object() {
            return Err(malformed("secret is not a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|e| malformed(e.to_string()))
    }

    /// The stored public keys in order, split on `,` without trimming.
    pub fn public_keys(&self) -> Option<Vec<String>> {
        self.public_key
            .as_ref()
            .map(|keys| keys.split(',').map(str::to_string).collect())
    }
}

impl std::fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRecord")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("public_key", &self.public_key.is_some())
            .field("home_directory", &self.home_directory)
            .field("home_directory_details", &self.home_directory_details.is_some())
            .finish()
    }
}

/// Looks up the secret for a user on a server.
///
/// Implementations make exactly one attempt per call: no retries, no caching.
/// A missing secret is reported as `IdpError::SecretNotFound`, any other store
/// failure as `IdpError::SecretStore`.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    async fn resolve(&self, server_id: &str, username: &str) -> Result<SecretPayload, IdpError>;

    /// Short name for log lines.
    fn name(&self) -> &'static str;
}
