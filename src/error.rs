use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdpError {
    #[error("Configuration missing: {name}")]
    ConfigurationMissing { name: &'static str },

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Empty password not allowed for protocol {protocol}")]
    RejectedEmptyPassword { protocol: String },

    #[error("Secret not found: {secret_id}")]
    SecretNotFound { secret_id: String },

    #[error("Secret store error for {secret_id}: {code}, Message: {message}")]
    SecretStore {
        secret_id: String,
        code: String,
        message: String,
    },

    #[error("Malformed secret {secret_id}: {reason}")]
    MalformedSecret { secret_id: String, reason: String },

    #[error("Unable to authenticate user - {0}")]
    NotAuthenticated(String),

    #[error("Unable to authenticate user - No public keys found")]
    NoCredentialMaterial,

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl IdpError {
    /// Returns a user-friendly suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            IdpError::ConfigurationMissing { .. } => {
                Some("Set S3_BUCKET_ARN, KMS_KEY_ARN and SECRETS_MANAGER_REGION, or pass --config <FILE>.")
            }
            IdpError::SecretNotFound { .. } => {
                Some("Secrets are looked up as aws/transfer/<serverId>/<username>.")
            }
            IdpError::SecretStore { .. } => {
                Some("Check the region and that the caller may call secretsmanager:GetSecretValue.")
            }
            IdpError::MalformedSecret { .. } => {
                Some("The secret must be a JSON object with string fields such as Username, Password and PublicKey.")
            }
            IdpError::Config(_) => Some("Check the syntax of the configuration file."),
            IdpError::Server(_) => {
                Some("Check that the bind address is valid and the port is free.")
            }
            _ => None,
        }
    }

    /// Whether this error comes from the secret lookup rather than the
    /// credentials themselves.
    pub fn is_resolver_failure(&self) -> bool {
        matches!(
            self,
            IdpError::SecretNotFound { .. }
                | IdpError::SecretStore { .. }
                | IdpError::MalformedSecret { .. }
        )
    }
}

impl From<serde_json::Error> for IdpError {
    fn from(err: serde_json::Error) -> Self {
        IdpError::MalformedRequest(err.to_string())
    }
}

impl From<toml::de::Error> for IdpError {
    fn from(err: toml::de::Error) -> Self {
        IdpError::Config(format!("TOML parse error: {}", err))
    }
}
