//! AWS Secrets Manager backed resolver.

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_secretsmanager::Client;
use tracing::{debug, instrument};

use super::{secret_id, SecretPayload, SecretResolver};
use crate::error::IdpError;

/// Resolves credential secrets with `GetSecretValue`.
#[derive(Clone)]
pub struct SecretsManagerResolver {
    client: Client,
}

impl SecretsManagerResolver {
    /// Wrap an already-configured client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client for `region` from the default credential chain.
    pub async fn connect(region: &str) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        tracing::info!(%region, "Secrets Manager client initialised");
        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl SecretResolver for SecretsManagerResolver {
    #[instrument(skip(self), fields(secret_id))]
    async fn resolve(&self, server_id: &str, username: &str) -> Result<SecretPayload, IdpError> {
        let id = secret_id(server_id, username);
        tracing::Span::current().record("secret_id", id.as_str());

        let output = match self.client.get_secret_value().secret_id(&id).send().await {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_resource_not_found_exception() {
                    return Err(IdpError::SecretNotFound { secret_id: id });
                }
                return Err(IdpError::SecretStore {
                    secret_id: id,
                    code: service_err.code().unwrap_or("Unknown").to_string(),
                    message: DisplayErrorContext(&service_err).to_string(),
                });
            }
        };

        // Depending on how the secret was stored, exactly one of these is set.
        if let Some(text) = output.secret_string() {
            debug!("Found secret string");
            Ok(SecretPayload::Text(text.to_string()))
        } else if let Some(blob) = output.secret_binary() {
            debug!("Found binary secret");
            Ok(SecretPayload::Binary(blob.as_ref().to_vec()))
        } else {
            Err(IdpError::MalformedSecret {
                secret_id: id,
                reason: "secret has neither SecretString nor SecretBinary".to_string(),
            })
        }
    }

    fn name(&self) -> &'static str {
        "secrets-manager"
    }
}
