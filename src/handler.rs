//! The login decision.
//!
//! `AuthDecisionHandler::authenticate` answers one login attempt: validate
//! the request, fetch the user's secret, verify the password or hand back the
//! stored public keys, then attach the role, the scoped policy and the home
//! directory. Any failure along the way is logged and turned into the empty
//! deny response; the reason never reaches the caller.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::GatewayConfig;
use crate::error::IdpError;
use crate::policy::PolicyDocument;
use crate::protocol::{AuthRequest, AuthResponse, Credential, HomeDirectoryType};
use crate::secrets::{secret_id, SecretRecord, SecretResolver};

/// Decides logins against a secret store.
///
/// Holds only shared, read-only state and is cheap to clone, so one instance
/// serves any number of concurrent requests.
#[derive(Clone)]
pub struct AuthDecisionHandler {
    config: Arc<GatewayConfig>,
    resolver: Arc<dyn SecretResolver>,
}

impl AuthDecisionHandler {
    pub fn new(config: Arc<GatewayConfig>, resolver: Arc<dyn SecretResolver>) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Decide one login attempt. Never fails: errors become a deny.
    pub async fn authenticate(&self, request: &AuthRequest) -> AuthResponse {
        match self.decide(request).await {
            Ok(response) => {
                info!(
                    role = response.role.as_deref().unwrap_or_default(),
                    public_keys = response.public_keys.as_ref().map_or(0, Vec::len),
                    home_directory = ?response.home_directory,
                    home_directory_type = ?response.home_directory_type,
                    "Completed response data"
                );
                response
            }
            Err(err) => {
                if err.is_resolver_failure() {
                    warn!(resolver = self.resolver.name(), "Secret lookup failed: {}", err);
                } else {
                    warn!("{}", err);
                }
                AuthResponse::deny()
            }
        }
    }

    async fn decide(&self, request: &AuthRequest) -> Result<AuthResponse, IdpError> {
        info!(
            username = request.username.as_deref(),
            server_id = request.server_id.as_deref(),
            protocol = request.protocol.as_ref().map(|p| p.as_str()),
            source_ip = request.source_ip.as_deref(),
            password_supplied = request.password.is_some(),
            "Received authentication request"
        );

        let targets = self.config.storage()?;

        let (username, server_id) = match (&request.username, &request.server_id) {
            (Some(username), Some(server_id)) => (username.as_str(), server_id.as_str()),
            _ => {
                return Err(IdpError::MalformedRequest(
                    "Incoming username or serverId missing".to_string(),
                ))
            }
        };

        if let (Some(password), Some(protocol)) = (&request.password, &request.protocol) {
            if password.is_empty() && protocol.rejects_empty_password() {
                return Err(IdpError::RejectedEmptyPassword {
                    protocol: protocol.to_string(),
                });
            }
        }

        let credential = Credential::from_password(request.password.as_ref());
        if matches!(credential, Credential::PublicKey) {
            info!("No password, checking for SSH public key");
        }
        debug!(method = credential.name(), "Authentication method selected");

        let payload = self.resolver.resolve(server_id, username).await?;
        let record = SecretRecord::parse(&secret_id(server_id, username), &payload)?;

        let mut response = AuthResponse::default();
        match credential {
            Credential::Password(password) => {
                let stored_password = record.password.as_deref().ok_or_else(|| {
                    IdpError::NotAuthenticated("No field match in Secret for Password".to_string())
                })?;
                let stored_username = record.username.as_deref().ok_or_else(|| {
                    IdpError::NotAuthenticated("No field match in Secret for Username".to_string())
                })?;
                // Evaluate both before branching so a username mismatch takes
                // as long as a password mismatch.
                let password_ok = password.matches(stored_password);
                let username_ok = stored_username == username;
                if !(password_ok && username_ok) {
                    return Err(IdpError::NotAuthenticated(
                        "Incoming username and password do not match stored".to_string(),
                    ));
                }
            }
            Credential::PublicKey => {
                let keys = record
                    .public_keys()
                    .ok_or(IdpError::NoCredentialMaterial)?;
                response.public_keys = Some(keys);
            }
        }

        response.role = Some(match &self.config.role_arn {
            Some(role) => role.clone(),
            None => {
                info!("No field match for role - Set empty string in response");
                String::new()
            }
        });

        response.policy = Some(
            PolicyDocument::for_user(username, targets.storage_arn, targets.kms_key_arn).to_json(),
        );

        if let Some(details) = record.home_directory_details {
            info!("HomeDirectoryDetails found - Applying setting for virtual folders");
            response.home_directory_details = Some(details);
            response.home_directory_type = Some(HomeDirectoryType::Logical);
        } else if let Some(home) = record.home_directory {
            info!("HomeDirectory found - Cannot be used with HomeDirectoryDetails");
            response.home_directory = Some(home);
        } else {
            info!("HomeDirectory not found - Defaulting to /");
        }

        Ok(response)
    }
}
