//! Gateway configuration: an optional TOML file overlaid by environment
//! variables.

pub mod paths;
pub mod types;

use std::path::Path;

pub use types::{GatewayConfig, Verbosity};

use crate::error::IdpError;

/// Load the gateway config.
///
/// An explicit `path` must exist. Without one, the default config file is
/// read when present. Environment variables always win over the file.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, IdpError> {
    let file_config = match path {
        Some(path) => read_file(path)?,
        None => match paths::default_config_path() {
            Some(default) if default.exists() => read_file(&default)?,
            _ => GatewayConfig::default(),
        },
    };

    let config = file_config.overlay_env(|name| std::env::var(name).ok());

    // Missing ARNs still deny per request; warn once up front.
    if let Err(err) = config.storage() {
        tracing::warn!("{} - every login will be denied", err);
    }
    if config.role_arn.is_none() {
        tracing::debug!("No role configured - responses will carry an empty Role");
    }

    Ok(config)
}

fn read_file(path: &Path) -> Result<GatewayConfig, IdpError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| IdpError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    let config = GatewayConfig::from_toml(&contents)?;
    tracing::debug!(path = %path.display(), "Loaded gateway config file");
    Ok(config)
}
