use serde::Deserialize;

use crate::error::IdpError;

/// Verbosity level controlling tracing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Suppress all output except errors
    Quiet,
    /// Normal output (info level)
    Normal,
    /// Verbose output (debug level)
    Verbose,
    /// Maximum output (trace level)
    Trace,
}

impl From<(bool, u8)> for Verbosity {
    /// Convert from (quiet_flag, verbose_count) to Verbosity.
    ///
    /// - quiet=true -> Quiet (regardless of verbose count)
    /// - verbose=0  -> Normal
    /// - verbose=1  -> Verbose
    /// - verbose=2+ -> Trace
    fn from((quiet, verbose_count): (bool, u8)) -> Self {
        if quiet {
            Verbosity::Quiet
        } else {
            match verbose_count {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

impl Verbosity {
    /// Return the tracing filter string for this verbosity level.
    pub fn as_tracing_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
            Verbosity::Trace => "trace",
        }
    }
}

pub const ENV_STORAGE_ARN: &str = "S3_BUCKET_ARN";
pub const ENV_KMS_KEY_ARN: &str = "KMS_KEY_ARN";
pub const ENV_ROLE_ARN: &str = "SFTP_ROLE_ARN";
pub const ENV_SECRETS_REGION: &str = "SECRETS_MANAGER_REGION";

/// Deployment settings the authorization decision depends on.
///
/// Every field is optional so that an incomplete deployment still answers
/// (with a deny) instead of refusing to start; `storage()` checks the two
/// ARNs the policy needs on each request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// ARN of the bucket users are scoped into.
    #[serde(default)]
    pub storage_arn: Option<String>,

    /// ARN of the KMS key protecting the bucket.
    #[serde(default)]
    pub kms_key_arn: Option<String>,

    /// Role the transfer service assumes for the session.
    #[serde(default)]
    pub role_arn: Option<String>,

    /// Region of the Secrets Manager holding user records.
    #[serde(default)]
    pub secrets_region: Option<String>,
}

/// The two ARNs required to build a policy.
#[derive(Debug, Clone, Copy)]
pub struct StorageTargets<'a> {
    pub storage_arn: &'a str,
    pub kms_key_arn: &'a str,
}

impl GatewayConfig {
    /// Parse a TOML config file body.
    pub fn from_toml(contents: &str) -> Result<Self, IdpError> {
        Ok(toml::from_str(contents)?)
    }

    /// Overlay values from an environment-style lookup.
    ///
    /// A variable that is set, even to the empty string, replaces the file
    /// value.
    pub fn overlay_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields = [
            (ENV_STORAGE_ARN, &mut self.storage_arn),
            (ENV_KMS_KEY_ARN, &mut self.kms_key_arn),
            (ENV_ROLE_ARN, &mut self.role_arn),
            (ENV_SECRETS_REGION, &mut self.secrets_region),
        ];
        for (name, slot) in fields {
            if let Some(value) = lookup(name) {
                *slot = Some(value);
            }
        }
        self
    }

    /// The storage and KMS ARNs, or the first one missing.
    pub fn storage(&self) -> Result<StorageTargets<'_>, IdpError> {
        let storage_arn = self
            .storage_arn
            .as_deref()
            .ok_or(IdpError::ConfigurationMissing {
                name: ENV_STORAGE_ARN,
            })?;
        let kms_key_arn = self
            .kms_key_arn
            .as_deref()
            .ok_or(IdpError::ConfigurationMissing {
                name: ENV_KMS_KEY_ARN,
            })?;
        Ok(StorageTargets {
            storage_arn,
            kms_key_arn,
        })
    }

    /// The Secrets Manager region, required to build the AWS resolver.
    pub fn secrets_region(&self) -> Result<&str, IdpError> {
        self.secrets_region
            .as_deref()
            .ok_or(IdpError::ConfigurationMissing {
                name: ENV_SECRETS_REGION,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from((true, 2)), Verbosity::Quiet);
        assert_eq!(Verbosity::from((false, 0)), Verbosity::Normal);
        assert_eq!(Verbosity::from((false, 1)), Verbosity::Verbose);
        assert_eq!(Verbosity::from((false, 5)), Verbosity::Trace);
        assert_eq!(Verbosity::Verbose.as_tracing_filter(), "debug");
    }

    #[test]
    fn env_overlay_fills_all_fields() {
        let config = GatewayConfig::default().overlay_env(lookup(&[
            ("S3_BUCKET_ARN", "arn:aws:s3:::bucket"),
            ("KMS_KEY_ARN", "arn:aws:kms:eu-west-1:1:key/k"),
            ("SFTP_ROLE_ARN", "arn:aws:iam::1:role/transfer"),
            ("SECRETS_MANAGER_REGION", "eu-west-1"),
        ]));
        let targets = config.storage().unwrap();
        assert_eq!(targets.storage_arn, "arn:aws:s3:::bucket");
        assert_eq!(targets.kms_key_arn, "arn:aws:kms:eu-west-1:1:key/k");
        assert_eq!(config.role_arn.as_deref(), Some("arn:aws:iam::1:role/transfer"));
        assert_eq!(config.secrets_region().unwrap(), "eu-west-1");
    }

    #[test]
    fn env_overrides_file() {
        let config = GatewayConfig::from_toml(
            "storage_arn = \"arn:aws:s3:::from-file\"\nkms_key_arn = \"arn:aws:kms:k\"\n",
        )
        .unwrap()
        .overlay_env(lookup(&[("S3_BUCKET_ARN", "arn:aws:s3:::from-env")]));
        assert_eq!(config.storage_arn.as_deref(), Some("arn:aws:s3:::from-env"));
        assert_eq!(config.kms_key_arn.as_deref(), Some("arn:aws:kms:k"));
    }

    #[test]
    fn empty_env_value_counts_as_set() {
        let config = GatewayConfig::default().overlay_env(lookup(&[("SFTP_ROLE_ARN", "")]));
        assert_eq!(config.role_arn.as_deref(), Some(""));
    }

    #[test]
    fn missing_storage_arn_reported_first() {
        let config = GatewayConfig::default();
        match config.storage() {
            Err(IdpError::ConfigurationMissing { name }) => assert_eq!(name, "S3_BUCKET_ARN"),
            other => panic!("Expected ConfigurationMissing, got {:?}", other),
        }
    }

    #[test]
    fn missing_kms_key_arn() {
        let config = GatewayConfig {
            storage_arn: Some("arn:aws:s3:::bucket".to_string()),
            ..GatewayConfig::default()
        };
        match config.storage() {
            Err(IdpError::ConfigurationMissing { name }) => assert_eq!(name, "KMS_KEY_ARN"),
            other => panic!("Expected ConfigurationMissing, got {:?}", other),
        }
    }

    #[test]
    fn missing_region() {
        assert!(matches!(
            GatewayConfig::default().secrets_region(),
            Err(IdpError::ConfigurationMissing {
                name: "SECRETS_MANAGER_REGION"
            })
        ));
    }

    #[test]
    fn unknown_toml_key_rejected() {
        assert!(GatewayConfig::from_toml("bucket = \"x\"").is_err());
    }
}
