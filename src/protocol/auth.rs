//! Credential types derived from an incoming login attempt.
//!
//! Passwords are wrapped so they are zeroed on drop and never show up in
//! `Debug` output or log lines.

use std::fmt;

use serde::Deserialize;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// A password supplied by the connecting client.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact, case-sensitive comparison against a stored value.
    ///
    /// Length is compared first (not secret), then the bytes in constant
    /// time so the comparison does not leak how much of the stored value
    /// matched.
    pub fn matches(&self, stored: &str) -> bool {
        let provided = self.0.as_bytes();
        let stored = stored.as_bytes();
        provided.len() == stored.len() && provided.ct_eq(stored).into()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([redacted])")
    }
}

/// The authentication strategy chosen for a request.
#[derive(Debug, Clone)]
pub enum Credential {
    /// A non-empty password to check against the stored record.
    Password(Password),

    /// No usable password: the service is asking for the user's public keys
    /// and will verify the SSH signature itself.
    PublicKey,
}

impl Credential {
    /// Pick the strategy for a (possibly absent) password.
    ///
    /// An absent or empty password selects the public-key path. Callers that
    /// must reject empty passwords for some protocols do so before this.
    pub fn from_password(password: Option<&Password>) -> Self {
        match password {
            Some(p) if !p.is_empty() => Credential::Password(p.clone()),
            _ => Credential::PublicKey,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Credential::Password(_) => "password",
            Credential::PublicKey => "public-key",
        }
    }
}
