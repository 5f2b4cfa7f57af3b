//! Wire types exchanged with the file-transfer service.
//!
//! This module provides the `Protocol` enum naming the transfer protocol a
//! login arrived on, along with the request/response event types and the
//! credential types derived from a request.

pub mod auth;
pub mod event;

use std::fmt;

use serde::Deserialize;

pub use auth::{Credential, Password};
pub use event::{AuthRequest, AuthResponse, HomeDirectoryType};

/// The protocol a login attempt arrived on.
///
/// Parsed leniently from the `protocol` event field: unrecognised values are
/// kept verbatim in `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Protocol {
    /// SSH File Transfer Protocol.
    Sftp,

    /// Plain FTP.
    Ftp,

    /// FTP over TLS.
    Ftps,

    /// Any other protocol string the service may send (e.g. `AS2`).
    Other(String),
}

impl Protocol {
    /// Returns true for the protocols that reject an empty password outright.
    ///
    /// SFTP is deliberately absent: an empty SFTP password is evaluated as a
    /// public-key login.
    pub fn rejects_empty_password(&self) -> bool {
        matches!(self, Protocol::Ftp | Protocol::Ftps)
    }

    /// Returns the protocol name as sent on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Protocol::Sftp => "SFTP",
            Protocol::Ftp => "FTP",
            Protocol::Ftps => "FTPS",
            Protocol::Other(name) => name,
        }
    }
}

impl From<String> for Protocol {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SFTP" => Protocol::Sftp,
            "FTP" => Protocol::Ftp,
            "FTPS" => Protocol::Ftps,
            _ => Protocol::Other(value),
        }
    }
}

impl From<&str> for Protocol {
    fn from(value: &str) -> Self {
        Protocol::from(value.to_string())
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
