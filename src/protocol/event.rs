//! Request and response events of the identity-provider contract.
//!
//! Field names are fixed by the file-transfer service: the request uses
//! camelCase (`serverId`, `sourceIp`), the response PascalCase (`Role`,
//! `PublicKeys`, ...). An all-`None` response serializes to `{}`, which the
//! service reads as a denied login.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Password, Protocol};
use crate::error::IdpError;

/// An incoming login attempt.
///
/// Every field is optional at this layer; presence checks are part of the
/// authentication decision, not of decoding.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub server_id: Option<String>,

    #[serde(default)]
    pub protocol: Option<Protocol>,

    #[serde(default)]
    pub password: Option<Password>,

    #[serde(default)]
    pub source_ip: Option<String>,
}

impl AuthRequest {
    /// Decode a request from a raw event value.
    ///
    /// Anything other than a JSON object is a malformed request, and so is a
    /// `password` key holding `null`: the key is present, so the attempt is a
    /// password login, yet there is nothing to compare.
    pub fn from_value(value: Value) -> Result<Self, IdpError> {
        let Some(fields) = value.as_object() else {
            return Err(IdpError::MalformedRequest(
                "event is not a JSON object".to_string(),
            ));
        };
        if fields.get("password").is_some_and(Value::is_null) {
            return Err(IdpError::MalformedRequest(
                "password is present but null".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Decode a request from raw event bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdpError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }
}

/// Home-directory mode reported back to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HomeDirectoryType {
    /// Virtual folder mapping taken from `HomeDirectoryDetails`.
    #[serde(rename = "LOGICAL")]
    Logical,
}

/// The authorization answer. `AuthResponse::default()` is a deny.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_keys: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_directory: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_directory_details: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_directory_type: Option<HomeDirectoryType>,
}

impl AuthResponse {
    /// The empty response that rejects the login.
    pub fn deny() -> Self {
        Self::default()
    }

    pub fn is_deny(&self) -> bool {
        *self == Self::default()
    }

    /// Serialize for the wire.
    pub fn to_json(&self) -> String {
        // A struct of strings and JSON values cannot fail to serialize; fall
        // back to the deny body regardless.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_full_event() {
        let req = AuthRequest::from_value(json!({
            "username": "alice",
            "serverId": "s-1234",
            "protocol": "FTPS",
            "password": "pw",
            "sourceIp": "10.0.0.1"
        }))
        .unwrap();
        assert_eq!(req.username.as_deref(), Some("alice"));
        assert_eq!(req.server_id.as_deref(), Some("s-1234"));
        assert_eq!(req.protocol, Some(Protocol::Ftps));
        assert!(req.password.unwrap().matches("pw"));
        assert_eq!(req.source_ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn decode_sparse_event() {
        let req = AuthRequest::from_value(json!({ "username": "bob" })).unwrap();
        assert_eq!(req.username.as_deref(), Some("bob"));
        assert!(req.server_id.is_none());
        assert!(req.protocol.is_none());
        assert!(req.password.is_none());
    }

    #[test]
    fn empty_password_is_present_not_absent() {
        let req = AuthRequest::from_value(json!({ "password": "" })).unwrap();
        assert!(req.password.unwrap().is_empty());
    }

    #[test]
    fn non_object_event_is_malformed() {
        match AuthRequest::from_value(json!(["username"])) {
            Err(IdpError::MalformedRequest(_)) => {}
            other => panic!("Expected MalformedRequest, got {:?}", other),
        }
        assert!(AuthRequest::from_slice(b"not json").is_err());
    }

    #[test]
    fn null_password_is_malformed() {
        match AuthRequest::from_value(json!({ "username": "alice", "password": null })) {
            Err(IdpError::MalformedRequest(msg)) => assert!(msg.contains("null")),
            other => panic!("Expected MalformedRequest, got {:?}", other),
        }
        assert!(AuthRequest::from_value(json!({ "username": "alice", "sourceIp": null })).is_ok());
    }

    #[test]
    fn wrong_field_type_is_malformed() {
        assert!(AuthRequest::from_value(json!({ "username": 42 })).is_err());
    }

    #[test]
    fn deny_serializes_to_empty_object() {
        let resp = AuthResponse::deny();
        assert!(resp.is_deny());
        assert_eq!(resp.to_json(), "{}");
    }

    #[test]
    fn response_uses_wire_field_names() {
        let resp = AuthResponse {
            role: Some("arn:aws:iam::1:role/r".to_string()),
            policy: Some("{}".to_string()),
            public_keys: Some(vec!["ssh-rsa AAA".to_string()]),
            home_directory: None,
            home_directory_details: Some(json!([{"Entry": "/", "Target": "/b/alice"}])),
            home_directory_type: Some(HomeDirectoryType::Logical),
        };
        let value: Value = serde_json::from_str(&resp.to_json()).unwrap();
        assert_eq!(value["Role"], "arn:aws:iam::1:role/r");
        assert_eq!(value["Policy"], "{}");
        assert_eq!(value["PublicKeys"], json!(["ssh-rsa AAA"]));
        assert_eq!(value["HomeDirectoryType"], "LOGICAL");
        assert_eq!(value["HomeDirectoryDetails"][0]["Entry"], "/");
        assert!(value.get("HomeDirectory").is_none());
    }
}
