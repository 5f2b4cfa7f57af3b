//! Scoped session policy handed back to the transfer service.
//!
//! The document confines a user to their own prefix of the storage bucket:
//! list and read everything under `{username}/`, write only under
//! `{username}/clearing/inbound/`, never delete the `clearing` folder itself,
//! and use the bucket's KMS key.

use serde::Serialize;

/// IAM policy language version.
pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: &'static str,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub sid: &'static str,
    pub effect: Effect,
    pub action: Vec<&'static str>,
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Condition {
    #[serde(rename = "StringLike")]
    pub string_like: PrefixMatch,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrefixMatch {
    #[serde(rename = "s3:prefix")]
    pub prefix: Vec<String>,
}

impl PolicyDocument {
    /// Build the per-user policy.
    ///
    /// Resources are plain string interpolations of the ARNs and the
    /// username; nothing is escaped or normalised.
    pub fn for_user(username: &str, storage_arn: &str, kms_key_arn: &str) -> Self {
        let statement = vec![
            Statement {
                sid: "AllowListingOfUserFolder",
                effect: Effect::Allow,
                action: vec!["s3:ListBucket"],
                resource: storage_arn.to_string(),
                condition: Some(Condition {
                    string_like: PrefixMatch {
                        prefix: vec![format!("{}/*", username), username.to_string()],
                    },
                }),
            },
            Statement {
                sid: "DenyFolderDeletion",
                effect: Effect::Deny,
                action: vec!["s3:DeleteObject", "s3:DeleteObjectVersion"],
                resource: format!("{}/{}/clearing", storage_arn, username),
                condition: None,
            },
            Statement {
                sid: "DefaultHomeFolderObjectReadOnlyAccess",
                effect: Effect::Allow,
                action: vec!["s3:GetObject", "s3:GetObjectVersion", "s3:GetObjectACL"],
                resource: format!("{}/{}/*", storage_arn, username),
                condition: None,
            },
            Statement {
                sid: "InboundFolderObjectReadWriteAccess",
                effect: Effect::Allow,
                action: vec![
                    "s3:PutObject",
                    "s3:GetObject",
                    "s3:DeleteObjectVersion",
                    "s3:DeleteObject",
                    "s3:GetObjectVersion",
                    "s3:GetObjectACL",
                    "s3:PutObjectACL",
                ],
                resource: format!("{}/{}/clearing/inbound/*", storage_arn, username),
                condition: None,
            },
            Statement {
                sid: "KMSKeyAccess",
                effect: Effect::Allow,
                action: vec![
                    "kms:Encrypt",
                    "kms:Decrypt",
                    "kms:ReEncrypt*",
                    "kms:GenerateDataKey*",
                    "kms:DescribeKey",
                ],
                resource: kms_key_arn.to_string(),
                condition: None,
            },
        ];

        Self {
            version: POLICY_VERSION,
            statement,
        }
    }

    /// Serialize to the string form carried in the `Policy` response field.
    pub fn to_json(&self) -> String {
        // Only strings and fixed enums inside; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const BUCKET: &str = "arn:aws:s3:::bucket";
    const KEY: &str = "arn:aws:kms:eu-west-1:111122223333:key/abcd";

    fn rendered(username: &str) -> Value {
        let doc = PolicyDocument::for_user(username, BUCKET, KEY);
        serde_json::from_str(&doc.to_json()).unwrap()
    }

    #[test]
    fn version_and_statement_order() {
        let value = rendered("alice");
        assert_eq!(value["Version"], "2012-10-17");
        let sids: Vec<&str> = value["Statement"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["Sid"].as_str().unwrap())
            .collect();
        assert_eq!(
            sids,
            vec![
                "AllowListingOfUserFolder",
                "DenyFolderDeletion",
                "DefaultHomeFolderObjectReadOnlyAccess",
                "InboundFolderObjectReadWriteAccess",
                "KMSKeyAccess",
            ]
        );
    }

    #[test]
    fn resources_are_interpolated() {
        let value = rendered("alice");
        let statements = &value["Statement"];
        assert_eq!(statements[0]["Resource"], BUCKET);
        assert_eq!(statements[1]["Resource"], "arn:aws:s3:::bucket/alice/clearing");
        assert_eq!(statements[2]["Resource"], "arn:aws:s3:::bucket/alice/*");
        assert_eq!(
            statements[3]["Resource"],
            "arn:aws:s3:::bucket/alice/clearing/inbound/*"
        );
        assert_eq!(statements[4]["Resource"], KEY);
    }

    #[test]
    fn listing_condition_scopes_to_user_prefix() {
        let value = rendered("bob");
        assert_eq!(
            value["Statement"][0]["Condition"],
            json!({ "StringLike": { "s3:prefix": ["bob/*", "bob"] } })
        );
        assert!(value["Statement"][1].get("Condition").is_none());
    }

    #[test]
    fn effects_and_actions() {
        let value = rendered("alice");
        let statements = &value["Statement"];
        assert_eq!(statements[0]["Effect"], "Allow");
        assert_eq!(statements[1]["Effect"], "Deny");
        assert_eq!(
            statements[1]["Action"],
            json!(["s3:DeleteObject", "s3:DeleteObjectVersion"])
        );
        assert_eq!(statements[3]["Action"].as_array().unwrap().len(), 7);
        assert_eq!(
            statements[4]["Action"],
            json!([
                "kms:Encrypt",
                "kms:Decrypt",
                "kms:ReEncrypt*",
                "kms:GenerateDataKey*",
                "kms:DescribeKey"
            ])
        );
    }

    #[test]
    fn username_is_not_escaped() {
        let value = rendered("team/alice");
        assert_eq!(
            value["Statement"][2]["Resource"],
            "arn:aws:s3:::bucket/team/alice/*"
        );
    }
}
