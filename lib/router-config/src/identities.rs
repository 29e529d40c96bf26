use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A canned identity the mock login screen can sign in as.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Display name of the principal.
    pub identity: String,
    /// Permission tokens granted to the principal, for example `VIEW_POSTS`.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Canned identities, keyed by profile name (`viewer`, `admin`, ...).
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(transparent)]
pub struct IdentitiesConfig(pub BTreeMap<String, IdentityConfig>);

impl IdentitiesConfig {
    pub fn get(&self, profile: &str) -> Option<&IdentityConfig> {
        self.0.get(profile)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl Default for IdentitiesConfig {
    fn default() -> Self {
        let mut identities = BTreeMap::new();

        identities.insert(
            "viewer".to_string(),
            IdentityConfig {
                identity: "John Doe".to_string(),
                permissions: vec!["VIEW_POSTS".to_string(), "VIEW_COMMENTS".to_string()],
            },
        );
        identities.insert(
            "admin".to_string(),
            IdentityConfig {
                identity: "Jane Smith".to_string(),
                permissions: vec![
                    "VIEW_POSTS".to_string(),
                    "VIEW_COMMENTS".to_string(),
                    "EDIT_POST".to_string(),
                    "CREATE_POST".to_string(),
                ],
            },
        );

        Self(identities)
    }
}
