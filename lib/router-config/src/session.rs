use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Path of a JSON file used to keep the signed-in principal across restarts.
    /// Relative to the location of the root configuration file.
    ///
    /// When not set, the session lives in memory only.
    ///
    /// Can also be set via the `SESSION_PERSIST_PATH` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist_path: Option<String>,
}
