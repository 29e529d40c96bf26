use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct BundlesConfig {
    /// Directory holding the translation bundles, laid out as `<directory>/<locale>/<bundle>.json`.
    /// Relative to the location of the root configuration file.
    ///
    /// When not set, every bundle resolves to an empty table and lookups fall back to their default strings.
    ///
    /// Can also be set via the `BUNDLES_DIRECTORY` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    /// The locale to load bundles for.
    ///
    /// Can also be set via the `BUNDLES_LOCALE` environment variable.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// The locale used when a bundle does not exist for `locale`.
    #[serde(default = "default_fallback_locale")]
    pub fallback_locale: String,

    /// Upper bound for loading a single bundle. A bundle that does not load in time
    /// is treated as failed, and the view renders with fallback strings.
    #[serde(
        default = "default_load_timeout",
        deserialize_with = "humantime_serde::deserialize",
        serialize_with = "humantime_serde::serialize"
    )]
    #[schemars(with = "String")]
    pub load_timeout: Duration,
}

fn default_locale() -> String {
    "tr".to_string()
}

fn default_fallback_locale() -> String {
    "en".to_string()
}

fn default_load_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for BundlesConfig {
    fn default() -> Self {
        Self {
            directory: None,
            locale: default_locale(),
            fallback_locale: default_fallback_locale(),
            load_timeout: default_load_timeout(),
        }
    }
}
