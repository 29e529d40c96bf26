use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use ahash::HashMap;
use async_trait::async_trait;
use dashmap::DashMap;
use route_gate_config::RouteGateConfig;
use serde_json::Value;
use tracing::{debug, trace};

use crate::bundles::{BundleLoadError, BundleLoader};

type Table = HashMap<String, String>;

#[derive(Debug, Default)]
struct LoadedBundle {
    primary: Table,
    fallback: Table,
}

/// Translation bundles read from `<directory>/<locale>/<bundle>.json`.
///
/// Lookups go through the active locale, then the fallback locale, then the
/// caller's default string. Without a directory every bundle loads as an
/// empty table, so only defaults are served.
pub struct TranslationStore {
    directory: Option<PathBuf>,
    locale: String,
    fallback_locale: String,
    bundles: DashMap<String, Arc<LoadedBundle>>,
}

impl TranslationStore {
    pub fn new(
        directory: Option<PathBuf>,
        locale: impl Into<String>,
        fallback_locale: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            locale: locale.into(),
            fallback_locale: fallback_locale.into(),
            bundles: DashMap::new(),
        }
    }

    pub fn from_config(config: &RouteGateConfig) -> Self {
        Self::new(
            config.bundles_directory(),
            config.bundles.locale.clone(),
            config.bundles.fallback_locale.clone(),
        )
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Names of the bundles loaded so far, sorted.
    pub fn loaded(&self) -> Vec<String> {
        let mut names = self
            .bundles
            .iter()
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    /// Looks up `bundle:key`, for example `posts:title`. Nested JSON objects are
    /// addressed with dots (`posts:form.title`).
    pub fn translate(&self, key: &str, default: &str) -> String {
        let Some((bundle, key)) = key.split_once(':') else {
            return default.to_string();
        };

        self.bundles
            .get(bundle)
            .and_then(|loaded| {
                loaded
                    .primary
                    .get(key)
                    .or_else(|| loaded.fallback.get(key))
                    .cloned()
            })
            .unwrap_or_else(|| default.to_string())
    }
}

async fn read_table(
    directory: &Path,
    bundle: &str,
    locale: &str,
) -> Result<Option<Table>, BundleLoadError> {
    let path = directory.join(locale).join(format!("{}.json", bundle));

    let raw = match tokio::fs::read(&path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            trace!(path = %path.display(), "no translations for locale");
            return Ok(None);
        }
        Err(source) => {
            return Err(BundleLoadError::Read {
                bundle: bundle.to_string(),
                path,
                source,
            })
        }
    };

    let value: Value =
        serde_json::from_slice(&raw).map_err(|source| BundleLoadError::Decode {
            bundle: bundle.to_string(),
            path: path.clone(),
            source,
        })?;

    let mut table = Table::default();
    flatten_into(&mut table, String::new(), value);

    Ok(Some(table))
}

fn flatten_into(table: &mut Table, prefix: String, value: Value) {
    match value {
        Value::Object(entries) => {
            for (key, value) in entries {
                let key = if prefix.is_empty() {
                    key
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(table, key, value);
            }
        }
        Value::String(text) => {
            table.insert(prefix, text);
        }
        Value::Null => {}
        other => {
            table.insert(prefix, other.to_string());
        }
    }
}

#[async_trait]
impl BundleLoader for TranslationStore {
    fn is_ready(&self, bundles: &[String]) -> bool {
        bundles.iter().all(|bundle| self.bundles.contains_key(bundle))
    }

    async fn load(&self, bundle: &str) -> Result<(), BundleLoadError> {
        if self.bundles.contains_key(bundle) {
            return Ok(());
        }

        let loaded = match self.directory.as_deref() {
            None => LoadedBundle::default(),
            Some(directory) => {
                let primary = read_table(directory, bundle, &self.locale).await?;
                let fallback = if self.fallback_locale == self.locale {
                    None
                } else {
                    read_table(directory, bundle, &self.fallback_locale).await?
                };

                if primary.is_none() && fallback.is_none() {
                    return Err(BundleLoadError::NotFound {
                        bundle: bundle.to_string(),
                        locales: vec![self.locale.clone(), self.fallback_locale.clone()],
                    });
                }

                LoadedBundle {
                    primary: primary.unwrap_or_default(),
                    fallback: fallback.unwrap_or_default(),
                }
            }
        };

        debug!(
            bundle,
            locale = %self.locale,
            keys = loaded.primary.len(),
            "translations ready"
        );
        self.bundles.insert(bundle.to_string(), Arc::new(loaded));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::TranslationStore;
    use crate::bundles::{BundleLoadError, BundleLoader};

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "route-gate-bundles-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);

        std::fs::create_dir_all(dir.join("tr")).unwrap();
        std::fs::create_dir_all(dir.join("en")).unwrap();
        std::fs::write(
            dir.join("tr").join("posts.json"),
            r#"{ "title": "Gönderiler", "form": { "save": "Kaydet" } }"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("en").join("posts.json"),
            r#"{ "title": "Posts", "empty": "No posts yet" }"#,
        )
        .unwrap();
        std::fs::write(dir.join("en").join("errors.json"), r#"{ "forbidden": "Forbidden" }"#)
            .unwrap();
        std::fs::write(dir.join("tr").join("broken.json"), "{ nope").unwrap();

        dir
    }

    fn names(bundles: &[&str]) -> Vec<String> {
        bundles.iter().map(|bundle| bundle.to_string()).collect()
    }

    #[tokio::test]
    async fn lookups_fall_back_to_the_fallback_locale_then_the_default() {
        let store = TranslationStore::new(Some(fixture_dir("lookup")), "tr", "en");

        assert!(!store.is_ready(&names(&["posts"])));
        store.load("posts").await.unwrap();
        assert!(store.is_ready(&names(&["posts"])));

        assert_eq!(store.translate("posts:title", "?"), "Gönderiler");
        assert_eq!(store.translate("posts:form.save", "?"), "Kaydet");
        assert_eq!(store.translate("posts:empty", "?"), "No posts yet");
        assert_eq!(store.translate("posts:missing", "Missing"), "Missing");
        assert_eq!(store.translate("comments:title", "Comments"), "Comments");
        assert_eq!(store.translate("title", "Title"), "Title");
    }

    #[tokio::test]
    async fn bundle_only_in_fallback_locale_is_ready() {
        let store = TranslationStore::new(Some(fixture_dir("fallback")), "tr", "en");

        store.load("errors").await.unwrap();

        assert_eq!(store.translate("errors:forbidden", "?"), "Forbidden");
    }

    #[tokio::test]
    async fn failed_bundles_stay_unready() {
        let store = TranslationStore::new(Some(fixture_dir("failures")), "tr", "en");

        assert!(matches!(
            store.load("dashboard").await,
            Err(BundleLoadError::NotFound { .. })
        ));
        assert!(matches!(
            store.load("broken").await,
            Err(BundleLoadError::Decode { .. })
        ));
        assert!(!store.is_ready(&names(&["dashboard"])));
        assert!(!store.is_ready(&names(&["broken"])));
        assert_eq!(store.translate("dashboard:title", "Dashboard"), "Dashboard");
    }

    #[tokio::test]
    async fn without_a_directory_bundles_are_empty() {
        let store = TranslationStore::new(None, "tr", "en");

        store.load("posts").await.unwrap();
        store.load("auth").await.unwrap();

        assert_eq!(store.loaded(), vec!["auth", "posts"]);
        assert_eq!(store.translate("posts:title", "Posts"), "Posts");
    }
}
