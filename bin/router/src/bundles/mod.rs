pub mod translations;

use std::{io, path::PathBuf, time::Duration};

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

pub use translations::TranslationStore;

#[derive(Debug, thiserror::Error)]
pub enum BundleLoadError {
    #[error("bundle '{bundle}' has no translations for locales {locales:?}")]
    NotFound {
        bundle: String,
        locales: Vec<String>,
    },
    #[error("failed to read bundle '{bundle}' from '{path}': {source}")]
    Read {
        bundle: String,
        path: PathBuf,
        source: io::Error,
    },
    #[error("bundle '{bundle}' at '{path}' is malformed: {source}")]
    Decode {
        bundle: String,
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("bundle '{bundle}' did not load within {timeout:?}")]
    Timeout { bundle: String, timeout: Duration },
}

/// Source of the named resource bundles a view needs before it renders.
#[async_trait]
pub trait BundleLoader: Send + Sync {
    /// `true` when every bundle of `bundles` is loaded. An empty list is always ready.
    fn is_ready(&self, bundles: &[String]) -> bool;

    async fn load(&self, bundle: &str) -> Result<(), BundleLoadError>;
}

/// Loads `bundles` concurrently and waits until every load settled.
///
/// Each load is bounded by `timeout`. Failures are logged and reported back,
/// they never abort the other loads.
pub async fn load_bundles(
    loader: &dyn BundleLoader,
    bundles: &[String],
    timeout: Duration,
) -> Vec<Result<(), BundleLoadError>> {
    let loads = bundles.iter().map(|bundle| async move {
        let result = match tokio::time::timeout(timeout, loader.load(bundle)).await {
            Ok(result) => result,
            Err(_) => Err(BundleLoadError::Timeout {
                bundle: bundle.clone(),
                timeout,
            }),
        };

        match &result {
            Ok(()) => debug!(bundle = %bundle, "bundle loaded"),
            Err(err) => warn!(
                bundle = %bundle,
                "failed to load bundle, continuing without it: {}",
                err
            ),
        }

        result
    });

    join_all(loads).await
}
