pub mod bundles;
mod env_overrides;
pub mod identities;
pub mod log;
pub mod session;

use config::{Config, File, FileFormat, FileSourceFile};
use envconfig::Envconfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::{Path, PathBuf};

use crate::{
    bundles::BundlesConfig,
    env_overrides::{EnvVarOverrides, EnvVarOverridesError},
    identities::IdentitiesConfig,
    log::LoggingConfig,
    session::SessionConfig,
};

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RouteGateConfig {
    #[serde(skip)]
    root_directory: PathBuf,

    /// The logger configuration.
    ///
    /// Navigation decisions are logged at `debug` level; missing path parameters and
    /// failed bundle loads are logged as warnings.
    #[serde(default)]
    pub log: LoggingConfig,

    /// Configuration of the session holding the signed-in principal.
    #[serde(default)]
    pub session: SessionConfig,

    /// Configuration of the translation bundles loaded before a view renders.
    #[serde(default)]
    pub bundles: BundlesConfig,

    /// The canned identities available on the login screen.
    /// Defaults to a `viewer` (`VIEW_POSTS`, `VIEW_COMMENTS`) and an `admin` (all permissions).
    #[serde(default)]
    pub identities: IdentitiesConfig,
}

impl RouteGateConfig {
    /// Directory the configuration was loaded from. Relative paths are resolved against it.
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_directory.join(path)
        }
    }

    pub fn bundles_directory(&self) -> Option<PathBuf> {
        self.bundles
            .directory
            .as_deref()
            .map(|dir| self.resolve_path(dir))
    }

    pub fn session_persist_path(&self) -> Option<PathBuf> {
        self.session
            .persist_path
            .as_deref()
            .map(|path| self.resolve_path(path))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouteGateConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to apply configuration overrides: {0}")]
    EnvVarOverridesError(#[from] EnvVarOverridesError),
    #[error("Failed to load the environment variables: {0}")]
    EnvVarLoadError(#[from] envconfig::Error),
    #[error("Failed to get the current directory: {0}")]
    CurrentDirError(std::io::Error),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "route-gate.config.yaml",
    "route-gate.config.yml",
    "route-gate.config.json",
    "route-gate.config.json5",
];

fn get_current_dir() -> Result<PathBuf, RouteGateConfigError> {
    std::env::current_dir().map_err(RouteGateConfigError::CurrentDirError)
}

pub fn load_config(
    override_config_path: Option<String>,
) -> Result<RouteGateConfig, RouteGateConfigError> {
    let env_overrides = EnvVarOverrides::init_from_env()?;
    let mut config = Config::builder();
    let mut config_root_path = get_current_dir()?;

    if let Some(path_str) = override_config_path {
        let path_buf = path_str
            .parse::<PathBuf>()
            .map_err(RouteGateConfigError::ConfigPathParseError)?;

        if let Some(parent_dir) = path_buf.parent() {
            config_root_path = config_root_path.join(parent_dir);
        }

        let as_file: File<FileSourceFile, _> = path_buf.into();
        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    config = env_overrides.apply_overrides(config)?;

    let mut base_cfg = config.build()?.try_deserialize::<RouteGateConfig>()?;
    base_cfg.root_directory = config_root_path;

    Ok(base_cfg)
}

pub fn parse_yaml_config(config_raw: &str) -> Result<RouteGateConfig, RouteGateConfigError> {
    let mut base_cfg = Config::builder()
        .add_source(File::from_str(config_raw, FileFormat::Yaml))
        .build()?
        .try_deserialize::<RouteGateConfig>()?;
    base_cfg.root_directory = get_current_dir()?;

    Ok(base_cfg)
}
