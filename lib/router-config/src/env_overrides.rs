use config::{builder::BuilderState, ConfigBuilder, ConfigError};
use envconfig::Envconfig;
use tracing::debug;

use crate::log::{LogFormat, LogLevel};

#[derive(Envconfig)]
pub struct EnvVarOverrides {
    // Logger overrides
    #[envconfig(from = "LOG_LEVEL")]
    pub log_level: Option<LogLevel>,
    #[envconfig(from = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
    #[envconfig(from = "LOG_FILTER")]
    pub log_filter: Option<String>,

    // Bundle overrides
    #[envconfig(from = "BUNDLES_DIRECTORY")]
    pub bundles_directory: Option<String>,
    #[envconfig(from = "BUNDLES_LOCALE")]
    pub bundles_locale: Option<String>,

    // Session overrides
    #[envconfig(from = "SESSION_PERSIST_PATH")]
    pub session_persist_path: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvVarOverridesError {
    #[error("Failed to override configuration: {0}")]
    FailedToOverrideConfig(#[from] ConfigError),
    #[error("Environment variable {0} cannot be empty")]
    EmptyEnvVar(&'static str),
}

impl EnvVarOverrides {
    pub fn apply_overrides<T: BuilderState>(
        mut self,
        mut config: ConfigBuilder<T>,
    ) -> Result<ConfigBuilder<T>, EnvVarOverridesError> {
        if let Some(log_level) = self.log_level.take() {
            debug!("[config-override] 'log.level' = {:?}", log_level);
            config = config.set_override("log.level", log_level.as_ref())?;
        }
        if let Some(log_format) = self.log_format.take() {
            debug!("[config-override] 'log.format' = {:?}", log_format);
            config = config.set_override("log.format", log_format.as_ref())?;
        }
        if let Some(log_filter) = self.log_filter.take() {
            debug!("[config-override] 'log.filter' = {:?}", log_filter);
            config = config.set_override("log.filter", log_filter)?;
        }

        if let Some(directory) = self.bundles_directory.take() {
            debug!("[config-override] 'bundles.directory' = {}", directory);
            config = config.set_override("bundles.directory", directory)?;
        }

        if let Some(locale) = self.bundles_locale.take() {
            if locale.trim().is_empty() {
                return Err(EnvVarOverridesError::EmptyEnvVar("BUNDLES_LOCALE"));
            }
            debug!("[config-override] 'bundles.locale' = {}", locale);
            config = config.set_override("bundles.locale", locale)?;
        }

        if let Some(persist_path) = self.session_persist_path.take() {
            debug!("[config-override] 'session.persist_path' = {}", persist_path);
            config = config.set_override("session.persist_path", persist_path)?;
        }

        Ok(config)
    }
}
