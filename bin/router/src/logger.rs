use route_gate_config::log::LoggingConfig;
use route_gate_internal::logging::logging_layers_from_logger_config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::RouterInitError;

/// Installs the global subscriber. The returned guards flush buffered log lines
/// when dropped, so they must outlive the application.
pub fn configure_logging(config: &LoggingConfig) -> Result<Vec<WorkerGuard>, RouterInitError> {
    let (layers, guards) = logging_layers_from_logger_config(config);

    tracing_subscriber::registry().with(layers).try_init()?;

    Ok(guards)
}
