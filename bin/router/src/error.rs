use route_gate_config::RouteGateConfigError;

use crate::{routes::RouteTableError, script::ScriptError, session::SessionError};

#[derive(Debug, thiserror::Error)]
pub enum RouterInitError {
    #[error(transparent)]
    RouteGateConfigError(#[from] RouteGateConfigError),
    #[error("Invalid route table: {0}")]
    RouteTableError(#[from] RouteTableError),
    #[error(transparent)]
    SessionError(#[from] SessionError),
    #[error("Failed to install the logger: {0}")]
    LoggerInitError(#[from] tracing_subscriber::util::TryInitError),
    #[error("Failed to read script '{0}': {1}")]
    ScriptReadError(String, std::io::Error),
    #[error(transparent)]
    ScriptError(#[from] ScriptError),
}
