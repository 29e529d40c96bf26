pub mod app;
pub mod bundles;
pub mod error;
pub mod guard;
mod logger;
pub mod navigation;
pub mod permissions;
pub mod routes;
pub mod script;
pub mod session;
#[cfg(test)]
mod testkit;

use route_gate_config::load_config;
use tracing::info;

pub use crate::{
    app::{App, Screen},
    error::RouterInitError,
    guard::{GuardSnapshot, GuardState, RouteGuard},
    navigation::{NavigationError, NavigationHandle, Navigator},
    routes::{RouteName, RouteParams, RouteTable},
};

use crate::{
    logger::configure_logging,
    script::{parse_script, run_script, DEFAULT_SCRIPT},
};

pub const ROUTE_GATE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn router_entrypoint(script_path: Option<String>) -> Result<(), RouterInitError> {
    let config_path = std::env::var("ROUTE_GATE_CONFIG_FILE_PATH").ok();
    let config = load_config(config_path)?;
    let _log_guards = configure_logging(&config.log)?;
    info!("route-gate@{} starting...", ROUTE_GATE_VERSION);

    let source = match script_path {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|err| RouterInitError::ScriptReadError(path, err))?,
        None => DEFAULT_SCRIPT.to_string(),
    };
    let commands = parse_script(&source)?;

    let app = App::from_config(&config)?;
    run_script(&app, &commands).await;

    info!(
        history = ?app.history().paths(),
        bundles = ?app.translations().loaded(),
        "script finished"
    );

    Ok(())
}
