pub mod stdout;
pub mod utils;

use route_gate_config::log::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;

use crate::logging::{stdout::build_stdout_layer, utils::DynLayer};

/// Layers to install on the global subscriber, with the guards of their writers.
pub fn logging_layers_from_logger_config<S>(
    config: &LoggingConfig,
) -> (Vec<DynLayer<S>>, Vec<WorkerGuard>)
where
    S: tracing::Subscriber
        + for<'span> tracing_subscriber::registry::LookupSpan<'span>
        + Send
        + Sync,
{
    let (stdout, guard) = build_stdout_layer(config);

    (vec![stdout], vec![guard])
}
