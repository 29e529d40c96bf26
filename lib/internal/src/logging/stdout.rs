use std::io::IsTerminal;

use route_gate_config::log::{LogFormat, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, fmt::time::UtcTime, Layer};

use crate::logging::utils::{create_filter, DynLayer};

/// Stdout layer writing through a non-blocking worker. The guard must be kept
/// alive for buffered lines to be flushed.
pub fn build_stdout_layer<S>(config: &LoggingConfig) -> (DynLayer<S>, WorkerGuard)
where
    S: tracing::Subscriber
        + for<'span> tracing_subscriber::registry::LookupSpan<'span>
        + Send
        + Sync,
{
    let stdout = std::io::stdout();
    let ansi = stdout.is_terminal();
    let (writer, guard) = tracing_appender::non_blocking(stdout);

    let base = fmt::layer()
        .with_writer(writer)
        .with_timer(UtcTime::rfc_3339())
        .with_thread_ids(false);

    let formatted: DynLayer<S> = match config.format {
        LogFormat::Json => base
            .json()
            .with_ansi(false)
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .boxed(),
        LogFormat::Text => base
            .compact()
            .with_ansi(ansi)
            .with_target(config.log_internals)
            .boxed(),
    };

    (formatted.with_filter(create_filter(config)).boxed(), guard)
}
