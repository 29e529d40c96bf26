use std::str::FromStr;

use route_gate_config::log::{LogLevel, LoggingConfig};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, Layer};

static INTERNAL_CRATES: &[&str] = &["tokio", "tokio_util", "runtime", "mio"];

pub fn level_filter(log_level: &LogLevel) -> LevelFilter {
    match log_level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    }
}

pub fn create_targets_filter(log_level: &LogLevel, internals: bool) -> Targets {
    let level_filter = level_filter(log_level);

    Targets::new()
        .with_targets(
            INTERNAL_CRATES
                .iter()
                .map(|crate_name| {
                    (
                        *crate_name,
                        match internals {
                            true => level_filter,
                            false => LevelFilter::OFF,
                        },
                    )
                })
                .collect::<Vec<(&str, LevelFilter)>>(),
        )
        .with_default(level_filter)
}

/// An explicit `filter` wins over `level`. An unparsable filter falls back to the level.
pub fn create_filter(config: &LoggingConfig) -> Targets {
    if let Some(raw) = config.filter.as_deref() {
        match Targets::from_str(raw) {
            Ok(targets) => return targets,
            Err(err) => eprintln!("invalid log filter '{}', using level instead: {}", raw, err),
        }
    }

    create_targets_filter(&config.level, config.log_internals)
}

pub type DynLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;
