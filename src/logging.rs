//! File logging for the reader
//!
//! The terminal belongs to the UI, so every event goes to
//! `{config_dir}/verbum/logs/verbum.log` with daily rotation.
//! `RUST_LOG` overrides the default `info` filter.

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use verbum_core::Config;

/// Keep the returned guard alive for the whole session or buffered lines are lost
pub fn init() -> Result<WorkerGuard> {
    let logs_dir = Config::config_dir()?.join("logs");
    std::fs::create_dir_all(&logs_dir)?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, "verbum.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(file_layer).init();
    Ok(guard)
}
