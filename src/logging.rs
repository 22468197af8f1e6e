use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::time, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or empty.
pub const DEFAULT_DIRECTIVES: &str = "grid_snake=info";

/// Installs the global tracing subscriber, appending to `path`.
///
/// The terminal is owned by the game while it runs, so events only go to a
/// file. `RUST_LOG` wins over [`DEFAULT_DIRECTIVES`].
/// Call once, early; a second call fails.
pub fn init(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_timer(time::uptime())
                .with_writer(Mutex::new(file)),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .parse(filter_directives(directives.as_deref()))?,
        )
        .try_init()?;

    Ok(())
}

fn filter_directives(from_env: Option<&str>) -> &str {
    match from_env {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ => DEFAULT_DIRECTIVES,
    }
}
