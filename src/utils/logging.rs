use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{fmt::writer::MakeWriterExt, EnvFilter};

pub const CLI_PREFIX: &str = "cli";

const DEFAULT_DIRECTIVE: &str = "info";

/// Directive for the crate's own events. An explicit level wins over `RUST_LOG`.
fn crate_directive(log_level: Option<LevelFilter>, env_level: Option<String>) -> String {
    let level = log_level
        .map(|v| v.to_string().to_lowercase())
        .or(env_level.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.into());
    format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"))
}

/// Installs the global subscriber. Logs always go into a daily rotated file inside
/// `<application_data_path>/logs`, stdout only receives them when `show_std` is set.
pub fn enable_logging(
    prefix: &str,
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(prefix)
        .build(application_data_path.join("logs"))?;

    let stdout = std::io::stdout.with_filter(move |_| show_std);
    let directive = crate_directive(log_level, std::env::var("RUST_LOG").ok());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(stdout.and(appender))
        .with_ansi(false)
        .compact()
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .compact()
        .try_init();
});
