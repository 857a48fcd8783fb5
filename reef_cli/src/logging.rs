//! Tracing setup: console layer on stderr plus an optional JSON file sink.

use std::path::Path;

use eyre::{WrapErr, eyre};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LEVEL: &str = "warn";

/// Level precedence: `RUST_LOG`, then `--log-level`, then `[logging].level`.
fn env_filter(cli_level: Option<&str>, cfg_level: Option<&str>) -> eyre::Result<EnvFilter> {
    if let Ok(f) = EnvFilter::try_from_default_env() {
        return Ok(f);
    }
    let level = cli_level.or(cfg_level).unwrap_or(DEFAULT_LEVEL);
    EnvFilter::try_new(level).map_err(|e| eyre!("invalid log level '{level}': {e}"))
}

/// The returned guard flushes the file sink on drop; hold it until exit.
pub fn init_tracing(
    cli_level: Option<&str>,
    json: bool,
    cfg: &reef_config::Logging,
) -> eyre::Result<Option<WorkerGuard>> {
    let filter = env_filter(cli_level, cfg.level.as_deref())?;
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let mut guard = None;

    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    if json {
        layers.push(console.json().boxed());
    } else {
        layers.push(console.compact().boxed());
    }

    if let Some(file) = cfg.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .wrap_err_with(|| format!("create log directory {}", dir.display()))?;
        let name = path
            .file_name()
            .ok_or_else(|| eyre!("logging.file has no file name: {file}"))?;
        let appender = match cfg.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        guard = Some(file_guard);
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| eyre!("init tracing: {e}"))?;
    Ok(guard)
}
