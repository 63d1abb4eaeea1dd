use anyhow::{Context, Result};
use roundtable_infrastructure::RoundtablePaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "roundtable=info";

/// Sends logs to a daily file under the data directory so the terminal
/// stays free for the conversation. `RUST_LOG` overrides the filter.
///
/// Keep the returned guard alive until exit; dropping it flushes the file.
pub fn init(paths: &RoundtablePaths) -> Result<WorkerGuard> {
    let logs_dir = paths.logs_dir();
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create log directory {:?}", logs_dir))?;

    let appender = tracing_appender::rolling::daily(&logs_dir, "roundtable.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
