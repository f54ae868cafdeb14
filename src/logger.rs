use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "docujudge.log";
pub const LOG_ENV: &str = "DOCUJUDGE_LOG";

/// Sends `tracing` output to `<dir>/docujudge.log`; the terminal belongs to
/// the UI. Keep the guard alive until exit or buffered lines are lost.
pub fn init(dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_logger_writes_to_file() {
        let dir = TempDir::new().unwrap();
        let guard = init(dir.path()).unwrap();
        tracing::info!("Test log message");
        drop(guard);

        let content = std::fs::read_to_string(dir.path().join(LOG_FILE)).unwrap();
        assert!(content.contains("Test log message"));
    }
}
