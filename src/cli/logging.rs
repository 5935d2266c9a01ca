//! Subscriber setup: console output plus a daily rolling log file.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use docsum::config::LoggingConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `logging.level`; `--verbose` forces debug. The
/// returned guard flushes the file writer on drop and must outlive the run.
pub fn init(config: &LoggingConfig, verbose: bool) -> Option<WorkerGuard> {
    let level = if verbose {
        "debug".to_string()
    } else {
        config.filter_level()
    };
    let default_filter = format!("docsum={}", level);
    let env_filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let appender = std::fs::create_dir_all(&config.log_dir)
        .map_err(|e| e.to_string())
        .and_then(|_| {
            Builder::new()
                .rotation(Rotation::DAILY)
                .filename_prefix("docsum")
                .filename_suffix("log")
                .max_log_files(config.max_log_days.max(1))
                .build(&config.log_dir)
                .map_err(|e| e.to_string())
        });

    match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer())
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer())
                .init();
            tracing::warn!(
                "File logging disabled, cannot use {}: {}",
                config.log_dir.display(),
                e
            );
            None
        }
    }
}
