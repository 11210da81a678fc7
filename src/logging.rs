//! Tracing setup
//!
//! The TUI owns the terminal, so events go to a daily file under the local
//! data directory, next to the session store.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "tunebox.log";
const DEFAULT_DIRECTIVES: &str = "tunebox=debug,reqwest=info,librespot=info,warn";

/// `<data_local_dir>/tunebox/logs`, or `./logs` without a data directory
pub fn log_dir() -> PathBuf {
    log_dir_in(dirs::data_local_dir())
}

fn log_dir_in(data_dir: Option<PathBuf>) -> PathBuf {
    match data_dir {
        Some(base) => base.join("tunebox").join("logs"),
        None => PathBuf::from("logs"),
    }
}

/// Directives from `RUST_LOG` when it holds any, the built-in set otherwise
fn directives(from_env: Option<String>) -> String {
    from_env
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string())
}

fn filter() -> EnvFilter {
    let wanted = directives(std::env::var(EnvFilter::DEFAULT_ENV).ok());
    EnvFilter::try_new(&wanted).unwrap_or_else(|e| {
        eprintln!("Ignoring {}={:?}: {}", EnvFilter::DEFAULT_ENV, wanted, e);
        EnvFilter::new(DEFAULT_DIRECTIVES)
    })
}

/// Install the global subscriber writing to `dir`.
///
/// Buffered lines are flushed when the returned guard drops, so keep it
/// alive until shutdown.
pub fn init_logging(dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;

    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()?;

    tracing::info!(dir = %dir.display(), "Logging to file");
    Ok(guard)
}

/// Log the outcome of an `ApiResult`, with the HTTP status when there is one
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::debug!(operation = $operation, "API request successful"),
            Err(e) => tracing::error!(
                operation = $operation,
                status = ?e.status(),
                error = %e,
                "API request failed"
            ),
        }
    };
}

#[macro_export]
macro_rules! log_api_request {
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "API request started");
    };
}
