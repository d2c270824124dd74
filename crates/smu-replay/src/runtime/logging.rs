use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with optional JSON output and optional
/// rolling file output. The returned guard must stay alive for the run so
/// buffered file records are flushed on exit.
pub fn init_tracing(json_output: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,smu_replay=debug,replay_core=debug"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "smu-replay.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            if json_output {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json().with_writer(writer))
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().with_ansi(false).with_writer(writer))
                    .init();
            }
            Some(guard)
        }
        None => {
            if json_output {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
            None
        }
    }
}
