pub mod adapters;
pub mod app;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod state;

pub use adapters::{LocalStore, RemoteStore, StorageAdapter, STORAGE_KEY};
pub use app::App;
pub use client::DataClient;
pub use config::{RemoteConfig, Settings};
pub use errors::{AppError, AppResult};
pub use models::{Block, BlockInstance, DataMode, Document, StateStats, Task};
pub use state::normalize;

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn init_tracing(log_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "goalstreak.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
