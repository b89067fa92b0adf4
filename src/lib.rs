pub mod analytics;
pub mod classify;
pub mod clock;
pub mod config;
pub mod db;
pub mod lifecycle;
pub mod models;
pub mod session;
pub mod sink;
pub mod storage;
pub mod tracking;
mod utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

pub use config::TrackerConfig;
pub use db::Database;
pub use tracking::{PageTracker, Tracker};

/// Optional JSON file layered under the `TRACKER_*` environment variables.
pub const CONFIG_PATH_ENV: &str = "TRACKER_CONFIG";

fn load_config() -> Result<TrackerConfig> {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) => TrackerConfig::load(&PathBuf::from(path)),
        None => Ok(TrackerConfig::from_env()),
    }
}

/// Opens the local analytics store and prints the dashboard report.
pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = load_config()?;
    log::info!(
        "Session tracker report for {} ({})",
        config.site_domain,
        config.db_path.display()
    );

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let report = runtime.block_on(async {
        let db = Database::new(config.db_path.clone())?;
        analytics::build_dashboard(&db, Utc::now()).await
    })?;

    println!("{}", analytics::render_text(&report));
    Ok(())
}
