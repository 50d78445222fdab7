mod app;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io,
};

use dealership_core::{
    config::{self, AppConfig},
    FileResource, InventoryStore,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

fn main() -> Result<()> {
    init_logging()?;

    let config_path = config::ensure_default_config()?;
    let config = AppConfig::load()?;
    info!(
        "using configuration {} with inventory {}",
        config_path.display(),
        config.inventory_path.display()
    );

    let resource = FileResource::new(&config.inventory_path);
    let store = InventoryStore::open(config.fallback_header(), resource).with_context(|| {
        format!(
            "failed to load inventory from {}",
            config.inventory_path.display()
        )
    })?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut app = app::ConsoleApp::new(store, stdin.lock(), stdout.lock());
    app.run()
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("dealership.log");

    let env_filter = EnvFilter::from_default_env();

    // The menu owns stdout, so console logging goes to stderr.
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
