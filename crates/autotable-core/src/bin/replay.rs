//! Replay a recorded failed insert against a live backend
//!
//! Reads a `FailedInsert` context from a JSON file and runs one recovery,
//! printing the final backend response. Useful for poking at a backend
//! without the fronting proxy:
//!
//! ```text
//! AUTOTABLE_BACKEND_URL=http://127.0.0.1:9308 autotable-replay failed-insert.json
//! ```

use anyhow::{bail, Context};
use autotable_common::logging::{init_logging, LogConfig};
use autotable_core::client::HttpTransport;
use autotable_core::handler::{FailedInsert, RecoveryHandler};
use autotable_core::settings::Settings;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_config = LogConfig::from_env()?;
    init_logging(&log_config)?;

    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => bail!("usage: autotable-replay <failed-insert.json>"),
    };

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read context file '{path}'"))?;
    let request: FailedInsert =
        serde_json::from_str(&raw).context("Context file is not a valid FailedInsert")?;

    let settings = Settings::load()?;
    info!(backend = %settings.backend_url, "replaying failed insert");

    let transport = Arc::new(HttpTransport::from_settings(&settings)?);
    let handler = RecoveryHandler::new(settings, transport);

    let task = handler.handle(request)?;
    let response = task.wait().await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
