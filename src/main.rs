// Entry point of the resolution wall.
//
// **Architecture Overview:**
// - `core/` = Business logic (storage contract, moderation, resolutions)
// - `infra/` = Implementations of core traits (SQLite, JSON file, in-memory)
// - `console/` = Front end standing in for the gallery UI
//
// This file's job is to:
// 1. Load configuration
// 2. Open the storage medium once
// 3. Run the schema gate and load the resolution data
// 4. Hand the wired service to the console

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "console/console_layer.rs"]
mod console;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::AppConfig;
use crate::console::Console;
use crate::core::moderation::WordFilter;
use crate::core::resolutions::ResolutionService;
use crate::core::storage::MigrationOutcome;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with the console output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // The medium is opened exactly once here and shared by every stored value.
    let medium = infra::storage::open_medium(&config).await?;
    let filter = WordFilter::with_defaults()?;

    // Opening the service runs the schema gate before any resolution is read.
    let service = Arc::new(ResolutionService::open(medium, filter).await);
    match service.migration() {
        MigrationOutcome::Reset { from, to } => {
            tracing::info!(from, to, "Stored resolutions were reset for the new schema");
        }
        MigrationOutcome::ResetIncomplete { from, to } => {
            tracing::warn!(from, to, "Stale resolutions could not be cleared; starting empty");
        }
        MigrationOutcome::UpToDate { .. } => {}
    }

    console::run_stdio(Console::new(service, config.owner)).await
}
