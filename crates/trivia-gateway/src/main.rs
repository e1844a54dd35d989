//! Bot entry point
//!
//! Run with:
//! ```bash
//! cargo run -p trivia-gateway
//! ```
//!
//! Configuration is loaded from environment variables (`BOT_TOKEN` is
//! required).

use std::sync::Arc;

use tracing::{error, info};

use trivia_common::{try_init_tracing, BotConfig};
use trivia_db::{SqliteQuestionStore, SqliteScoreStore, SqliteScriptStore};
use trivia_gateway::rest::RestMessageSender;
use trivia_gateway::sandbox::TracingSandboxFactory;
use trivia_gateway::GatewayDeps;

#[tokio::main]
async fn main() {
    // Initialize tracing
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    // Run the client; only unrecoverable setup or transport exhaustion lands here
    if let Err(e) = run().await {
        error!(error = %e, "Bot terminated");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting gateway trivia bot...");

    // Load configuration
    let config = BotConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        gateway = %config.gateway_url,
        database = %config.database_path,
        prefix = %config.command_prefix,
        "Configuration loaded"
    );

    // Open the database and make sure the schema exists
    if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let pool = trivia_db::connect(&config.database_path).await?;
    trivia_db::ensure_schema(&pool).await?;

    let deps = GatewayDeps {
        sender: Arc::new(RestMessageSender::new(
            config.api_base_url.clone(),
            config.token.clone(),
        )),
        questions: Arc::new(SqliteQuestionStore::new(pool.clone())),
        scores: Arc::new(SqliteScoreStore::new(pool.clone())),
        scripts: Arc::new(SqliteScriptStore::new(pool)),
        sandboxes: Arc::new(TracingSandboxFactory),
    };

    // Run the gateway client
    trivia_gateway::run(config, deps).await?;

    Ok(())
}
