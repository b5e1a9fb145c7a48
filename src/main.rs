#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use ops_console::{
    api::{ApiClient, ReqwestTransport, Transport, resolver},
    bot::{self, BotData},
    config::{self, database},
    errors::{Error, Result},
};
use std::{env, sync::Arc, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load settings
    let settings = config::load_default_settings()
        .inspect_err(|e| error!("Critical error loading settings: {}", e))?;

    // 4. Open the local store for sessions and stock drafts
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to open local store: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Local store ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Resolve the backend once; every command uses this base URL
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(Duration::from_secs(
        settings.api.timeout_secs,
    ))?);
    let base_url = resolver::resolve_base_url(&settings, transport.as_ref())
        .await
        .inspect_err(|e| error!("No usable backend: {}", e))?;
    info!("Using backend at {}", base_url);
    let api = ApiClient::new(transport, base_url);

    // 6. Run the bot
    // DISCORD_BOT_TOKEN is read directly before use, never stored in settings
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(db, api, settings)).await
}
