use dotenv::dotenv;
use std::sync::Arc;

mod address;
mod amount;
mod channels;
mod config;
mod conversation;
mod db;
mod discovery;
mod error;
mod interaction;
mod keys;
mod models;
mod network;

use config::Config;
use conversation::ConversationRouter;
use db::Database;
use discovery::{ContractDirectory, ContractDiscovery};
use error::BotResult;
use interaction::InteractionLinkBuilder;
use network::NetworkClient;

async fn run(config: Config) -> BotResult<()> {
    log::info!("Initializing database at: {}", config.database_url);
    let db = Arc::new(Database::new(&config.database_url)?);

    log::info!("Fetching network config from {}", config.network.meta_observer);
    let network = Arc::new(NetworkClient::connect(config.network.clone()).await?);
    log::info!(
        "Connected to chain {} (denomination {})",
        network.network_config().chain_id,
        network.denomination()
    );

    let directory = Arc::new(ContractDirectory::new());

    let discovery = Arc::new(ContractDiscovery::new(
        db.clone(),
        network.clone(),
        directory.clone(),
        config.discovery_interval,
    ));
    let (discovery_shutdown_tx, discovery_shutdown_rx) = tokio::sync::oneshot::channel();
    let discovery_handle = tokio::spawn(async move {
        discovery.start(discovery_shutdown_rx).await;
    });

    let router = Arc::new(ConversationRouter::new(
        db,
        network,
        directory,
        InteractionLinkBuilder::new(config.wallet_hook.clone()),
        config.bot_owner,
        config.min_delegation.clone(),
    ));

    // The listener only returns on ctrl-c, dispatcher exit or a bad token
    let (_telegram_shutdown_tx, telegram_shutdown_rx) = tokio::sync::oneshot::channel();
    let result = channels::start_telegram_listener(&config.bot_token, router, telegram_shutdown_rx).await;

    log::info!("Shutting down contract discovery");
    let _ = discovery_shutdown_tx.send(());
    if let Err(e) = discovery_handle.await {
        log::error!("Discovery task failed: {}", e);
    }

    result
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    log::info!("Bot owner: {}", config.bot_owner);

    if let Err(e) = run(config).await {
        log::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}
