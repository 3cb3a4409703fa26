mod api;
mod commands;
mod config;
mod database;
mod models;
mod platform;
mod services;
mod utils;

use commands::CommandHandlers;
use config::Config;
use database::JsonStore;
use dotenv::dotenv;
use platform::discord::{self, DiscordPlatform};
use std::process;
use std::sync::Arc;
use utils::AppError;

fn abort(context: &str, error: AppError) -> ! {
    log::error!("❌ {}: {}", context, error);
    process::exit(1);
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().unwrap_or_else(|e| abort("Invalid configuration", e));

    log::info!("🚀 Starting ID registry bot...");
    // A corrupt data file stops the bot before it goes online
    let store = JsonStore::new(config.data_file.clone());
    log::info!("📁 Data file: {}", store.path().display());
    match store.load() {
        Ok(registry) => log::info!("✅ Loaded {} registered IDs", registry.len()),
        Err(e) => abort("Failed to load data file", e),
    }

    if let Err(e) = api::liveness::spawn_liveness_server(&config.host, config.port) {
        abort("Failed to start liveness endpoint", e);
    }

    let platform = Arc::new(DiscordPlatform::new(
        &config.token,
        config.guild_id,
        config.command_sync,
    ));
    let handlers = Arc::new(CommandHandlers::new(store, platform, config.guild_id.get()));

    if let Err(e) = discord::run(&config, handlers).await {
        abort("Discord client stopped", e);
    }

    log::info!("👋 Discord session ended");
}
