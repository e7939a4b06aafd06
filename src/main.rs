use anyhow::Result;
use std::sync::Arc;
use teloxide::dispatching::dialogue::{self, InMemStorage};
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use raed::bot;
use raed::config::Config;
use raed::dialogue::Session;
use raed::engine::Engine;
use raed::generation::GeminiClient;
use raed::localization::LocalizationManager;
use raed::prompts::PromptConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Raed Telegram bot");

    // Missing secrets are fatal here, before the dispatcher runs.
    let config = Config::from_env()?;

    let catalog = Arc::new(LocalizationManager::new()?);
    let prompts = PromptConfig::default();
    let generator = Arc::new(GeminiClient::new(&config, &prompts));
    let engine = Arc::new(Engine::new(generator, prompts, catalog));

    let bot = Bot::new(&config.bot_token);

    info!(model = %config.gemini_model, "Bot initialized, starting dispatcher");

    let handler = dialogue::enter::<Update, InMemStorage<Session>, Session, _>()
        .branch(Update::filter_message().endpoint(bot::message_handler))
        .branch(Update::filter_callback_query().endpoint(bot::callback_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<Session>::new(), engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
