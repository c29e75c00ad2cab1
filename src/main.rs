use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use charsheet::admission_gate::GatedTransport;
use charsheet::bot::telegram::{run_polling, TeloxideTransport};
use charsheet::bot::BotContext;
use charsheet::config::{BotConfig, RunMode};
use charsheet::{db, server};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();
    info!("Starting character sheet bot");

    let config = BotConfig::from_env().context("Invalid configuration")?;

    info!(database_url = %config.database_url, "Initializing database");
    let pool = db::connect(&config.database_url).await?;
    db::init_database_schema(&pool).await?;

    let bot = Bot::new(config.bot_token.clone());
    let transport = GatedTransport::new(TeloxideTransport::new(bot.clone()), config.transport.clone());
    let ctx = BotContext::new(pool, Arc::new(transport), config.admin_user_ids.clone());

    match config.mode {
        RunMode::Webhook => {
            let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.port)
                .parse()
                .with_context(|| format!("Invalid bind address {}:{}", config.bind_addr, config.port))?;
            server::serve(ctx, addr).await?;
        }
        RunMode::Polling => run_polling(bot, ctx).await,
    }

    info!("Bot stopped");
    Ok(())
}
