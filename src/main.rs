use env_logger::Builder;
use log::{error, info, warn, LevelFilter};
use pricewatch::api::telegram::TelegramBot;
use pricewatch::app;
use pricewatch::config::{Config, BOT_TOKEN_ENV};
use pricewatch::monitor::notifier::LogSender;
use std::error::Error;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::load()?;

    Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("pricewatch", config.logging.level)
        .parse_default_env() // RUST_LOG wins over the config file
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                ts,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .write_style(env_logger::WriteStyle::Auto)
        .init();

    info!(
        "Starting price watch: {} symbols, {} chats",
        config.targets.len(),
        config.telegram.chat_ids.len()
    );

    let result = match config.telegram.bot_token.clone() {
        Some(token) => {
            let bot = TelegramBot::new(&config.telegram.api_base_url, &token)?;
            if let Err(e) = bot.get_me().await {
                error!("Failed to connect to the Telegram API: {}", e);
            }
            app::run(config, bot).await
        }
        None => {
            warn!("{} not set, alerts will only be logged", BOT_TOKEN_ENV);
            app::run(config, LogSender).await
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        return Err(e.into());
    }

    info!("Shutdown complete");
    Ok(())
}
