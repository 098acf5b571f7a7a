//! Newscaster binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_TOKEN=xxx CHANNEL_ID=@news OWNER_ID=123 cargo run -p newscaster-telegram
//! ```

use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use clap::Parser;
use newscaster_core::{config, Collaborators, Controller, Pipeline, Settings, WorkerConfig};
use newscaster_feeds::FeedClient;
use newscaster_render::{RenderConfig, TitleRenderer};
use newscaster_telegram::{
    initial_check, startup_error_message, BotState, NewscasterBot, TelegramError,
    TelegramPublisher,
};
use newscaster_yandex::YandexGpt;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Newscaster - RSS to Telegram autoposter
#[derive(Parser, Debug)]
#[command(name = "newscaster")]
#[command(about = "Publish RSS news to a Telegram channel, controlled from Telegram")]
struct Args {
    /// Start publishing immediately instead of waiting for /start_bot
    #[arg(short, long)]
    autostart: bool,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "newscaster=info,teloxide=warn",
        1 => "newscaster=debug,teloxide=info",
        2 => "newscaster=trace,teloxide=debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = config::log_file();
    let file = fs::create_dir_all(config::logs_dir()).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
    });

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    match file {
        Ok(file) => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        Err(e) => {
            registry.init();
            tracing::warn!(path = %log_path.display(), error = %e, "Log file unavailable, logging to stderr only");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load environment variables from config directory first
    let env_path = config::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    init_logging(args.verbose);

    let settings = match Settings::from_env().map_err(TelegramError::from) {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    let bot = Bot::new(&settings.telegram_token);
    let fetcher = Arc::new(FeedClient::new()?);
    let renderer = Arc::new(TitleRenderer::new(RenderConfig::from_settings(&settings)));
    let publisher = Arc::new(TelegramPublisher::new(bot.clone()));

    let mut collaborators =
        Collaborators::new(fetcher.clone(), publisher).with_renderer(renderer.clone());
    match YandexGpt::from_settings(&settings) {
        Some(Ok(client)) => {
            tracing::info!(model = %client.model_uri(), "YandexGPT enhancement enabled");
            collaborators = collaborators.with_enhancer(Arc::new(client));
        }
        Some(Err(e)) => {
            tracing::error!(error = %e, "Failed to create YandexGPT client, enhancement disabled");
        }
        None => tracing::info!("YandexGPT enhancement disabled"),
    }

    let pipeline = Pipeline::new(settings.sources(), settings.channel_id.clone(), collaborators);
    let controller = Arc::new(Controller::new(
        Arc::new(pipeline),
        WorkerConfig::from(settings.as_ref()),
    ));

    if let Err(e) = initial_check(&bot, &settings, fetcher.as_ref(), &renderer).await {
        tracing::error!(error = %e, "Startup check failed");
        let notified = bot
            .send_message(ChatId(settings.owner_id as i64), startup_error_message(&e))
            .parse_mode(ParseMode::Html)
            .await;
        if let Err(send_err) = notified {
            tracing::error!(error = %send_err, "Failed to notify owner about startup error");
        }
    }

    let state = Arc::new(BotState::new(Arc::clone(&controller), Arc::clone(&settings)));
    let newscaster = NewscasterBot::new(bot, state);

    if let Err(e) = newscaster.register_commands().await {
        tracing::warn!(error = %e, "Failed to register bot commands");
    }

    if args.autostart {
        controller.start().await;
    }

    println!("\n[news] Newscaster");
    println!("   Channel: {}", settings.channel_id);
    println!("   Sources: {}", settings.rss_urls.len());
    println!("\n[phone] Open Telegram and send /start_bot to begin publishing");
    println!("   Press Ctrl+C to stop\n");

    newscaster.run().await;

    controller.stop().await;
    tracing::info!("Newscaster stopped");
    Ok(())
}
