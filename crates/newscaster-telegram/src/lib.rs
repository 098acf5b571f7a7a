//! Telegram side of Newscaster.
//!
//! This crate delivers posts to the channel and runs the operator bot that
//! starts, stops and inspects the publishing worker.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_TOKEN`: Bot token from @BotFather
//! - `CHANNEL_ID`: Target channel, `@username` or numeric id
//! - `OWNER_ID`: Telegram user id allowed to control the bot
//!
//! Optional:
//! - `RSS_URLS`: Comma-separated feed URLs
//! - `CHECK_INTERVAL`: Seconds between polling cycles (default: 300)
//! - `YANDEX_API_KEY`, `YANDEX_FOLDER_ID`: Enable YandexGPT text enhancement
//! - `DISABLE_YAGPT`: Switch enhancement off even when credentials are set
//! - `FONTS_DIR`, `TEMPLATES_DIR`, `OUTPUT_DIR`, `DEFAULT_FONT`: Image rendering
//!
//! # Commands
//!
//! - `/start`, `/help` - Welcome message and command list
//! - `/status` - Current status
//! - `/stats` - Status and statistics
//! - `/start_bot` - Start publishing
//! - `/pause`, `/stop` - Stop publishing
//! - `/restart` - Restart publishing
//! - `/sources` - List feeds
//! - `/yagpt_status` - YandexGPT integration status

pub mod bot;
pub mod error;
pub mod handlers;
pub mod keyboard;
pub mod publisher;
pub mod reports;
pub mod startup;
pub mod state;

pub use bot::NewscasterBot;
pub use error::{Result, TelegramError};
pub use handlers::Command;
pub use publisher::TelegramPublisher;
pub use startup::{initial_check, startup_error_message};
pub use state::BotState;
