//! Error types for the Telegram bot.

use thiserror::Error;

/// Errors that can occur in the Telegram bot.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Settings could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] newscaster_core::ConfigError),

    /// The bot token was rejected or Telegram is unreachable.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// The bot cannot post to the configured channel.
    #[error("No access to channel {channel}: {reason}")]
    ChannelAccess { channel: String, reason: String },

    /// Any other Bot API failure.
    #[error("Telegram API error: {0}")]
    Api(#[from] teloxide::RequestError),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
