//! Channel publishing through the Bot API.

use std::path::Path;

use async_trait::async_trait;
use newscaster_core::{PublishError, Publisher};
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode, Recipient};

/// Posts photos and messages to a channel.
#[derive(Clone)]
pub struct TelegramPublisher {
    bot: Bot,
}

impl TelegramPublisher {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Numeric ids address a chat directly; anything else is a public
/// channel username, with or without the leading `@`.
pub fn recipient(channel: &str) -> Recipient {
    let channel = channel.trim();
    match channel.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) if channel.starts_with('@') => Recipient::ChannelUsername(channel.to_string()),
        Err(_) => Recipient::ChannelUsername(format!("@{}", channel)),
    }
}

#[async_trait]
impl Publisher for TelegramPublisher {
    async fn publish_photo(
        &self,
        channel: &str,
        image: &Path,
        caption: &str,
    ) -> Result<(), PublishError> {
        if !image.is_file() {
            return Err(PublishError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("image not found: {}", image.display()),
            )));
        }

        self.bot
            .send_photo(recipient(channel), InputFile::file(image))
            .caption(caption)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| PublishError::Api(e.to_string()))?;
        Ok(())
    }

    async fn publish_text(&self, channel: &str, text: &str) -> Result<(), PublishError> {
        self.bot
            .send_message(recipient(channel), text)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(|e| PublishError::Api(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_numeric_id() {
        assert_eq!(recipient("-1001234567890"), Recipient::Id(ChatId(-1001234567890)));
    }

    #[test]
    fn test_recipient_username() {
        assert_eq!(
            recipient("@news_channel"),
            Recipient::ChannelUsername("@news_channel".to_string())
        );
        assert_eq!(
            recipient(" news_channel "),
            Recipient::ChannelUsername("@news_channel".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_image_is_io_error() {
        let publisher = TelegramPublisher::new(Bot::new("123456:TEST"));
        let result = publisher
            .publish_photo("@news_channel", Path::new("/nonexistent/post.jpg"), "caption")
            .await;
        assert!(matches!(result, Err(PublishError::Io(_))));
    }
}
