//! Self-check run once before the bot starts taking commands.

use teloxide::prelude::*;
use teloxide::types::{ChatAction, InputFile};
use tracing::{error, info, warn};

use newscaster_core::{html_escape, FeedFetcher, ImageRenderer, Settings};
use newscaster_render::TitleRenderer;

use crate::error::{Result, TelegramError};
use crate::publisher::recipient;

/// Headline of the test image sent to the owner.
pub const TEST_IMAGE_TITLE: &str = "Image generation test: bot starting";

const TEST_IMAGE_CAPTION: &str = "✅ Image generation test passed!";

/// Fetch every feed once; true when it returned at least one entry.
pub async fn probe_feeds(fetcher: &dyn FeedFetcher, urls: &[String]) -> Vec<(String, bool)> {
    let mut results = Vec::with_capacity(urls.len());
    for url in urls {
        let ok = match fetcher.fetch(url).await {
            Ok(entries) => !entries.is_empty(),
            Err(e) => {
                warn!(url = %url, error = %e, "Feed probe failed");
                false
            }
        };
        info!(url = %url, status = if ok { "OK" } else { "ERROR" }, "RSS check");
        results.push((url.clone(), ok));
    }
    results
}

/// Message sent to the owner when a fatal check fails.
pub fn startup_error_message(err: &TelegramError) -> String {
    format!("⚠️ Startup error: {}", html_escape(&err.to_string()))
}

/// Verify bot identity and channel access, probe feeds, exercise the
/// renderer and log the effective configuration.
///
/// Only the identity and channel checks are fatal.
pub async fn initial_check(
    bot: &Bot,
    settings: &Settings,
    fetcher: &dyn FeedFetcher,
    renderer: &TitleRenderer,
) -> Result<()> {
    let me = bot
        .get_me()
        .await
        .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
    info!(username = %me.username(), "Bot started");

    bot.send_chat_action(recipient(&settings.channel_id), ChatAction::Typing)
        .await
        .map_err(|e| TelegramError::ChannelAccess {
            channel: settings.channel_id.clone(),
            reason: e.to_string(),
        })?;
    info!(channel = %settings.channel_id, "Channel access OK");

    probe_feeds(fetcher, &settings.rss_urls).await;

    if settings.enhancement_active() {
        info!("YandexGPT integration: ACTIVE");
    } else {
        info!("YandexGPT integration: DISABLED");
    }

    check_renderer(bot, settings, renderer).await;
    log_configuration(settings);
    Ok(())
}

async fn check_renderer(bot: &Bot, settings: &Settings, renderer: &TitleRenderer) {
    let config = renderer.config();
    info!(fonts_dir = %config.fonts_dir.display(), "Image generator setup");

    if renderer.font_available() {
        info!(font = %config.font_file, "Main font found");
    } else {
        warn!(font = %config.font_file, "Main font NOT FOUND, posts will be text only");
    }

    let templates = renderer.templates();
    if templates.is_empty() {
        warn!(templates_dir = %config.templates_dir.display(), "No templates found, using solid background");
    } else {
        info!(count = templates.len(), "Templates found");
    }

    let Some(path) = renderer.render(TEST_IMAGE_TITLE).await else {
        warn!("Test image generation failed");
        return;
    };
    info!(path = %path.display(), "Test image generated");

    let sent = bot
        .send_photo(ChatId(settings.owner_id as i64), InputFile::file(&path))
        .caption(TEST_IMAGE_CAPTION)
        .await;
    if let Err(e) = sent {
        warn!(error = %e, "Failed to send test image");
    }

    if let Err(e) = tokio::fs::remove_file(&path).await {
        error!(path = %path.display(), error = %e, "Failed to remove test image");
    }
}

fn log_configuration(settings: &Settings) {
    info!(
        token = %settings.masked_token(),
        channel_id = %settings.channel_id,
        owner_id = settings.owner_id,
        rss_urls = ?settings.rss_urls,
        check_interval_secs = settings.check_interval.as_secs(),
        yandex_api_key = if settings.yandex_api_key.is_some() { "set" } else { "not set" },
        yandex_folder_id = settings.yandex_folder_id.as_deref().unwrap_or(""),
        disable_yagpt = settings.disable_yagpt,
        "Configuration"
    );
}
