//! Configuration for Newscaster.
//!
//! Settings come from environment variables (optionally loaded from an
//! `.env.local` file by the binary). Worker timings are a separate builder
//! so tests can shrink them.
//!
//! # Storage Structure
//!
//! ```text
//! ~/.newscaster/
//! ├── config/       # .env.local with secrets
//! └── logs/         # newscaster.log
//! ```
//!
//! # Environment Variables
//!
//! Required: `TELEGRAM_TOKEN`, `CHANNEL_ID`, `OWNER_ID`.
//!
//! Optional: `RSS_URLS`, `CHECK_INTERVAL`, `YANDEX_API_KEY`,
//! `YANDEX_FOLDER_ID`, `DISABLE_YAGPT`, `FONTS_DIR`, `TEMPLATES_DIR`,
//! `OUTPUT_DIR`, `DEFAULT_FONT`, `NEWSCASTER_STATE_DIR`.

use std::path::PathBuf;
use std::time::Duration;

use tracing::error;

use crate::error::ConfigError;
use crate::models::FeedSource;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "NEWSCASTER_STATE_DIR";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".newscaster";

const LOGS_SUBDIR: &str = "logs";
const CONFIG_SUBDIR: &str = "config";

/// Feed polled when `RSS_URLS` is not set.
pub const DEFAULT_RSS_URL: &str = "https://www.interfax.ru/rss.asp";

/// Default seconds between cycles.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;

/// Get the Newscaster state directory.
///
/// 1. `NEWSCASTER_STATE_DIR` if set
/// 2. `~/.newscaster` if home directory is available
/// 3. `.newscaster` in current directory as fallback
pub fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Get the logs directory.
pub fn logs_dir() -> PathBuf {
    state_dir().join(LOGS_SUBDIR)
}

/// Get the log file path.
pub fn log_file() -> PathBuf {
    logs_dir().join("newscaster.log")
}

/// Get the `.env.local` file path holding secrets.
pub fn env_file() -> PathBuf {
    state_dir().join(CONFIG_SUBDIR).join(".env.local")
}

/// Application settings read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Telegram bot token.
    pub telegram_token: String,
    /// Destination channel (`@name` or numeric id).
    pub channel_id: String,
    /// The only Telegram user allowed to control the bot.
    pub owner_id: u64,
    /// Feed URLs in polling order.
    pub rss_urls: Vec<String>,
    /// Delay between cycles.
    pub check_interval: Duration,
    /// YandexGPT API key.
    pub yandex_api_key: Option<String>,
    /// YandexGPT folder (catalog) id.
    pub yandex_folder_id: Option<String>,
    /// Explicit kill switch for text enhancement.
    pub disable_yagpt: bool,
    /// Directory holding TrueType fonts.
    pub fonts_dir: PathBuf,
    /// Directory holding background templates.
    pub templates_dir: PathBuf,
    /// Directory receiving generated images.
    pub output_dir: PathBuf,
    /// Font file name inside `fonts_dir`.
    pub default_font: String,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let telegram_token = get("TELEGRAM_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_TOKEN"))?;
        let channel_id = get("CHANNEL_ID").ok_or(ConfigError::Missing("CHANNEL_ID"))?;
        let owner_raw = get("OWNER_ID").ok_or(ConfigError::Missing("OWNER_ID"))?;
        let owner_id = owner_raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid {
                name: "OWNER_ID",
                value: owner_raw.clone(),
            })?;

        let rss_urls = get("RSS_URLS")
            .map(|raw| parse_url_list(&raw))
            .filter(|urls| !urls.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_RSS_URL.to_string()]);

        let check_interval_secs = match get("CHECK_INTERVAL") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    error!(value = %raw, "CHECK_INTERVAL is not a positive integer, using default");
                    DEFAULT_CHECK_INTERVAL_SECS
                }
            },
            None => DEFAULT_CHECK_INTERVAL_SECS,
        };

        Ok(Self {
            telegram_token,
            channel_id: channel_id.trim().to_string(),
            owner_id,
            rss_urls,
            check_interval: Duration::from_secs(check_interval_secs),
            yandex_api_key: get("YANDEX_API_KEY"),
            yandex_folder_id: get("YANDEX_FOLDER_ID"),
            disable_yagpt: get("DISABLE_YAGPT").map(|v| parse_flag(&v)).unwrap_or(false),
            fonts_dir: get("FONTS_DIR").map(PathBuf::from).unwrap_or_else(|| "fonts".into()),
            templates_dir: get("TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| "templates".into()),
            output_dir: get("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| "temp_images".into()),
            default_font: get("DEFAULT_FONT").unwrap_or_else(|| "Montserrat-Bold.ttf".to_string()),
        })
    }

    /// Feed sources in polling order.
    pub fn sources(&self) -> Vec<FeedSource> {
        self.rss_urls.iter().map(|u| FeedSource::new(u.as_str())).collect()
    }

    /// True when text enhancement is enabled and fully configured.
    pub fn enhancement_active(&self) -> bool {
        !self.disable_yagpt && self.yandex_api_key.is_some() && self.yandex_folder_id.is_some()
    }

    /// Font file path.
    pub fn font_path(&self) -> PathBuf {
        self.fonts_dir.join(&self.default_font)
    }

    /// Token with the middle masked, for logging.
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.telegram_token.chars().collect();
        if chars.len() <= 10 {
            return "*****".to_string();
        }
        let head: String = chars[..5].iter().collect();
        let tail: String = chars[chars.len() - 5..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

/// Parse `RSS_URLS`: comma separated, optionally wrapped in `[...]`, items
/// optionally quoted.
pub fn parse_url_list(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a boolean flag the permissive way (`true`, `1`, `yes`, `y`).
pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "y")
}

/// Timing and batching knobs of the worker and controller.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Wait between cycles (interruptible).
    pub check_interval: Duration,
    /// Pause after each successful post (not interruptible).
    pub post_delay: Duration,
    /// Pause after a cycle-level failure (interruptible).
    pub cooldown: Duration,
    /// How long `stop()` waits for the worker to exit.
    pub join_timeout: Duration,
    /// Most recent entries considered per source and cycle.
    pub max_entries_per_source: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            post_delay: Duration::from_secs(3),
            cooldown: Duration::from_secs(30),
            join_timeout: Duration::from_secs(5),
            max_entries_per_source: 10,
        }
    }
}

impl WorkerConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wait between cycles.
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Sets the pause after each post.
    pub fn with_post_delay(mut self, delay: Duration) -> Self {
        self.post_delay = delay;
        self
    }

    /// Sets the cooldown after a cycle-level failure.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Sets the bounded join used by `stop()`.
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Sets how many recent entries are taken from each source.
    pub fn with_max_entries_per_source(mut self, max: usize) -> Self {
        self.max_entries_per_source = max;
        self
    }
}

impl From<&Settings> for WorkerConfig {
    fn from(settings: &Settings) -> Self {
        WorkerConfig::default().with_check_interval(settings.check_interval)
    }
}
