//! Operator-facing texts and reports (Telegram HTML).

use chrono::{DateTime, Duration, Local};
use newscaster_core::{html_escape, ControllerState, RunStats};

/// Short description shown by /start and /help.
pub const BOT_DESCRIPTION: &str = "🤖 <b>News autoposting to a Telegram channel</b>

This bot publishes news from RSS feeds to your channel. Configure the sources and the bot checks them regularly for new items.

<b>Features:</b>
• Automatic news publishing
• Headline images
• Only fresh items are posted
• Simple controls
• Text enhancement with YandexGPT";

/// Command reference shown by /start and /help.
pub const COMMANDS_LIST: &str = "<b>Available commands:</b>

/start - Show this message
/help - Show the command list
/status - Current status
/stats - Statistics
/start_bot - Start publishing
/pause - Pause publishing
/stop - Stop publishing
/restart - Restart publishing
/sources - List news sources
/yagpt_status - YandexGPT integration status

<b>Use the buttons below for quick access 👇</b>";

/// About text for the info button.
pub const INFO_MESSAGE: &str = "ℹ️ <b>About</b>

🤖 <b>News autoposting to a Telegram channel</b>

The bot fetches RSS feeds, skips what it already posted, optionally rewrites the text with YandexGPT, renders the headline onto an image and posts the result to the channel.

<b>Capabilities:</b>
• Multiple RSS sources
• Image generation from templates
• AI-assisted text formatting
• Control from Telegram";

pub const UNKNOWN_COMMAND: &str = "⚠️ Unknown command. Use /help for the list of commands";

pub const STARTED: &str = "✅ Publishing started! 🚀";
pub const ALREADY_RUNNING: &str = "⚠️ Publishing is already running!";
pub const STOPPED: &str = "🛑 Publishing stopped! ⏸️";
pub const ALREADY_STOPPED: &str = "⚠️ Publishing is already stopped!";
pub const RESTARTED: &str = "🔄 Publishing restarted!";
pub const RESTART_FAILED: &str = "⚠️ Restart failed!";

/// YandexGPT configuration as seen by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YagptFlags {
    /// Not switched off with DISABLE_YAGPT.
    pub enabled: bool,
    pub api_key_set: bool,
    pub folder_set: bool,
}

impl YagptFlags {
    pub fn active(&self) -> bool {
        self.enabled && self.api_key_set && self.folder_set
    }
}

/// Everything a report needs, captured at one instant.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub stats: RunStats,
    pub state: ControllerState,
    pub sources: Vec<String>,
    pub channel: String,
    pub yagpt: YagptFlags,
    pub now: DateTime<Local>,
}

/// `{h}h {m}m`
pub fn format_hours_minutes(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// `H:MM:SS`, hours unbounded.
pub fn format_hms(duration: Duration) -> String {
    let seconds = duration.num_seconds().max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

fn pick<'a>(flag: bool, yes: &'a str, no: &'a str) -> &'a str {
    if flag {
        yes
    } else {
        no
    }
}

fn time_or(value: Option<DateTime<Local>>, pattern: &str, fallback: &str) -> String {
    value
        .map(|t| t.format(pattern).to_string())
        .unwrap_or_else(|| fallback.to_string())
}

pub fn status_report(ctx: &ReportContext) -> String {
    let Some(uptime) = ctx.stats.uptime(ctx.now) else {
        return "❓ The bot is currently stopped".to_string();
    };

    format!(
        "🤖 <b>Bot status</b>\n\
        ⏱ Uptime: {}\n\
        📊 Posts sent: {}\n\
        🖼 Images generated: {}\n\
        ❌ Errors: {}\n\
        🔄 Last check: {}\n\
        📬 Last post: {}\n\
        🔗 Sources: {}\n\
        📝 State: {}",
        format_hours_minutes(uptime),
        ctx.stats.posts_sent,
        ctx.stats.images_generated,
        ctx.stats.errors,
        time_or(ctx.stats.last_check, "%H:%M:%S", "never"),
        time_or(ctx.stats.last_post, "%H:%M:%S", "never"),
        ctx.sources.len(),
        pick(ctx.state.is_running(), "running ▶️", "stopped 🛑")
    )
}

pub fn stats_report(ctx: &ReportContext) -> String {
    let Some(uptime) = ctx.stats.uptime(ctx.now) else {
        return "📊 Statistics unavailable: the bot has not been started".to_string();
    };

    format!(
        "📈 <b>Bot statistics</b>\n\
        ⏱ Uptime: {}\n\
        📊 Total posts: {}\n\
        🖼 Images generated: {}\n\
        📮 Average rate: {:.1} posts/hour\n\
        ❌ Total errors: {}\n\
        🔗 Sources: {}\n\
        🆔 Channel: {}\n\
        🕒 Last activity: {}\n\n\
        🧠 <b>YandexGPT</b>\n\
        Status: {}\n\
        API key: {}\n\
        Folder: {}\n\
        Used: {} times\n\
        Errors: {}",
        format_hms(uptime),
        ctx.stats.posts_sent,
        ctx.stats.images_generated,
        ctx.stats.posts_per_hour(ctx.now),
        ctx.stats.errors,
        ctx.sources.len(),
        html_escape(&ctx.channel),
        time_or(ctx.stats.last_check, "%Y-%m-%d %H:%M", "N/A"),
        pick(ctx.yagpt.enabled, "enabled ✅", "disabled ⚠️"),
        pick(ctx.yagpt.api_key_set, "set", "missing"),
        pick(ctx.yagpt.folder_set, "set", "missing"),
        ctx.stats.yagpt_used,
        ctx.stats.yagpt_errors
    )
}

/// Status followed by statistics.
pub fn combined_report(ctx: &ReportContext) -> String {
    format!("{}\n\n{}", status_report(ctx), stats_report(ctx))
}

pub fn sources_report(ctx: &ReportContext) -> String {
    let lines: Vec<String> = ctx
        .sources
        .iter()
        .enumerate()
        .map(|(i, url)| format!("• {}. {}", i + 1, html_escape(url)))
        .collect();

    format!(
        "📚 <b>News sources</b> ({}):\n{}",
        ctx.sources.len(),
        lines.join("\n")
    )
}

pub fn yagpt_report(ctx: &ReportContext) -> String {
    let flags = ctx.yagpt;
    let mut report = format!(
        "🧠 <b>YandexGPT status</b>\n\n\
        • Integration: {}\n\
        • API key: {}\n\
        • Folder: {}\n\
        • Used: {} times\n\
        • Errors: {}",
        pick(flags.enabled, "🟢 Active", "🔴 Disabled"),
        pick(flags.api_key_set, "🟢 Set", "🔴 Missing"),
        pick(flags.folder_set, "🟢 Set", "⚠️ Not set"),
        ctx.stats.yagpt_used,
        ctx.stats.yagpt_errors
    );

    if !flags.active() {
        report.push_str(
            "\n\nℹ️ To activate, set the environment variables:\nYANDEX_API_KEY and YANDEX_FOLDER_ID",
        );
    }
    report
}

/// Reply to /start and /help.
pub fn welcome() -> String {
    format!("{}\n\n{}", BOT_DESCRIPTION, COMMANDS_LIST)
}
