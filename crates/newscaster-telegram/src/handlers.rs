//! Command and button handlers for the operator bot.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};
use teloxide::utils::command::BotCommands;
use tracing::info;

use crate::keyboard::{main_keyboard, Button};
use crate::reports;
use crate::state::BotState;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Available commands:")]
pub enum Command {
    #[command(description = "Show the welcome message")]
    Start,

    #[command(description = "Show help and commands")]
    Help,

    #[command(description = "Current status")]
    Status,

    #[command(description = "Statistics")]
    Stats,

    #[command(description = "Start publishing")]
    StartBot,

    #[command(description = "Pause publishing")]
    Pause,

    #[command(description = "Stop publishing")]
    Stop,

    #[command(description = "Restart publishing")]
    Restart,

    #[command(description = "List news sources")]
    Sources,

    #[command(description = "YandexGPT status")]
    YagptStatus,
}

/// True when the message was sent by `owner_id`.
pub fn is_owner(msg: &Message, owner_id: u64) -> bool {
    msg.from.as_ref().map(|u| u.id.0) == Some(owner_id)
}

/// Reply in HTML with the keyboard matching the current state.
async fn reply(bot: &Bot, msg: &Message, state: &BotState, text: impl Into<String>) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_parameters(ReplyParameters::new(msg.id))
        .reply_markup(main_keyboard(state.status()))
        .await?;
    Ok(())
}

async fn start_publishing(bot: &Bot, msg: &Message, state: &BotState) -> ResponseResult<()> {
    let text = if state.controller().start().await {
        info!("Publishing started by operator");
        reports::STARTED
    } else {
        reports::ALREADY_RUNNING
    };
    reply(bot, msg, state, text).await
}

async fn stop_publishing(bot: &Bot, msg: &Message, state: &BotState) -> ResponseResult<()> {
    let text = if state.controller().stop().await {
        info!("Publishing stopped by operator");
        reports::STOPPED
    } else {
        reports::ALREADY_STOPPED
    };
    reply(bot, msg, state, text).await
}

async fn restart_publishing(bot: &Bot, msg: &Message, state: &BotState) -> ResponseResult<()> {
    let text = if state.restart().await {
        info!("Publishing restarted by operator");
        reports::RESTARTED
    } else {
        reports::RESTART_FAILED
    };
    reply(bot, msg, state, text).await
}

/// Dispatch a parsed command.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    info!(chat_id = %msg.chat.id, command = ?cmd, "Command received");

    match cmd {
        Command::Start | Command::Help => reply(&bot, &msg, &state, reports::welcome()).await,
        Command::Status => reply(&bot, &msg, &state, reports::status_report(&state.report_context())).await,
        Command::Stats => reply(&bot, &msg, &state, reports::combined_report(&state.report_context())).await,
        Command::StartBot => start_publishing(&bot, &msg, &state).await,
        Command::Pause | Command::Stop => stop_publishing(&bot, &msg, &state).await,
        Command::Restart => restart_publishing(&bot, &msg, &state).await,
        Command::Sources => reply(&bot, &msg, &state, reports::sources_report(&state.report_context())).await,
        Command::YagptStatus => reply(&bot, &msg, &state, reports::yagpt_report(&state.report_context())).await,
    }
}

/// Handle keyboard presses and any other text.
pub async fn handle_text(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    match Button::parse(text) {
        Some(Button::Start) => start_publishing(&bot, &msg, &state).await,
        Some(Button::Pause) | Some(Button::Stop) => stop_publishing(&bot, &msg, &state).await,
        Some(Button::Restart) => restart_publishing(&bot, &msg, &state).await,
        Some(Button::Stats) => reply(&bot, &msg, &state, reports::combined_report(&state.report_context())).await,
        Some(Button::Sources) => reply(&bot, &msg, &state, reports::sources_report(&state.report_context())).await,
        Some(Button::Help) => reply(&bot, &msg, &state, reports::welcome()).await,
        Some(Button::Info) => reply(&bot, &msg, &state, reports::INFO_MESSAGE).await,
        None => {
            info!(text, "Unknown operator input");
            reply(&bot, &msg, &state, reports::UNKNOWN_COMMAND).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        assert_eq!(Command::parse("/start_bot", "newsbot").unwrap(), Command::StartBot);
        assert_eq!(Command::parse("/yagpt_status", "newsbot").unwrap(), Command::YagptStatus);
        assert_eq!(Command::parse("/pause@newsbot", "newsbot").unwrap(), Command::Pause);
        assert!(Command::parse("/launch", "newsbot").is_err());
    }

    #[test]
    fn test_menu_lists_every_command() {
        let names: Vec<String> = Command::bot_commands()
            .into_iter()
            .map(|c| c.command.trim_start_matches('/').to_string())
            .collect();
        for expected in [
            "start",
            "help",
            "status",
            "stats",
            "start_bot",
            "pause",
            "stop",
            "restart",
            "sources",
            "yagpt_status",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }
}
