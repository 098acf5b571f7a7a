//! Operator bot: dispatcher wiring and menu registration.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

use crate::error::Result;
use crate::handlers::{handle_command, handle_text, is_owner, Command};
use crate::state::BotState;

/// The Telegram bot controlling a Newscaster instance.
pub struct NewscasterBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Shared state across handlers.
    state: Arc<BotState>,
}

impl NewscasterBot {
    pub fn new(bot: Bot, state: Arc<BotState>) -> Self {
        Self { bot, state }
    }

    /// Register the side-menu commands.
    pub async fn register_commands(&self) -> Result<()> {
        self.bot.set_my_commands(Command::bot_commands()).await?;
        debug!("Bot commands registered");
        Ok(())
    }

    /// Poll for updates until Ctrl+C.
    ///
    /// Only messages from the configured owner reach the handlers; every
    /// other update is dropped without a reply.
    pub async fn run(&self) {
        let owner_id = self.state.owner_id();
        let state_for_commands = Arc::clone(&self.state);
        let state_for_messages = Arc::clone(&self.state);

        let handler = Update::filter_message()
            .filter(move |msg: Message| is_owner(&msg, owner_id))
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let state = Arc::clone(&state_for_commands);
                        async move { handle_command(bot, msg, cmd, state).await }
                    }),
            )
            .branch(dptree::endpoint(move |bot: Bot, msg: Message| {
                let state = Arc::clone(&state_for_messages);
                async move { handle_text(bot, msg, state).await }
            }));

        info!(owner_id, "Operator bot is running");

        Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|upd| async move {
                debug!(update_id = ?upd.id, "Ignoring update");
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}
