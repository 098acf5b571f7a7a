//! State shared by the bot handlers.

use std::sync::Arc;

use chrono::Local;
use newscaster_core::{Controller, ControllerState, Settings};

use crate::reports::{ReportContext, YagptFlags};

/// Pause between stop and start on a restart request.
pub const RESTART_PAUSE: std::time::Duration = std::time::Duration::from_secs(1);

/// Controller and settings, shared across all handlers.
pub struct BotState {
    controller: Arc<Controller>,
    settings: Arc<Settings>,
}

impl BotState {
    pub fn new(controller: Arc<Controller>, settings: Arc<Settings>) -> Self {
        Self {
            controller,
            settings,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn owner_id(&self) -> u64 {
        self.settings.owner_id
    }

    pub fn status(&self) -> ControllerState {
        self.controller.status()
    }

    pub fn yagpt_flags(&self) -> YagptFlags {
        YagptFlags {
            enabled: !self.settings.disable_yagpt,
            api_key_set: self.settings.yandex_api_key.is_some(),
            folder_set: self.settings.yandex_folder_id.is_some(),
        }
    }

    /// Snapshot for rendering a report.
    pub fn report_context(&self) -> ReportContext {
        let pipeline = self.controller.pipeline();
        ReportContext {
            stats: pipeline.stats().snapshot(),
            state: self.controller.status(),
            sources: pipeline
                .sources()
                .iter()
                .map(|s| s.url().to_string())
                .collect(),
            channel: pipeline.channel().to_string(),
            yagpt: self.yagpt_flags(),
            now: Local::now(),
        }
    }

    /// Stop, wait [`RESTART_PAUSE`], start.
    pub async fn restart(&self) -> bool {
        self.controller.stop().await;
        tokio::time::sleep(RESTART_PAUSE).await;
        self.controller.start().await
    }
}
