//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `inbound`: platform-independent view of an incoming update
//! - `router`: classifies an update into exactly one action
//! - `message_handler`: commands, profile edits, photo uploads
//! - `callback_handler`: inline menu button presses
//! - `ui_builder`: message formatting and keyboard conversion
//! - `telegram`: teloxide transport and update conversion

pub mod callback_handler;
pub mod inbound;
pub mod message_handler;
pub mod router;
pub mod telegram;
pub mod ui_builder;

use std::sync::Arc;

use anyhow::Result;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, error, warn};

use crate::localization::t;
use crate::transport::Transport;

pub use callback_handler::callback_handler;
pub use inbound::{Inbound, IncomingCallback, IncomingMessage, Sender};
pub use message_handler::message_handler;
pub use router::{route, Action, ProfileTarget};

/// Everything a handler needs, shared by all in-flight updates
#[derive(Clone)]
pub struct BotContext {
    pub pool: SqlitePool,
    pub transport: Arc<dyn Transport>,
    /// Users allowed to save any profile through the JSON path
    pub admin_user_ids: Arc<[i64]>,
}

impl BotContext {
    pub fn new(pool: SqlitePool, transport: Arc<dyn Transport>, admin_user_ids: Vec<i64>) -> Self {
        Self {
            pool,
            transport,
            admin_user_ids: admin_user_ids.into(),
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_user_ids.contains(&user_id)
    }
}

/// Route one update and run its handler
pub async fn handle_inbound(ctx: &BotContext, inbound: &Inbound) -> Result<()> {
    let action = route(inbound);
    debug!(action = ?action, "Routed inbound update");

    match (inbound, action) {
        (_, Action::Ignore) => Ok(()),
        (Inbound::Callback(callback), Action::MenuButton) => callback_handler(ctx, callback).await,
        (Inbound::Message(message), action) => message_handler(ctx, message, action).await,
        (inbound, action) => {
            warn!(inbound = ?inbound, action = ?action, "Action does not fit the update kind");
            Ok(())
        }
    }
}

/// Handle one update, containing any failure to this update.
///
/// Failures are logged and, when there is a chat to talk to, the user gets a
/// generic failure notice.
pub async fn process_inbound(ctx: &BotContext, inbound: Inbound) {
    if let Err(e) = handle_inbound(ctx, &inbound).await {
        error!(error = %e, "Failed to handle update");

        if let Inbound::Message(message) = &inbound {
            if let Err(notify_err) = ctx
                .transport
                .send_message(message.chat_id, &t("error-generic"), None)
                .await
            {
                warn!(chat_id = message.chat_id, error = %notify_err, "Failed to send failure notice");
            }
        }
    }
}
