//! Callback Handler module for processing inline menu button presses

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::db;
use crate::localization::t;
use crate::menu::{self, ButtonPress, EditTarget};

use super::inbound::IncomingCallback;
use super::BotContext;

/// Handle a menu button press.
///
/// The callback is always answered, whatever happens to the edit, so the
/// client stops showing its loading indicator.
pub async fn callback_handler(ctx: &BotContext, callback: &IncomingCallback) -> Result<()> {
    debug!(
        user_id = callback.sender.user_id,
        payload = ?callback.payload,
        "Received callback query from user"
    );

    let notice = match apply_press(ctx, callback).await {
        Ok(notice) => notice,
        Err(e) => {
            warn!(user_id = callback.sender.user_id, error = %e, "Failed to apply menu press");
            Some(t("error-generic"))
        }
    };

    ctx.transport
        .answer_callback(&callback.callback_id, notice.as_deref())
        .await
        .context("Failed to answer callback")
}

/// Rewrite the pressed message; returns the notice to show, if any
async fn apply_press(ctx: &BotContext, callback: &IncomingCallback) -> Result<Option<String>> {
    let press = match ButtonPress::decode(callback.payload.as_deref().unwrap_or("")) {
        Ok(press) => press,
        Err(e) => {
            debug!(error = %e, "Ignoring unknown menu payload");
            return Ok(Some(t("menu-unknown-action")));
        }
    };

    let (Some(chat_id), Some(message_id)) = (callback.chat_id, callback.message_id) else {
        debug!(user_id = press.user_id, "Pressed message is no longer available");
        return Ok(Some(t("profile-not-found")));
    };

    let target = EditTarget::for_message(callback.message_has_photo);
    let view = db::get_profile(&ctx.pool, press.user_id)
        .await?
        .map(|profile| menu::navigate(press, &profile));

    let (text, keyboard) = match &view {
        Some(view) => (menu::truncate_for(&view.text, target), Some(&view.keyboard)),
        None => (menu::truncate_for(&t("profile-not-found"), target), None),
    };

    let edited = match target {
        EditTarget::Caption => {
            ctx.transport
                .edit_message_caption(chat_id, message_id, &text, keyboard)
                .await
        }
        EditTarget::Text => {
            ctx.transport
                .edit_message_text(chat_id, message_id, &text, keyboard)
                .await
        }
    };

    match edited {
        Ok(()) => Ok(None),
        Err(e) => {
            warn!(chat_id, message_id, error = %e, "Failed to edit menu message");
            Ok(Some(t("profile-not-found")))
        }
    }
}
