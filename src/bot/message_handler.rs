//! Message Handler module for processing commands, profile edits and photos

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::db;
use crate::dice::{self, DiceError};
use crate::localization::{t, t_args};
use crate::menu::{self, EditTarget, Section};
use crate::profile_model::{Profile, ProfilePatch};
use crate::profile_parser::parse_profile_text;

use super::inbound::{IncomingMessage, Sender};
use super::router::{Action, ProfileTarget};
use super::ui_builder::{format_roll, format_roll_out_of_range};
use super::BotContext;

/// Legacy administrative save: `{"save_profile": {"user_id": 1, ...}}`
#[derive(Debug, Deserialize)]
struct SaveDirective {
    save_profile: Option<AdminProfile>,
}

#[derive(Debug, Deserialize)]
struct AdminProfile {
    user_id: Option<i64>,
    #[serde(flatten)]
    patch: ProfilePatch,
}

/// Run the handler for a message-borne action
pub async fn message_handler(ctx: &BotContext, message: &IncomingMessage, action: Action) -> Result<()> {
    let chat_id = message.chat_id;
    let sender = message.sender.as_ref();

    match action {
        Action::Start => reply(ctx, chat_id, &t("start-greeting")).await,
        Action::Roll { expression } => handle_roll(ctx, chat_id, expression.as_deref()).await,
        Action::ViewProfile { target } => handle_view(ctx, chat_id, sender, target).await,
        Action::EditProfile { text, photo_reference } => match sender {
            Some(sender) => handle_edit(ctx, chat_id, sender, &text, photo_reference).await,
            None => Ok(()),
        },
        Action::UploadPhoto { photo_reference } => match sender {
            Some(sender) => handle_photo(ctx, chat_id, sender, &photo_reference).await,
            None => Ok(()),
        },
        Action::AdminSave { json } => match sender {
            Some(sender) => handle_admin_save(ctx, chat_id, sender, &json).await,
            None => Ok(()),
        },
        Action::MenuButton | Action::Ignore => Ok(()),
    }
}

async fn reply(ctx: &BotContext, chat_id: i64, text: &str) -> Result<()> {
    ctx.transport
        .send_message(chat_id, text, None)
        .await
        .context("Failed to send reply")
}

async fn handle_roll(ctx: &BotContext, chat_id: i64, expression: Option<&str>) -> Result<()> {
    let Some(expression) = expression else {
        return reply(ctx, chat_id, &t("roll-usage")).await;
    };

    let text = match dice::roll(expression) {
        Ok(roll) => {
            debug!(chat_id, expression = %roll.expression, total = roll.total(), "Rolled dice");
            format_roll(&roll)
        }
        Err(DiceError::InvalidFormat(_)) => t("roll-invalid-format"),
        Err(DiceError::OutOfRange(_)) => format_roll_out_of_range(),
    };
    reply(ctx, chat_id, &text).await
}

async fn resolve_target(ctx: &BotContext, sender: Option<&Sender>, target: &ProfileTarget) -> Result<Option<i64>> {
    match target {
        ProfileTarget::Own => Ok(sender.map(|s| s.user_id)),
        ProfileTarget::UserId(user_id) => Ok(Some(*user_id)),
        ProfileTarget::Handle(handle) => db::find_user_by_handle(&ctx.pool, handle).await,
    }
}

async fn handle_view(ctx: &BotContext, chat_id: i64, sender: Option<&Sender>, target: ProfileTarget) -> Result<()> {
    let profile = match resolve_target(ctx, sender, &target).await? {
        Some(user_id) => db::get_profile(&ctx.pool, user_id).await?,
        None => None,
    };

    match profile {
        Some(profile) => show_profile(ctx, chat_id, &profile).await,
        None if target == ProfileTarget::Own => reply(ctx, chat_id, &t("profile-missing-own")).await,
        None => reply(ctx, chat_id, &t("profile-not-found")).await,
    }
}

/// Send the summary page of a profile with its section buttons
pub async fn show_profile(ctx: &BotContext, chat_id: i64, profile: &Profile) -> Result<()> {
    let view = menu::render(Section::Summary, profile);
    let target = EditTarget::for_message(profile.has_photo());
    let text = menu::truncate_for(&view.text, target);

    match profile.photo_reference.as_deref() {
        Some(photo) => ctx
            .transport
            .send_photo(chat_id, photo, &text, Some(&view.keyboard))
            .await
            .context("Failed to send profile photo")?,
        None => ctx
            .transport
            .send_message(chat_id, &text, Some(&view.keyboard))
            .await
            .context("Failed to send profile")?,
    }
    Ok(())
}

async fn handle_edit(
    ctx: &BotContext,
    chat_id: i64,
    sender: &Sender,
    text: &str,
    photo_reference: Option<String>,
) -> Result<()> {
    let mut patch = parse_profile_text(text);
    if let Some(photo) = photo_reference {
        patch.photo_reference = Some(photo);
        patch.last_photo_timestamp = Some(chrono::Utc::now().timestamp());
    }

    if patch.is_empty() {
        debug!(user_id = sender.user_id, "Edit command carried no recognised fields");
        return reply(ctx, chat_id, &t("profile-edit-hint")).await;
    }

    let patch = patch.with_handle(sender.handle.as_deref());
    db::save_profile(&ctx.pool, sender.user_id, &patch).await?;
    info!(user_id = sender.user_id, "Profile updated from text");

    reply(ctx, chat_id, &t("profile-saved")).await?;
    match db::get_profile(&ctx.pool, sender.user_id).await? {
        Some(profile) => show_profile(ctx, chat_id, &profile).await,
        None => Ok(()),
    }
}

async fn handle_photo(ctx: &BotContext, chat_id: i64, sender: &Sender, photo_reference: &str) -> Result<()> {
    let timestamp = chrono::Utc::now().timestamp();
    db::save_photo(&ctx.pool, sender.user_id, photo_reference, timestamp).await?;
    info!(user_id = sender.user_id, "Profile photo updated");
    reply(ctx, chat_id, &t("profile-photo-saved")).await
}

async fn handle_admin_save(ctx: &BotContext, chat_id: i64, sender: &Sender, json: &str) -> Result<()> {
    let directive: SaveDirective = match serde_json::from_str(json) {
        Ok(directive) => directive,
        Err(e) => {
            debug!(user_id = sender.user_id, error = %e, "Rejected JSON save payload");
            let error = e.to_string();
            return reply(ctx, chat_id, &t_args("admin-json-error", &[("error", &error)])).await;
        }
    };

    let Some(AdminProfile {
        user_id: Some(user_id),
        patch,
    }) = directive.save_profile
    else {
        return reply(ctx, chat_id, &t("admin-json-invalid")).await;
    };

    if user_id != sender.user_id && !ctx.is_admin(sender.user_id) {
        warn!(sender = sender.user_id, target = user_id, "Refused JSON save for another user");
        return reply(ctx, chat_id, &t("profile-forbidden")).await;
    }

    db::save_profile(&ctx.pool, user_id, &patch).await?;
    info!(sender = sender.user_id, user_id, "Profile saved from JSON");
    reply(ctx, chat_id, &t("profile-saved")).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_directive_accepts_legacy_keys() {
        let directive: SaveDirective = serde_json::from_str(
            r#"{"save_profile": {"user_id": 7, "username": "lyra", "exp": 40, "bio": "Лесная"}}"#,
        )
        .unwrap();
        let profile = directive.save_profile.unwrap();
        assert_eq!(profile.user_id, Some(7));
        assert_eq!(profile.patch.handle.as_deref(), Some("lyra"));
        assert_eq!(profile.patch.experience, Some(40));
        assert_eq!(profile.patch.biography.as_deref(), Some("Лесная"));
    }

    #[test]
    fn test_save_directive_without_user_id() {
        let directive: SaveDirective = serde_json::from_str(r#"{"save_profile": {"name": "Лира"}}"#).unwrap();
        assert_eq!(directive.save_profile.unwrap().user_id, None);
    }
}
