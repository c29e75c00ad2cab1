//! Update Router
//!
//! Classifies an inbound update into exactly one [`Action`]. Commands are
//! matched on their keyword only: the `@botname` suffix is dropped and the
//! keyword itself is case-sensitive.

use super::inbound::{Inbound, IncomingMessage};

/// Keywords for the greeting
const START_COMMANDS: &[&str] = &["start", "help"];
const ROLL_COMMANDS: &[&str] = &["roll"];
const VIEW_COMMANDS: &[&str] = &["profile", "анкета"];
const EDIT_COMMANDS: &[&str] = &["setprofile", "editprofile", "заполнить"];

/// Marker the legacy JSON save payload must contain
const SAVE_DIRECTIVE: &str = "save_profile";

/// Whose profile a view command asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileTarget {
    Own,
    Handle(String),
    UserId(i64),
}

/// What to do with an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    Roll { expression: Option<String> },
    ViewProfile { target: ProfileTarget },
    /// Full text of the edit command, plus a photo when it came as a caption
    EditProfile { text: String, photo_reference: Option<String> },
    UploadPhoto { photo_reference: String },
    /// Raw JSON of the administrative save directive
    AdminSave { json: String },
    MenuButton,
    Ignore,
}

/// A `/command` token split from its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInvocation<'a> {
    pub keyword: &'a str,
    pub args: &'a str,
}

/// Split `/keyword@bot args` into keyword and arguments
pub fn parse_command(text: &str) -> Option<CommandInvocation<'_>> {
    let text = text.trim_start();
    let rest = text.strip_prefix('/')?;
    let (token, args) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    let keyword = token.split('@').next().unwrap_or("");
    if keyword.is_empty() {
        return None;
    }
    Some(CommandInvocation {
        keyword,
        args: args.trim(),
    })
}

fn is_edit_command(text: &str) -> bool {
    parse_command(text).is_some_and(|cmd| EDIT_COMMANDS.contains(&cmd.keyword))
}

fn view_target(args: &str) -> ProfileTarget {
    match args.split_whitespace().next() {
        None => ProfileTarget::Own,
        Some(arg) if arg.starts_with('@') => ProfileTarget::Handle(arg.trim_start_matches('@').to_string()),
        Some(arg) => match arg.parse::<i64>() {
            Ok(user_id) => ProfileTarget::UserId(user_id),
            Err(_) => ProfileTarget::Handle(arg.to_string()),
        },
    }
}

fn route_text(text: &str) -> Action {
    if let Some(cmd) = parse_command(text) {
        let keyword = cmd.keyword;
        return if START_COMMANDS.contains(&keyword) {
            Action::Start
        } else if ROLL_COMMANDS.contains(&keyword) {
            Action::Roll {
                expression: cmd.args.split_whitespace().next().map(str::to_string),
            }
        } else if VIEW_COMMANDS.contains(&keyword) {
            Action::ViewProfile {
                target: view_target(cmd.args),
            }
        } else if EDIT_COMMANDS.contains(&keyword) {
            Action::EditProfile {
                text: text.to_string(),
                photo_reference: None,
            }
        } else {
            Action::Ignore
        };
    }

    let trimmed = text.trim_start();
    if trimmed.starts_with('{') && trimmed.contains(SAVE_DIRECTIVE) {
        return Action::AdminSave {
            json: trimmed.to_string(),
        };
    }

    Action::Ignore
}

fn route_message(message: &IncomingMessage) -> Action {
    if let Some(photo) = &message.photo_reference {
        return match message.caption.as_deref() {
            Some(caption) if is_edit_command(caption) => Action::EditProfile {
                text: caption.to_string(),
                photo_reference: Some(photo.clone()),
            },
            _ => Action::UploadPhoto {
                photo_reference: photo.clone(),
            },
        };
    }

    match message.text.as_deref() {
        Some(text) => route_text(text),
        None => Action::Ignore,
    }
}

/// Classify one update
pub fn route(inbound: &Inbound) -> Action {
    match inbound {
        Inbound::Message(message) => route_message(message),
        Inbound::Callback(_) => Action::MenuButton,
        Inbound::Other => Action::Ignore,
    }
}
