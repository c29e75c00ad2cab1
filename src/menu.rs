//! # Profile Menu
//!
//! Inline-button navigation over a profile's sections. The menu keeps no
//! session: each button carries `<section>:<user_id>`, so any viewer's press is
//! resolved from the payload alone and the message itself is the only state.
//!
//! ```text
//! Summary --bio/inv/stats/exp--> Section --back--> Summary
//! ```

use std::fmt;

use crate::localization::t;
use crate::profile_model::Profile;
use crate::transport::{Keyboard, KeyboardButton};

/// Telegram limit for photo captions, in UTF-16 code units
pub const MAX_CAPTION_LEN: usize = 1024;
/// Telegram limit for message text, in UTF-16 code units
pub const MAX_TEXT_LEN: usize = 4096;

/// A page of the profile menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Name, age and role, with the full section-button row
    Summary,
    Biography,
    Inventory,
    Stats,
    Experience,
}

impl Section {
    /// Sections reachable from the summary, in button order
    pub const BROWSABLE: [Section; 4] = [
        Section::Biography,
        Section::Inventory,
        Section::Stats,
        Section::Experience,
    ];

    /// Payload prefix; pressing "back" lands on the summary
    pub fn payload_key(self) -> &'static str {
        match self {
            Section::Summary => "back",
            Section::Biography => "bio",
            Section::Inventory => "inv",
            Section::Stats => "stats",
            Section::Experience => "exp",
        }
    }

    pub fn from_payload_key(key: &str) -> Option<Self> {
        match key {
            "back" => Some(Section::Summary),
            "bio" => Some(Section::Biography),
            "inv" => Some(Section::Inventory),
            "stats" => Some(Section::Stats),
            "exp" => Some(Section::Experience),
            _ => None,
        }
    }

    fn button_label(self) -> String {
        match self {
            Section::Summary => t("button-back"),
            Section::Biography => t("button-biography"),
            Section::Inventory => t("button-inventory"),
            Section::Stats => t("button-stats"),
            Section::Experience => t("button-experience"),
        }
    }
}

/// Payload that cannot be decoded into a button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    UnknownAction(String),
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuError::UnknownAction(payload) => write!(f, "Unknown menu action: {payload}"),
        }
    }
}

impl std::error::Error for MenuError {}

/// A decoded button press: which section of whose profile to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonPress {
    pub section: Section,
    pub user_id: i64,
}

impl ButtonPress {
    pub fn new(section: Section, user_id: i64) -> Self {
        Self { section, user_id }
    }

    pub fn decode(payload: &str) -> Result<Self, MenuError> {
        let unknown = || MenuError::UnknownAction(payload.to_string());
        let (key, user_id) = payload.split_once(':').ok_or_else(unknown)?;
        let section = Section::from_payload_key(key).ok_or_else(unknown)?;
        let user_id = user_id.parse::<i64>().map_err(|_| unknown())?;
        Ok(Self { section, user_id })
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", self.section.payload_key(), self.user_id)
    }
}

/// Which part of a message an edit must rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Caption,
    Text,
}

impl EditTarget {
    /// Messages carrying an image only accept caption edits
    pub fn for_message(has_photo: bool) -> Self {
        if has_photo {
            EditTarget::Caption
        } else {
            EditTarget::Text
        }
    }

    pub fn max_len(self) -> usize {
        match self {
            EditTarget::Caption => MAX_CAPTION_LEN,
            EditTarget::Text => MAX_TEXT_LEN,
        }
    }
}

/// Length as Telegram measures it, in UTF-16 code units
pub fn telegram_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Cut text to the target's limit, marking the cut with an ellipsis
pub fn truncate_for(text: &str, target: EditTarget) -> String {
    let limit = target.max_len();
    if telegram_len(text) <= limit {
        return text.to_string();
    }

    let ellipsis = '…';
    let budget = limit - ellipsis.len_utf16();
    let mut used = 0;
    let mut truncated = String::new();
    for c in text.chars() {
        used += c.len_utf16();
        if used > budget {
            break;
        }
        truncated.push(c);
    }
    truncated.push(ellipsis);
    truncated
}

/// Rendered content and controls for one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuView {
    pub section: Section,
    pub text: String,
    pub keyboard: Keyboard,
}

/// Controls shown under a section
pub fn keyboard_for(section: Section, user_id: i64) -> Keyboard {
    match section {
        Section::Summary => Keyboard::new(vec![Section::BROWSABLE
            .iter()
            .map(|s| KeyboardButton::new(s.button_label(), ButtonPress::new(*s, user_id).encode()))
            .collect()]),
        _ => Keyboard::new(vec![vec![KeyboardButton::new(
            Section::Summary.button_label(),
            ButtonPress::new(Section::Summary, user_id).encode(),
        )]]),
    }
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => t("empty-value"),
    }
}

fn render_text(section: Section, profile: &Profile) -> String {
    match section {
        Section::Summary => format!(
            "{}: {}\n{}: {}\n{}: {}",
            t("field-name"),
            or_dash(profile.name.as_deref()),
            t("field-age"),
            or_dash(profile.age.as_deref()),
            t("field-role"),
            or_dash(profile.role.as_deref()),
        ),
        Section::Biography => format!(
            "{}:\n{}",
            t("section-biography"),
            or_dash(profile.biography.as_deref())
        ),
        Section::Inventory => {
            let body = if profile.inventory.is_empty() {
                t("inventory-empty")
            } else {
                profile
                    .inventory
                    .iter()
                    .map(|item| format!("- {item}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            format!("{}:\n{}", t("section-inventory"), body)
        }
        Section::Stats => {
            let body = if profile.stats.is_empty() {
                t("stats-empty")
            } else {
                profile
                    .stats
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            format!("{}:\n{}", t("section-stats"), body)
        }
        Section::Experience => format!("{}: {}", t("section-experience"), profile.experience),
    }
}

/// Render a section of a profile
pub fn render(section: Section, profile: &Profile) -> MenuView {
    MenuView {
        section,
        text: render_text(section, profile),
        keyboard: keyboard_for(section, profile.user_id),
    }
}

/// Resolve a button press against the profile it names
pub fn navigate(press: ButtonPress, profile: &Profile) -> MenuView {
    render(press.section, profile)
}
