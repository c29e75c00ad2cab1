//! # Profile Text Parser
//!
//! Turns a free-form block of `field: value` lines into a [`ProfilePatch`].
//!
//! ## Features
//!
//! - Labels matched case-insensitively against English and Russian synonyms
//! - Lines without a recognised label continue the previous field (multi-line biographies)
//! - Inventory split on commas, semicolons, newlines and the word "и"/"and"
//! - Stats read as `name: value`, `name=value` or `name value` pieces
//! - Experience taken from the first integer in its value
//!
//! The parser never fails: a malformed sub-field degrades to empty or zero so the
//! rest of the user's edits are kept.
//!
//! ## Usage
//!
//! ```rust
//! use charsheet::profile_parser::parse_profile_text;
//!
//! let patch = parse_profile_text("/setprofile\nИмя: Лира\nВозраст: 23");
//! assert_eq!(patch.name.as_deref(), Some("Лира"));
//! assert_eq!(patch.age.as_deref(), Some("23"));
//! ```

use crate::profile_model::{ProfilePatch, Stats};
use log::{debug, trace};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Profile fields that can be set from text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Name,
    Age,
    Role,
    Biography,
    Inventory,
    Stats,
    Experience,
}

/// Label synonyms, lower-case
static FIELD_LABELS: LazyLock<HashMap<&'static str, ProfileField>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    map.insert("name", ProfileField::Name);
    map.insert("имя", ProfileField::Name);

    map.insert("age", ProfileField::Age);
    map.insert("возраст", ProfileField::Age);

    map.insert("role", ProfileField::Role);
    map.insert("class", ProfileField::Role);
    map.insert("роль", ProfileField::Role);
    map.insert("класс", ProfileField::Role);

    map.insert("bio", ProfileField::Biography);
    map.insert("biography", ProfileField::Biography);
    map.insert("биография", ProfileField::Biography);
    map.insert("предыстория", ProfileField::Biography);

    map.insert("inventory", ProfileField::Inventory);
    map.insert("items", ProfileField::Inventory);
    map.insert("инвентарь", ProfileField::Inventory);

    map.insert("stats", ProfileField::Stats);
    map.insert("статы", ProfileField::Stats);
    map.insert("статистика", ProfileField::Stats);
    map.insert("характеристики", ProfileField::Stats);

    map.insert("exp", ProfileField::Experience);
    map.insert("xp", ProfileField::Experience);
    map.insert("experience", ProfileField::Experience);
    map.insert("опыт", ProfileField::Experience);

    map
});

static LABEL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^:]+?)\s*:\s*(.*)$").expect("Label pattern should be valid"));

static INVENTORY_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[,;\n]|\s+(?:и|and)\s+").expect("Inventory separator pattern should be valid")
});

static STATS_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;\n]").expect("Stats separator pattern should be valid"));

static STAT_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(.+?)\s*(?:[:=]|\s)\s*(-?\d+)\s*$").expect("Stat entry pattern should be valid")
});

static FIRST_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+").expect("Integer pattern should be valid"));

/// Look up a label in the synonym table
pub fn field_for_label(label: &str) -> Option<ProfileField> {
    FIELD_LABELS.get(label.trim().to_lowercase().as_str()).copied()
}

/// Drop a leading `/command` token, keeping anything after it on the same line
fn strip_command_token(raw_text: &str) -> &str {
    let trimmed = raw_text.trim_start();
    if !trimmed.starts_with('/') {
        return trimmed;
    }
    match trimmed.find(char::is_whitespace) {
        Some(idx) => &trimmed[idx..],
        None => "",
    }
}

/// Group lines into raw per-field values in first-seen order
fn collect_raw_fields(text: &str) -> Vec<(ProfileField, String)> {
    let mut fields: Vec<(ProfileField, String)> = Vec::new();
    let mut current: Option<usize> = None;

    for line in text.lines() {
        let recognised = LABEL_LINE.captures(line).and_then(|caps| {
            field_for_label(&caps[1]).map(|field| (field, caps[2].trim().to_string()))
        });

        match (recognised, current) {
            (Some((field, value)), _) => {
                // A repeated label replaces the earlier value
                if let Some(idx) = fields.iter().position(|(f, _)| *f == field) {
                    fields[idx].1 = value;
                    current = Some(idx);
                } else {
                    fields.push((field, value));
                    current = Some(fields.len() - 1);
                }
            }
            (None, Some(idx)) => {
                let continuation = line.trim();
                let value = &mut fields[idx].1;
                if value.is_empty() {
                    value.push_str(continuation);
                } else {
                    value.push('\n');
                    value.push_str(continuation);
                }
            }
            (None, None) => {
                trace!("Dropping line before any recognised label: {line}");
            }
        }
    }

    fields
}

/// Split an inventory value into item names
pub fn parse_inventory(raw: &str) -> Vec<String> {
    INVENTORY_SEPARATOR
        .split(raw)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read `name value` pairs, dropping pieces that do not parse
pub fn parse_stats(raw: &str) -> Stats {
    let mut stats = Stats::new();
    for piece in STATS_SEPARATOR.split(raw) {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let parsed = STAT_ENTRY.captures(piece).and_then(|caps| {
            caps[2]
                .parse::<i64>()
                .ok()
                .map(|value| (caps[1].trim().to_string(), value))
        });
        match parsed {
            Some((name, value)) => {
                stats.insert(name, value);
            }
            None => debug!("Skipping unparsable stat entry: {piece}"),
        }
    }
    stats
}

/// First integer in the text, or 0
pub fn parse_experience(raw: &str) -> i64 {
    FIRST_INTEGER
        .find(raw)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(0)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a profile block into a patch.
///
/// Scalar fields with an empty value are left unset. List-like fields are always
/// set once their label appears, even if nothing in them parsed.
pub fn parse_profile_text(raw_text: &str) -> ProfilePatch {
    let body = strip_command_token(raw_text);
    let mut patch = ProfilePatch::default();

    for (field, value) in collect_raw_fields(body) {
        match field {
            ProfileField::Name => patch.name = non_empty(value),
            ProfileField::Age => patch.age = non_empty(value),
            ProfileField::Role => patch.role = non_empty(value),
            ProfileField::Biography => patch.biography = non_empty(value),
            ProfileField::Inventory => patch.inventory = Some(parse_inventory(&value)),
            ProfileField::Stats => patch.stats = Some(parse_stats(&value)),
            ProfileField::Experience => patch.experience = Some(parse_experience(&value)),
        }
    }

    debug!("Parsed profile text into patch: {patch:?}");
    patch
}
