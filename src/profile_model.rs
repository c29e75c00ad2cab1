//! # Character Profile Data Model
//!
//! This module defines the persisted per-user character record and the patch
//! type used to create or update it.
//!
//! ## Core Concepts
//!
//! - **Profile**: the full record as read back from storage, with defaults applied
//! - **ProfilePatch**: a partial update; `None` fields are left untouched on save
//!
//! ## Usage
//!
//! ```rust
//! use charsheet::profile_model::ProfilePatch;
//!
//! let patch = ProfilePatch {
//!     name: Some("Лира".to_string()),
//!     inventory: Some(vec!["Лук".to_string()]),
//!     ..Default::default()
//! };
//! assert!(!patch.is_empty());
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Attribute name to value mapping, in the order the user entered them.
///
/// Stored as a JSON object; reading it back keeps the document order.
pub type Stats = IndexMap<String, i64>;

/// A stored character profile
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Profile {
    /// Telegram user id, the primary key
    pub user_id: i64,
    /// Public alias used for `@handle` lookups, stored without the `@`
    pub handle: Option<String>,
    pub name: Option<String>,
    pub age: Option<String>,
    pub role: Option<String>,
    /// Telegram file id of the profile photo
    pub photo_reference: Option<String>,
    pub inventory: Vec<String>,
    pub stats: Stats,
    /// Never negative
    pub experience: i64,
    pub biography: Option<String>,
    /// Epoch seconds of the last photo upload
    pub last_photo_timestamp: Option<i64>,
}

impl Profile {
    pub fn has_photo(&self) -> bool {
        self.photo_reference.is_some()
    }
}

/// A partial profile update
///
/// Field names follow [`Profile`]; the aliases accept the keys of the
/// administrative JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilePatch {
    #[serde(alias = "username")]
    pub handle: Option<String>,
    pub name: Option<String>,
    pub age: Option<String>,
    pub role: Option<String>,
    #[serde(alias = "photo_id")]
    pub photo_reference: Option<String>,
    pub inventory: Option<Vec<String>>,
    pub stats: Option<Stats>,
    #[serde(alias = "exp")]
    pub experience: Option<i64>,
    #[serde(alias = "bio")]
    pub biography: Option<String>,
    pub last_photo_timestamp: Option<i64>,
}

impl ProfilePatch {
    /// A patch that only touches the photo fields
    pub fn photo(photo_reference: impl Into<String>, timestamp: i64) -> Self {
        Self {
            photo_reference: Some(photo_reference.into()),
            last_photo_timestamp: Some(timestamp),
            ..Default::default()
        }
    }

    /// True when no character field is set.
    ///
    /// The handle is bookkeeping rather than character data, so it is ignored here.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.role.is_none()
            && self.photo_reference.is_none()
            && self.inventory.is_none()
            && self.stats.is_none()
            && self.experience.is_none()
            && self.biography.is_none()
            && self.last_photo_timestamp.is_none()
    }

    pub fn with_handle(mut self, handle: Option<&str>) -> Self {
        if let Some(handle) = handle.map(normalize_handle).filter(|h| !h.is_empty()) {
            self.handle = Some(handle);
        }
        self
    }
}

impl From<&Profile> for ProfilePatch {
    fn from(profile: &Profile) -> Self {
        Self {
            handle: profile.handle.clone(),
            name: profile.name.clone(),
            age: profile.age.clone(),
            role: profile.role.clone(),
            photo_reference: profile.photo_reference.clone(),
            inventory: Some(profile.inventory.clone()),
            stats: Some(profile.stats.clone()),
            experience: Some(profile.experience),
            biography: profile.biography.clone(),
            last_photo_timestamp: profile.last_photo_timestamp,
        }
    }
}

/// Strip surrounding whitespace and a leading `@` from a handle
pub fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_string()
}
