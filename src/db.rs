//! # Profile Store
//!
//! SQLite persistence for character profiles. Every read and write is a single
//! statement scoped to one user id, so concurrent updates of different users never
//! interfere and writes to the same user are last-writer-wins.

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info, warn};

use crate::profile_model::{normalize_handle, Profile, ProfilePatch, Stats};

const MAX_CONNECTIONS: u32 = 5;

const PROFILE_COLUMNS: &str = "user_id, handle, name, age, role, photo_reference, inventory, stats, \
     experience, biography, last_photo_timestamp";

/// Open a pool for a `sqlite://` URL, creating the database file if needed
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database URL: {database_url}"))?;
    connect_with(options).await
}

/// Open a pool with explicit connection options
pub async fn connect_with(options: SqliteConnectOptions) -> Result<SqlitePool> {
    let options = options
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
        .context("Failed to open SQLite pool")
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &SqlitePool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS profiles (
            user_id INTEGER PRIMARY KEY,
            handle TEXT,
            name TEXT,
            age TEXT,
            role TEXT,
            photo_reference TEXT,
            inventory TEXT NOT NULL DEFAULT '[]',
            stats TEXT NOT NULL DEFAULT '{}',
            experience INTEGER NOT NULL DEFAULT 0,
            biography TEXT,
            last_photo_timestamp INTEGER,
            updated_at INTEGER NOT NULL,
            write_seq INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create profiles table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS profiles_handle_idx ON profiles (lower(handle))")
        .execute(pool)
        .await
        .context("Failed to create handle index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

fn decode_inventory(user_id: i64, raw: Option<&str>) -> Vec<String> {
    match raw {
        None => Vec::new(),
        Some(text) if text.trim().is_empty() => Vec::new(),
        Some(text) => serde_json::from_str(text).unwrap_or_else(|e| {
            warn!(user_id, error = %e, "Corrupted inventory column, using empty inventory");
            Vec::new()
        }),
    }
}

fn decode_stats(user_id: i64, raw: Option<&str>) -> Stats {
    match raw {
        None => Stats::new(),
        Some(text) if text.trim().is_empty() => Stats::new(),
        Some(text) => serde_json::from_str(text).unwrap_or_else(|e| {
            warn!(user_id, error = %e, "Corrupted stats column, using empty stats");
            Stats::new()
        }),
    }
}

fn profile_from_row(row: &SqliteRow) -> Result<Profile> {
    let user_id: i64 = row.try_get("user_id")?;
    let inventory: Option<String> = row.try_get("inventory")?;
    let stats: Option<String> = row.try_get("stats")?;
    let experience: Option<i64> = row.try_get("experience")?;

    Ok(Profile {
        user_id,
        handle: row.try_get("handle")?,
        name: row.try_get("name")?,
        age: row.try_get("age")?,
        role: row.try_get("role")?,
        photo_reference: row.try_get("photo_reference")?,
        inventory: decode_inventory(user_id, inventory.as_deref()),
        stats: decode_stats(user_id, stats.as_deref()),
        experience: experience.unwrap_or(0).max(0),
        biography: row.try_get("biography")?,
        last_photo_timestamp: row.try_get("last_photo_timestamp")?,
    })
}

/// Read a profile by user id
pub async fn get_profile(pool: &SqlitePool, user_id: i64) -> Result<Option<Profile>> {
    debug!(user_id, "Reading profile");

    let row = sqlx::query(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("Failed to read profile")?;

    match row {
        Some(row) => Ok(Some(profile_from_row(&row)?)),
        None => {
            debug!(user_id, "No profile found");
            Ok(None)
        }
    }
}

/// Create or update a profile.
///
/// Fields that are `None` in the patch keep their stored value, so a save never
/// clears a field. Experience is clamped to zero or more. An existing row's `write_seq`
/// only moves when the patch sets a handle.
pub async fn save_profile(pool: &SqlitePool, user_id: i64, patch: &ProfilePatch) -> Result<()> {
    info!(user_id, "Saving profile");

    let inventory = patch
        .inventory
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .context("Failed to encode inventory")?;
    let stats = patch
        .stats
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .context("Failed to encode stats")?;
    let handle = patch.handle.as_deref().map(normalize_handle);
    let experience = patch.experience.map(|exp| exp.max(0));
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO profiles (
            user_id, handle, name, age, role, photo_reference, inventory, stats,
            experience, biography, last_photo_timestamp, updated_at, write_seq
        )
        VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, COALESCE(?7, '[]'), COALESCE(?8, '{}'),
            COALESCE(?9, 0), ?10, ?11, ?12,
            (SELECT COALESCE(MAX(write_seq), 0) + 1 FROM profiles)
        )
        ON CONFLICT(user_id) DO UPDATE SET
            handle = COALESCE(?2, handle),
            name = COALESCE(?3, name),
            age = COALESCE(?4, age),
            role = COALESCE(?5, role),
            photo_reference = COALESCE(?6, photo_reference),
            inventory = COALESCE(?7, inventory),
            stats = COALESCE(?8, stats),
            experience = COALESCE(?9, experience),
            biography = COALESCE(?10, biography),
            last_photo_timestamp = COALESCE(?11, last_photo_timestamp),
            updated_at = ?12,
            write_seq = CASE WHEN ?2 IS NOT NULL THEN excluded.write_seq ELSE write_seq END",
    )
    .bind(user_id)
    .bind(handle)
    .bind(patch.name.as_deref())
    .bind(patch.age.as_deref())
    .bind(patch.role.as_deref())
    .bind(patch.photo_reference.as_deref())
    .bind(inventory)
    .bind(stats)
    .bind(experience)
    .bind(patch.biography.as_deref())
    .bind(patch.last_photo_timestamp)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to save profile")?;

    debug!(user_id, "Profile saved");
    Ok(())
}

/// Store a new profile photo, creating a shell profile if none exists
pub async fn save_photo(
    pool: &SqlitePool,
    user_id: i64,
    photo_reference: &str,
    timestamp: i64,
) -> Result<()> {
    info!(user_id, "Saving profile photo");
    save_profile(pool, user_id, &ProfilePatch::photo(photo_reference, timestamp)).await
}

/// Resolve a handle to the user id that most recently saved it
pub async fn find_user_by_handle(pool: &SqlitePool, handle: &str) -> Result<Option<i64>> {
    let handle = normalize_handle(handle);
    if handle.is_empty() {
        return Ok(None);
    }
    debug!(handle = %handle, "Looking up profile by handle");

    sqlx::query_scalar::<_, i64>(
        "SELECT user_id FROM profiles
         WHERE lower(handle) = lower(?1)
         ORDER BY write_seq DESC
         LIMIT 1",
    )
    .bind(handle)
    .fetch_optional(pool)
    .await
    .context("Failed to look up handle")
}
