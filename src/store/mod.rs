//! Per-guild filter word persistence.
//!
//! One relation, `filter_words(guild_id, filter_word)`, unique on the pair.
//! Words are lower-cased at write time; listing returns insertion order so
//! moderation checks words in the order admins added them.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::common::error::StoreResult;

/// Outcome of inserting a single filter word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Created,
    AlreadyExists,
}

/// Outcome of removing a single filter word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// SQLite-backed store of per-guild filter words.
#[derive(Debug, Clone)]
pub struct FilterStore {
    pool: SqlitePool,
}

impl FilterStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `path` and ensure the schema.
    pub async fn connect(path: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = Self::new(pool);
        store.init().await?;
        info!("Filter store ready at {}", path);
        Ok(store)
    }

    /// Initialize the filter_words table schema.
    pub async fn init(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS filter_words (
                guild_id    INTEGER NOT NULL,
                filter_word TEXT    NOT NULL,
                UNIQUE (guild_id, filter_word)
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a word for a guild. Duplicate inserts are reported, not errors.
    pub async fn add(&self, guild_id: u64, word: &str) -> StoreResult<AddOutcome> {
        let word = normalize(word);
        let result = sqlx::query(
            "INSERT OR IGNORE INTO filter_words (guild_id, filter_word) VALUES (?, ?)",
        )
        .bind(guild_id as i64)
        .bind(&word)
        .execute(&self.pool)
        .await?;

        Ok(if result.rows_affected() > 0 {
            AddOutcome::Created
        } else {
            AddOutcome::AlreadyExists
        })
    }

    /// Remove a word for a guild.
    pub async fn remove(&self, guild_id: u64, word: &str) -> StoreResult<RemoveOutcome> {
        let word = normalize(word);
        let result = sqlx::query(
            "DELETE FROM filter_words WHERE guild_id = ? AND filter_word = ?",
        )
        .bind(guild_id as i64)
        .bind(&word)
        .execute(&self.pool)
        .await?;

        Ok(if result.rows_affected() > 0 {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotFound
        })
    }

    /// List a guild's words in insertion order.
    pub async fn list(&self, guild_id: u64) -> StoreResult<Vec<String>> {
        let words = sqlx::query_scalar::<_, String>(
            "SELECT filter_word FROM filter_words WHERE guild_id = ? ORDER BY rowid",
        )
        .bind(guild_id as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(words)
    }

    /// Check whether a guild's list contains a word.
    #[allow(dead_code)]
    pub async fn contains(&self, guild_id: u64, word: &str) -> StoreResult<bool> {
        let word = normalize(word);
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM filter_words WHERE guild_id = ? AND filter_word = ?",
        )
        .bind(guild_id as i64)
        .bind(&word)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Insert many words, skipping duplicates. Returns how many were added.
    pub async fn add_batch(&self, guild_id: u64, words: &[String]) -> StoreResult<usize> {
        let mut added = 0;
        for word in words {
            if self.add(guild_id, word).await? == AddOutcome::Created {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Remove many words, skipping ones not present. Returns how many were removed.
    pub async fn remove_batch(&self, guild_id: u64, words: &[String]) -> StoreResult<usize> {
        let mut removed = 0;
        for word in words {
            if self.remove(guild_id, word).await? == RemoveOutcome::Removed {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Words are stored trimmed and lower-cased.
fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

#[cfg(test)]
pub(crate) async fn memory_store() -> FilterStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    let store = FilterStore::new(pool);
    store.init().await.expect("schema init");
    store
}
