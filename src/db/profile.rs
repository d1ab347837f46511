//! User profile store with a rolling expiry
//!
//! Each write pushes the row's expiry to now + [`PROFILE_TTL`]. Reads treat
//! expired rows as absent and delete them.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use rusqlite::OptionalExtension;

use super::DbPool;
use crate::language::Language;
use crate::{Error, Result, UserId};

/// Time a profile survives without being written
pub const PROFILE_TTL: TimeDelta = TimeDelta::seconds(86_400);

/// Persisted per-user record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Display name captured at onboarding
    pub name: String,
    /// Preferred language
    pub language: Language,
    /// Last derived style directive
    pub style: String,
}

/// Storage key for a user
#[must_use]
pub fn profile_key(user_id: UserId) -> String {
    format!("user:{user_id}")
}

/// Keyed profile storage
///
/// Failures surface as `Error::ProfileUnavailable`; callers degrade to
/// defaults instead of aborting the conversation.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a live profile
    ///
    /// # Errors
    ///
    /// Returns `Error::ProfileUnavailable` if the store cannot be reached
    async fn get(&self, user_id: UserId) -> Result<Option<UserProfile>>;

    /// Create or replace a profile and refresh its expiry
    ///
    /// # Errors
    ///
    /// Returns `Error::ProfileUnavailable` if the store cannot be reached
    async fn set(&self, user_id: UserId, profile: &UserProfile) -> Result<()>;
}

/// `SQLite`-backed profile store
#[derive(Clone)]
pub struct SqliteProfileStore {
    pool: DbPool,
    ttl: TimeDelta,
}

impl SqliteProfileStore {
    /// Create a store with the default TTL
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            ttl: PROFILE_TTL,
        }
    }

    /// Override the TTL
    #[must_use]
    pub const fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    fn conn(&self) -> Result<super::DbConn> {
        self.pool
            .get()
            .map_err(|e| Error::ProfileUnavailable(e.to_string()))
    }

    fn read(&self, key: &str) -> Result<Option<UserProfile>> {
        let conn = self.conn()?;
        let now = Utc::now().timestamp();

        let row: Option<(String, String, String, i64)> = conn
            .query_row(
                "SELECT name, language, style, expires_at FROM profiles WHERE key = ?1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(unavailable)?;

        let Some((name, language, style, expires_at)) = row else {
            return Ok(None);
        };

        if expires_at <= now {
            conn.execute("DELETE FROM profiles WHERE key = ?1", [key])
                .map_err(unavailable)?;
            tracing::debug!(key, "profile expired");
            return Ok(None);
        }

        let language = Language::parse(&language).unwrap_or_else(|| {
            tracing::warn!(key, language = %language, "stored language unknown, using default");
            Language::default()
        });

        Ok(Some(UserProfile {
            name,
            language,
            style,
        }))
    }

    fn write(&self, key: &str, profile: &UserProfile) -> Result<()> {
        let conn = self.conn()?;
        let expires_at = (Utc::now() + self.ttl).timestamp();

        conn.execute(
            "INSERT INTO profiles (key, name, language, style, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(key) DO UPDATE SET
                name = excluded.name,
                language = excluded.language,
                style = excluded.style,
                expires_at = excluded.expires_at",
            rusqlite::params![
                key,
                profile.name,
                profile.language.code(),
                profile.style,
                expires_at
            ],
        )
        .map_err(unavailable)?;

        Ok(())
    }

    /// Delete every expired row, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns `Error::ProfileUnavailable` if the store cannot be reached
    pub fn purge_expired(&self) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn
            .execute(
                "DELETE FROM profiles WHERE expires_at <= ?1",
                [Utc::now().timestamp()],
            )
            .map_err(unavailable)?;

        Ok(removed)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn unavailable(e: rusqlite::Error) -> Error {
    Error::ProfileUnavailable(e.to_string())
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn get(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        self.read(&profile_key(user_id))
    }

    async fn set(&self, user_id: UserId, profile: &UserProfile) -> Result<()> {
        self.write(&profile_key(user_id), profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory;

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            name: name.to_string(),
            language: Language::Ru,
            style: "neutral".to_string(),
        }
    }

    #[test]
    fn key_format() {
        assert_eq!(profile_key(42), "user:42");
    }

    #[tokio::test]
    async fn missing_profile_is_none() {
        let store = SqliteProfileStore::new(init_memory().unwrap());
        assert_eq!(store.get(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get() {
        let store = SqliteProfileStore::new(init_memory().unwrap());
        store.set(7, &profile("Alex")).await.unwrap();

        assert_eq!(store.get(7).await.unwrap(), Some(profile("Alex")));
        assert_eq!(store.get(8).await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites() {
        let store = SqliteProfileStore::new(init_memory().unwrap());
        store.set(7, &profile("Alex")).await.unwrap();

        let updated = UserProfile {
            language: Language::En,
            ..profile("Alex")
        };
        store.set(7, &updated).await.unwrap();

        assert_eq!(store.get(7).await.unwrap().unwrap().language, Language::En);
    }

    #[tokio::test]
    async fn expired_profile_reads_as_absent() {
        let store = SqliteProfileStore::new(init_memory().unwrap()).with_ttl(TimeDelta::seconds(-1));
        store.set(3, &profile("Old")).await.unwrap();

        assert_eq!(store.get(3).await.unwrap(), None);
        // The expired row was removed on read
        assert_eq!(store.purge_expired().unwrap(), 0);
    }

    #[tokio::test]
    async fn write_refreshes_expiry() {
        let pool = init_memory().unwrap();
        let expired = SqliteProfileStore::new(pool.clone()).with_ttl(TimeDelta::seconds(-1));
        let live = SqliteProfileStore::new(pool);

        expired.set(5, &profile("Sam")).await.unwrap();
        live.set(5, &profile("Sam")).await.unwrap();

        assert_eq!(live.get(5).await.unwrap(), Some(profile("Sam")));
    }

    #[test]
    fn purge_removes_only_expired() {
        let pool = init_memory().unwrap();
        let expired = SqliteProfileStore::new(pool.clone()).with_ttl(TimeDelta::seconds(-1));
        let live = SqliteProfileStore::new(pool);

        expired.write(&profile_key(1), &profile("a")).unwrap();
        expired.write(&profile_key(2), &profile("b")).unwrap();
        live.write(&profile_key(3), &profile("c")).unwrap();

        assert_eq!(live.purge_expired().unwrap(), 2);
        assert!(live.read(&profile_key(3)).unwrap().is_some());
    }

    #[tokio::test]
    async fn unknown_stored_language_falls_back() {
        let pool = init_memory().unwrap();
        let store = SqliteProfileStore::new(pool.clone());
        store.set(9, &profile("Kim")).await.unwrap();

        pool.get()
            .unwrap()
            .execute("UPDATE profiles SET language = 'xx' WHERE key = 'user:9'", [])
            .unwrap();

        assert_eq!(store.get(9).await.unwrap().unwrap().language, Language::default());
    }
}
