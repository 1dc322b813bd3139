//! SQLite-backed cache of fetched courses.
//!
//! Courses are keyed by the URL the user pasted, so re-planning the same
//! course with different hours does not hit the curriculum API again.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::data_dir;
use crate::course::CourseData;
use crate::error::{DatabaseError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedCourse {
    pub url: String,
    pub course: CourseData,
    pub fetched_at: DateTime<Utc>,
}

pub struct CourseCache {
    conn: Connection,
}

impl CourseCache {
    /// Open the cache at `~/.config/studyplan/studyplan.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("studyplan.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let cache = Self { conn };
        cache.migrate()?;
        Ok(cache)
    }

    /// Open an in-memory cache (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.migrate()?;
        Ok(cache)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS courses (
                url        TEXT PRIMARY KEY,
                payload    TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Look up a course by URL.
    ///
    /// An entry whose payload no longer deserializes is treated as a miss.
    pub fn get(&self, url: &str) -> Result<Option<CachedCourse>> {
        let row = self
            .conn
            .query_row(
                "SELECT payload, fetched_at FROM courses WHERE url = ?1",
                params![url],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        let Some((payload, fetched_at)) = row else {
            return Ok(None);
        };

        let course: CourseData = match serde_json::from_str(&payload) {
            Ok(course) => course,
            Err(e) => {
                tracing::warn!(url, error = %e, "discarding unreadable cache entry");
                return Ok(None);
            }
        };
        let fetched_at = DateTime::parse_from_rfc3339(&fetched_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Some(CachedCourse {
            url: url.to_string(),
            course,
            fetched_at,
        }))
    }

    /// Insert or replace the entry for `url`.
    pub fn put(&self, url: &str, course: &CourseData) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        let payload = serde_json::to_string(course)?;
        self.conn.execute(
            "INSERT INTO courses (url, payload, fetched_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(url) DO UPDATE SET payload = excluded.payload, fetched_at = excluded.fetched_at",
            params![url, payload, now.to_rfc3339()],
        )?;
        Ok(now)
    }

    /// Remove one entry. Returns whether anything was removed.
    pub fn remove(&self, url: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM courses WHERE url = ?1", params![url])?;
        Ok(n > 0)
    }

    /// Drop every cached course. Returns the number of entries removed.
    pub fn clear(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM courses", [])?)
    }

    /// Cached URLs, most recently fetched first.
    pub fn urls(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM courses ORDER BY fetched_at DESC")?;
        let urls = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(urls)
    }
}
