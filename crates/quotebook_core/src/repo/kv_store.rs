//! Key-value store contract with SQLite and in-memory implementations.
//!
//! # Responsibility
//! - Provide string-keyed persistence for the quote set and view state.
//! - Separate long-lived (`local`) from per-session (`session`) entries.
//!
//! # Invariants
//! - `clear` never touches another scope's entries.
//! - `set` replaces any previous value for the same key.

use super::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;

/// String key-value storage used by the quote book.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> RepoResult<()>;
    fn remove(&mut self, key: &str) -> RepoResult<()>;
    /// Removes every entry owned by this store.
    fn clear(&mut self) -> RepoResult<()>;
}

/// Lifetime class of a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvScope {
    /// Survives across sessions (quote set, selected category).
    Local,
    /// Browsing state that `clear --all` resets (cursor, last viewed).
    Session,
}

impl KvScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Session => "session",
        }
    }
}

/// SQLite-backed store bound to one scope of `kv_entries`.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
    scope: KvScope,
}

impl<'conn> SqliteKvStore<'conn> {
    pub fn new(conn: &'conn Connection, scope: KvScope) -> Self {
        Self { conn, scope }
    }

    pub fn scope(&self) -> KvScope {
        self.scope
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE scope = ?1 AND key = ?2;",
                params![self.scope.as_str(), key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (scope, key, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (scope, key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.scope.as_str(), key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM kv_entries WHERE scope = ?1 AND key = ?2;",
            params![self.scope.as_str(), key],
        )?;
        Ok(())
    }

    fn clear(&mut self) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM kv_entries WHERE scope = ?1;",
            [self.scope.as_str()],
        )?;
        Ok(())
    }
}

/// In-process store; contents are lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: BTreeMap<String, String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> RepoResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> RepoResult<()> {
        self.entries.clear();
        Ok(())
    }
}
