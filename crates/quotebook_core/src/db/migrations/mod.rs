//! Schema versioning for the quote book database.
//!
//! # Responsibility
//! - Keep the ordered list of schema steps.
//! - Bring a connection up to the newest step inside one transaction.
//!
//! # Invariants
//! - Step versions start at 1 and increase by exactly 1.
//! - `PRAGMA user_version` always names the last applied step.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// One schema step, applied as a SQL batch.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "kv_entries",
    sql: include_str!("0001_kv_entries.sql"),
}];

/// Newest schema version this binary can write.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.len() as u32
}

/// Applies every step newer than the database's `user_version`.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the database was written by a
///   newer binary.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let pending = pending_steps(from)?;
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate module=db status=ok version={} step={}",
            step.version, step.name
        );
    }
    tx.commit()?;
    Ok(())
}

fn pending_steps(from: u32) -> DbResult<&'static [SchemaStep]> {
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }
    // Steps are dense from 1, so version `n` sits at index `n - 1`.
    Ok(&SCHEMA_STEPS[from as usize..])
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_steps, SCHEMA_STEPS};

    #[test]
    fn steps_are_dense_and_ordered() {
        for (index, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
    }

    #[test]
    fn fresh_database_needs_every_step_and_current_needs_none() {
        assert_eq!(pending_steps(0).unwrap().len(), SCHEMA_STEPS.len());
        assert!(pending_steps(latest_version()).unwrap().is_empty());
        assert!(pending_steps(latest_version() + 1).is_err());
    }
}
