//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value contract the quote book persists through.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - The quote set is always read and replaced as a whole.
//! - Repository writes validate every quote before persistence.

use crate::db::DbError;
use crate::model::quote::QuoteValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod kv_store;
pub mod quote_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for key-value and quote persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(QuoteValidationError),
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<QuoteValidationError> for RepoError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
