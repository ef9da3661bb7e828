//! Core domain logic for the quote book.
//! This crate owns storage, import/export, reconciliation and sync.

pub mod codec;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod service;
pub mod sync;

pub use codec::{decode_quotes, encode_quotes, encode_quotes_pretty, CodecError};
pub use config::{default_config_path, ConfigError, QuotebookConfig, SyncConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::quote::{
    default_quotes, Quote, QuoteValidationError, ALL_CATEGORIES, DEFAULT_CATEGORY,
};
pub use reconcile::{
    reconcile, reconcile_with_report, CollectingNotifier, ConflictNotifier, LogNotifier,
    Reconciliation,
};
pub use repo::kv_store::{KeyValueStore, KvScope, MemoryKvStore, SqliteKvStore};
pub use repo::quote_repo::{LoadedQuotes, QuoteRepository};
pub use repo::{RepoError, RepoResult};
pub use service::quote_service::{ImportOutcome, QuoteService, QuoteServiceError};
pub use sync::http_remote::HttpQuoteRemote;
pub use sync::remote::{QuoteRemote, RemoteError, RemoteResult};
pub use sync::sync_service::{
    PeriodicSyncSummary, SyncError, SyncOptions, SyncReport, SyncService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
