//! Domain model for the quote book.
//!
//! # Responsibility
//! - Define the canonical quote record shared by storage, import and sync.
//!
//! # Invariants
//! - `Quote::text` is the identity key used for de-duplication and merges.
//! - Stored and exchanged records always carry non-empty trimmed text.

pub mod quote;
