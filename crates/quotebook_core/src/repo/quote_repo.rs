//! Whole-set quote persistence on top of a key-value store.
//!
//! # Responsibility
//! - Load the stored quote set, falling back to the seed set when unusable.
//! - Replace the stored set atomically (single key write).
//!
//! # Invariants
//! - `load` never returns an error for corrupt data; it reseeds instead.
//! - `save` rejects sets containing invalid quotes before writing.

use super::kv_store::KeyValueStore;
use super::RepoResult;
use crate::codec::{decode_quotes, encode_quotes};
use crate::model::quote::{default_quotes, Quote};
use log::{info, warn};

/// Storage key holding the serialized quote set.
pub const QUOTES_KEY: &str = "quotes";

/// Result of loading the stored set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedQuotes {
    pub quotes: Vec<Quote>,
    /// `true` when the seed set replaced missing or unreadable data.
    pub restored_defaults: bool,
}

/// Quote set repository over any [`KeyValueStore`].
pub struct QuoteRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> QuoteRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Loads the stored set.
    ///
    /// Missing or undecodable data is replaced by [`default_quotes`], which
    /// is persisted before returning.
    pub fn load(&mut self) -> RepoResult<LoadedQuotes> {
        let Some(raw) = self.store.get(QUOTES_KEY)? else {
            info!("event=quotes_load module=repo status=ok source=defaults reason=missing");
            return self.reseed();
        };

        match decode_quotes(&raw) {
            Ok(quotes) => {
                info!(
                    "event=quotes_load module=repo status=ok source=store count={}",
                    quotes.len()
                );
                Ok(LoadedQuotes {
                    quotes,
                    restored_defaults: false,
                })
            }
            Err(err) => {
                warn!(
                    "event=quotes_load module=repo status=error source=store error_code=invalid_quote_set error={}",
                    err
                );
                self.reseed()
            }
        }
    }

    /// Replaces the stored set.
    pub fn save(&mut self, quotes: &[Quote]) -> RepoResult<()> {
        for quote in quotes {
            quote.validate()?;
        }
        self.store.set(QUOTES_KEY, &encode_quotes(quotes))?;
        info!(
            "event=quotes_save module=repo status=ok count={}",
            quotes.len()
        );
        Ok(())
    }

    /// Removes the stored set; the next `load` reseeds.
    pub fn clear(&mut self) -> RepoResult<()> {
        self.store.remove(QUOTES_KEY)
    }

    fn reseed(&mut self) -> RepoResult<LoadedQuotes> {
        let quotes = default_quotes();
        self.save(&quotes)?;
        Ok(LoadedQuotes {
            quotes,
            restored_defaults: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{QuoteRepository, QUOTES_KEY};
    use crate::model::quote::{default_quotes, Quote};
    use crate::repo::kv_store::{KeyValueStore, MemoryKvStore};
    use crate::repo::RepoError;

    #[test]
    fn load_seeds_defaults_when_store_is_empty() {
        let mut repo = QuoteRepository::new(MemoryKvStore::new());
        let loaded = repo.load().unwrap();
        assert!(loaded.restored_defaults);
        assert_eq!(loaded.quotes, default_quotes());
        assert!(repo.store().get(QUOTES_KEY).unwrap().is_some());
    }

    #[test]
    fn load_reseeds_when_stored_value_is_not_an_array() {
        let mut store = MemoryKvStore::new();
        store.set(QUOTES_KEY, r#"{"text":"oops"}"#).unwrap();
        let mut repo = QuoteRepository::new(store);

        let loaded = repo.load().unwrap();
        assert!(loaded.restored_defaults);
        assert_eq!(loaded.quotes, default_quotes());
    }

    #[test]
    fn load_filters_invalid_entries_without_reseeding() {
        let mut store = MemoryKvStore::new();
        store
            .set(QUOTES_KEY, r#"[{"text":"ok"},{"nope":true}]"#)
            .unwrap();
        let mut repo = QuoteRepository::new(store);

        let loaded = repo.load().unwrap();
        assert!(!loaded.restored_defaults);
        assert_eq!(loaded.quotes, vec![Quote::new("ok", None)]);
    }

    #[test]
    fn save_rejects_invalid_quotes() {
        let mut repo = QuoteRepository::new(MemoryKvStore::new());
        let invalid = Quote {
            text: String::new(),
            category: None,
        };
        let err = repo.save(&[invalid]).expect_err("empty text must be rejected");
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(repo.store().get(QUOTES_KEY).unwrap().is_none());
    }
}
