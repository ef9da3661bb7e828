//! Quote book use-case service.
//!
//! # Responsibility
//! - Own the in-memory quote set, display cursor and category selection.
//! - Persist every mutation through the quote repository.
//! - Record browsing state in the session store.
//!
//! # Invariants
//! - `cursor < quotes.len()` whenever the set is non-empty, else 0.
//! - The stored set equals `quotes()` after every successful mutation.
//! - Failed validation leaves both memory and storage unchanged.

use crate::codec::{decode_quotes, encode_quotes_pretty, CodecError};
use crate::model::quote::{Quote, QuoteValidationError, ALL_CATEGORIES, DEFAULT_CATEGORY};
use crate::repo::kv_store::KeyValueStore;
use crate::repo::quote_repo::QuoteRepository;
use crate::repo::RepoError;
use log::{info, warn};
use rand::Rng;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Local key for the persisted category filter.
pub const SELECTED_CATEGORY_KEY: &str = "selected_category";
/// Session key for the index of the last shown quote.
pub const LAST_INDEX_KEY: &str = "last_index";
/// Session key for the text of the last shown quote.
pub const LAST_VIEWED_KEY: &str = "last_viewed_quote";

pub type ServiceResult<T> = Result<T, QuoteServiceError>;

/// Service error for quote book use cases.
#[derive(Debug)]
pub enum QuoteServiceError {
    /// Input quote failed validation.
    Validation(QuoteValidationError),
    /// Index does not address a stored quote.
    IndexOutOfRange { index: usize, len: usize },
    /// Import payload contained no usable quotes.
    NoValidQuotes,
    /// Import payload was not a JSON array.
    Codec(CodecError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for QuoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "no quote at position {index} (have {len})")
            }
            Self::NoValidQuotes => write!(f, "no valid quotes found in input"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QuoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QuoteValidationError> for QuoteServiceError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CodecError> for QuoteServiceError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<RepoError> for QuoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Outcome of a JSON import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Quotes appended to the set.
    pub added: usize,
    /// Valid quotes skipped because their text already existed.
    pub skipped: usize,
}

impl ImportOutcome {
    /// User-facing summary line.
    pub fn message(&self) -> String {
        if self.added == 0 {
            "No new quotes were added (all duplicates).".to_string()
        } else {
            format!("{} quote(s) imported successfully.", self.added)
        }
    }
}

/// Owned quote book state backed by a local and a session store.
pub struct QuoteService<L: KeyValueStore, S: KeyValueStore> {
    repo: QuoteRepository<L>,
    session: S,
    quotes: Vec<Quote>,
    cursor: usize,
    selected_category: String,
    restored_defaults: bool,
}

impl<L: KeyValueStore, S: KeyValueStore> QuoteService<L, S> {
    /// Loads the stored set and restores view state.
    ///
    /// A stored cursor that does not parse or is out of range resets to 0.
    pub fn open(local: L, session: S) -> ServiceResult<Self> {
        let mut repo = QuoteRepository::new(local);
        let loaded = repo.load()?;
        let selected_category = repo
            .store()
            .get(SELECTED_CATEGORY_KEY)?
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| ALL_CATEGORIES.to_string());
        let cursor = session
            .get(LAST_INDEX_KEY)?
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|index| *index < loaded.quotes.len())
            .unwrap_or(0);

        Ok(Self {
            repo,
            session,
            quotes: loaded.quotes,
            cursor,
            selected_category,
            restored_defaults: loaded.restored_defaults,
        })
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Quote under the cursor, `None` when the set is empty.
    pub fn current(&self) -> Option<&Quote> {
        self.quotes.get(self.cursor)
    }

    /// Whether the last load had to fall back to the seed set.
    pub fn restored_defaults(&self) -> bool {
        self.restored_defaults
    }

    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    pub fn local_store(&self) -> &L {
        self.repo.store()
    }

    pub fn session_store(&self) -> &S {
        &self.session
    }

    /// Appends a quote and moves the cursor onto it.
    ///
    /// # Contract
    /// - Text and category are trimmed.
    /// - A missing or blank category becomes [`DEFAULT_CATEGORY`].
    pub fn add_quote(&mut self, text: &str, category: Option<&str>) -> ServiceResult<&Quote> {
        let mut quote = Quote::new(text, category);
        quote.validate()?;
        if quote.category.is_none() {
            quote.category = Some(DEFAULT_CATEGORY.to_string());
        }

        self.quotes.push(quote);
        if let Err(err) = self.repo.save(&self.quotes) {
            self.quotes.pop();
            return Err(err.into());
        }

        let index = self.quotes.len() - 1;
        self.move_cursor(index)?;
        info!(
            "event=quote_add module=service status=ok count={}",
            self.quotes.len()
        );
        Ok(&self.quotes[index])
    }

    /// Removes the quote at `index` and returns it.
    pub fn remove_quote(&mut self, index: usize) -> ServiceResult<Quote> {
        if index >= self.quotes.len() {
            return Err(QuoteServiceError::IndexOutOfRange {
                index,
                len: self.quotes.len(),
            });
        }

        let removed = self.quotes.remove(index);
        if let Err(err) = self.repo.save(&self.quotes) {
            self.quotes.insert(index, removed);
            return Err(err.into());
        }

        if self.cursor >= self.quotes.len() {
            self.cursor = self.quotes.len().saturating_sub(1);
        }
        self.session.set(LAST_INDEX_KEY, &self.cursor.to_string())?;
        info!(
            "event=quote_remove module=service status=ok count={}",
            self.quotes.len()
        );
        Ok(removed)
    }

    /// Shows the quote at `index`.
    pub fn show_at(&mut self, index: usize) -> ServiceResult<&Quote> {
        if index >= self.quotes.len() {
            return Err(QuoteServiceError::IndexOutOfRange {
                index,
                len: self.quotes.len(),
            });
        }
        self.move_cursor(index)?;
        Ok(&self.quotes[index])
    }

    /// Advances the cursor, wrapping to the first quote.
    pub fn show_next(&mut self) -> ServiceResult<Option<&Quote>> {
        if self.quotes.is_empty() {
            return Ok(None);
        }
        let index = (self.cursor + 1) % self.quotes.len();
        self.move_cursor(index)?;
        Ok(self.quotes.get(index))
    }

    /// Moves the cursor back, wrapping to the last quote.
    pub fn show_prev(&mut self) -> ServiceResult<Option<&Quote>> {
        if self.quotes.is_empty() {
            return Ok(None);
        }
        let len = self.quotes.len();
        let index = (self.cursor + len - 1) % len;
        self.move_cursor(index)?;
        Ok(self.quotes.get(index))
    }

    /// Shows a uniformly random quote from the selected category.
    ///
    /// Returns `None` when no quote matches the selection.
    pub fn show_random<R: Rng>(&mut self, rng: &mut R) -> ServiceResult<Option<&Quote>> {
        let candidates: Vec<usize> = self
            .quotes
            .iter()
            .enumerate()
            .filter(|(_, quote)| quote.matches_category(&self.selected_category))
            .map(|(index, _)| index)
            .collect();
        if candidates.is_empty() {
            return Ok(None);
        }

        let index = candidates[rng.gen_range(0..candidates.len())];
        self.move_cursor(index)?;
        Ok(self.quotes.get(index))
    }

    /// `all` followed by distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for category in self.quotes.iter().filter_map(|quote| quote.category.as_deref()) {
            if category != ALL_CATEGORIES && seen.insert(category) {
                categories.push(category.to_string());
            }
        }
        categories
    }

    /// Quotes matching the selected category, in stored order.
    pub fn filtered_quotes(&self) -> Vec<&Quote> {
        self.quotes
            .iter()
            .filter(|quote| quote.matches_category(&self.selected_category))
            .collect()
    }

    /// Persists a new category filter and returns how many quotes match.
    ///
    /// A blank name selects `all`. Unknown categories are accepted and simply
    /// match nothing until a quote carries them.
    pub fn select_category(&mut self, category: &str) -> ServiceResult<usize> {
        let trimmed = category.trim();
        let selected = if trimmed.is_empty() {
            ALL_CATEGORIES
        } else {
            trimmed
        };
        self.repo.store_mut().set(SELECTED_CATEGORY_KEY, selected)?;
        self.selected_category = selected.to_string();
        Ok(self.filtered_quotes().len())
    }

    /// Imports quotes from a JSON array.
    ///
    /// Quotes whose text already exists in the set are skipped. Nothing is
    /// persisted when every quote is a duplicate.
    pub fn import_json(&mut self, raw: &str) -> ServiceResult<ImportOutcome> {
        let imported = match decode_quotes(raw) {
            Ok(quotes) => quotes,
            Err(err) => {
                warn!("event=quotes_import module=service status=error error={err}");
                return Err(err.into());
            }
        };
        if imported.is_empty() {
            warn!("event=quotes_import module=service status=error error_code=no_valid_quotes");
            return Err(QuoteServiceError::NoValidQuotes);
        }

        let existing: HashSet<&str> = self.quotes.iter().map(|quote| quote.text.as_str()).collect();
        let (fresh, duplicates): (Vec<Quote>, Vec<Quote>) = imported
            .into_iter()
            .partition(|quote| !existing.contains(quote.text.as_str()));
        let outcome = ImportOutcome {
            added: fresh.len(),
            skipped: duplicates.len(),
        };

        if outcome.added > 0 {
            let previous_len = self.quotes.len();
            self.quotes.extend(fresh);
            if let Err(err) = self.repo.save(&self.quotes) {
                self.quotes.truncate(previous_len);
                return Err(err.into());
            }
        }

        info!(
            "event=quotes_import module=service status=ok added={} skipped={}",
            outcome.added, outcome.skipped
        );
        Ok(outcome)
    }

    /// Pretty JSON export of the whole set.
    pub fn export_json(&self) -> String {
        encode_quotes_pretty(&self.quotes)
    }

    /// Replaces the whole set, e.g. with a reconciled one.
    pub fn replace_all(&mut self, quotes: Vec<Quote>) -> ServiceResult<()> {
        self.repo.save(&quotes)?;
        self.quotes = quotes;
        if self.cursor >= self.quotes.len() {
            self.cursor = self.quotes.len().saturating_sub(1);
        }
        Ok(())
    }

    /// Re-reads the stored set, picking up writes made through other
    /// connections. The cursor is clamped to the reloaded set.
    pub fn reload(&mut self) -> ServiceResult<()> {
        let loaded = self.repo.load()?;
        self.quotes = loaded.quotes;
        self.restored_defaults = loaded.restored_defaults;
        if self.cursor >= self.quotes.len() {
            self.cursor = self.quotes.len().saturating_sub(1);
        }
        Ok(())
    }

    /// Drops the stored set and restores the seed quotes.
    pub fn clear_saved(&mut self) -> ServiceResult<()> {
        self.repo.clear()?;
        let loaded = self.repo.load()?;
        self.quotes = loaded.quotes;
        self.restored_defaults = loaded.restored_defaults;
        if self.cursor >= self.quotes.len() {
            self.cursor = 0;
        }
        info!("event=quotes_clear module=service status=ok scope=local");
        Ok(())
    }

    /// Clears the stored set and all session state.
    pub fn clear_all(&mut self) -> ServiceResult<()> {
        self.session.clear()?;
        self.cursor = 0;
        self.clear_saved()?;
        info!("event=quotes_clear module=service status=ok scope=session");
        Ok(())
    }

    fn move_cursor(&mut self, index: usize) -> ServiceResult<()> {
        self.cursor = index;
        self.session.set(LAST_INDEX_KEY, &index.to_string())?;
        if let Some(quote) = self.quotes.get(index) {
            self.session.set(LAST_VIEWED_KEY, &quote.text)?;
        }
        Ok(())
    }
}
