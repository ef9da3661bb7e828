//! Quote domain model.
//!
//! # Responsibility
//! - Define the quote record and its normalization rules.
//! - Provide the seed set used when no stored quotes are usable.
//!
//! # Invariants
//! - `text` is the de-facto identity; there is no separate id field.
//! - `category` is `None` rather than an empty string.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Category applied when a quote is added without one.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// A single quote record.
///
/// Older exports name the classification field `author`; both spellings are
/// accepted on input and `category` is always written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    #[serde(default, alias = "author", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Validation failures for quote records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteValidationError {
    EmptyText,
}

impl Display for QuoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "quote text cannot be empty"),
        }
    }
}

impl Error for QuoteValidationError {}

impl Quote {
    /// Builds a normalized quote.
    ///
    /// Both fields are trimmed; a blank category collapses to `None`.
    /// The result is not validated, call [`Quote::validate`] before storing.
    pub fn new(text: impl AsRef<str>, category: Option<&str>) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
            category: normalize_category(category),
        }
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), QuoteValidationError> {
        if self.text.trim().is_empty() {
            return Err(QuoteValidationError::EmptyText);
        }
        Ok(())
    }

    /// Returns whether this quote belongs to `category`.
    ///
    /// The pseudo-category `all` matches every quote.
    pub fn matches_category(&self, category: &str) -> bool {
        category == ALL_CATEGORIES || self.category.as_deref() == Some(category)
    }
}

/// Pseudo-category selecting every quote.
pub const ALL_CATEGORIES: &str = "all";

/// Trims a category value and drops it when blank.
pub fn normalize_category(category: Option<&str>) -> Option<String> {
    category
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Seed set used when storage is empty or unreadable.
pub fn default_quotes() -> Vec<Quote> {
    vec![
        Quote::new("Believe in yourself!", Some("Motivation")),
        Quote::new(
            "Hard work beats talent when talent doesn’t work hard.",
            Some("Work"),
        ),
        Quote::new("Keep pushing forward!", Some("Inspiration")),
    ]
}
