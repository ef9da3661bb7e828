//! JSON encoding and lenient decoding of quote arrays.
//!
//! # Responsibility
//! - Turn untrusted JSON (stored sets, import files, remote bodies) into
//!   validated quotes.
//! - Serialize quote sets for storage, export and publication.
//!
//! # Invariants
//! - Decoding never yields a quote with empty text.
//! - Malformed entries are dropped; only a non-array top level is an error.

use crate::model::quote::{normalize_category, Quote};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Decoding failures for quote arrays.
#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    NotAnArray,
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid JSON: {err}"),
            Self::NotAnArray => write!(f, "expected a JSON array of quote objects"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::NotAnArray => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Decodes a JSON array into normalized quotes.
///
/// Entries that are not objects, lack a string `text`, or carry blank text
/// are skipped. The classification is read from `category`, falling back to
/// `author`. The result may be empty.
///
/// # Errors
/// - `CodecError::Json` when `raw` is not valid JSON.
/// - `CodecError::NotAnArray` when the top-level value is not an array.
pub fn decode_quotes(raw: &str) -> Result<Vec<Quote>, CodecError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Array(items) = value else {
        return Err(CodecError::NotAnArray);
    };

    Ok(items.iter().filter_map(quote_from_value).collect())
}

/// Compact encoding used for storage and HTTP bodies.
pub fn encode_quotes(quotes: &[Quote]) -> String {
    // Quote holds only strings, serialization cannot fail.
    serde_json::to_string(quotes).unwrap_or_else(|_| "[]".to_string())
}

/// Pretty encoding (2-space indent) used for export files.
pub fn encode_quotes_pretty(quotes: &[Quote]) -> String {
    serde_json::to_string_pretty(quotes).unwrap_or_else(|_| "[]".to_string())
}

fn quote_from_value(value: &Value) -> Option<Quote> {
    let object = value.as_object()?;
    let text = object.get("text")?.as_str()?;
    let category = object
        .get("category")
        .and_then(Value::as_str)
        .or_else(|| object.get("author").and_then(Value::as_str));

    let quote = Quote {
        text: text.trim().to_string(),
        category: normalize_category(category),
    };
    quote.validate().ok()?;
    Some(quote)
}
