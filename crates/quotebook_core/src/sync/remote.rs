//! Remote quote source contract.

use crate::codec::CodecError;
use crate::model::quote::Quote;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failures talking to a remote quote source.
#[derive(Debug)]
pub enum RemoteError {
    /// Transport-level failure (DNS, connect, timeout).
    Network(String),
    /// Non-success HTTP status with response body.
    Http(u16, String),
    /// Response body was not a quote array.
    Codec(CodecError),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Http(code, body) => write!(f, "HTTP {code}: {body}"),
            Self::Codec(err) => write!(f, "unexpected remote payload: {err}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CodecError> for RemoteError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Source of the authoritative remote quote set.
pub trait QuoteRemote {
    /// Fetches the full remote set.
    fn fetch_quotes(&self) -> RemoteResult<Vec<Quote>>;
    /// Publishes the full merged set.
    fn publish_quotes(&self, quotes: &[Quote]) -> RemoteResult<()>;
}
