//! HTTP adapter for [`QuoteRemote`].
//!
//! Blocking reqwest client, no async runtime required.

use super::remote::{QuoteRemote, RemoteError, RemoteResult};
use crate::codec::decode_quotes;
use crate::config::SyncConfig;
use crate::model::quote::Quote;
use log::info;
use reqwest::blocking::{Client, Response};
use std::time::Duration;

/// Quote endpoint reachable over HTTP.
///
/// `GET <endpoint>` must return a JSON array of quote objects;
/// `POST <endpoint>` receives the merged set as a JSON array.
#[derive(Clone)]
pub struct HttpQuoteRemote {
    http: Client,
    endpoint: String,
}

impl HttpQuoteRemote {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> RemoteResult<Self> {
        let http = Client::builder()
            .user_agent(format!("quotebook/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|err| RemoteError::Network(err.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &SyncConfig) -> RemoteResult<Self> {
        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl QuoteRemote for HttpQuoteRemote {
    fn fetch_quotes(&self) -> RemoteResult<Vec<Quote>> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .map_err(|err| RemoteError::Network(err.to_string()))?;
        let body = ensure_success(response)?
            .text()
            .map_err(|err| RemoteError::Network(err.to_string()))?;

        let quotes = decode_quotes(&body)?;
        info!(
            "event=remote_fetch module=sync status=ok count={}",
            quotes.len()
        );
        Ok(quotes)
    }

    fn publish_quotes(&self, quotes: &[Quote]) -> RemoteResult<()> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(quotes)
            .send()
            .map_err(|err| RemoteError::Network(err.to_string()))?;
        ensure_success(response)?;

        info!(
            "event=remote_publish module=sync status=ok count={}",
            quotes.len()
        );
        Ok(())
    }
}

fn ensure_success(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(RemoteError::Http(status.as_u16(), body))
}
