//! HTTP Key/Value Fetcher
//!
//! Fetches the value for a key from `GET {base_url}/{key}` on an upstream
//! origin.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::error::FetchError;
use crate::fetcher::{DefaultValueFetcher, ValueFetcher};

// == HTTP Value Fetcher ==
/// Fetcher backed by a remote key/value origin spoken to over HTTP.
///
/// A 404 either becomes an empty value (`missing_as_empty`), which is then
/// cached like any other value so missing keys stop hitting the origin, or the
/// use-default signal. The default capability is only exposed when a default
/// value has been configured.
#[derive(Debug, Clone)]
pub struct HttpValueFetcher {
    client: Client,
    base_url: String,
    missing_as_empty: bool,
    default_value: Option<String>,
}

impl HttpValueFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            missing_as_empty: false,
            default_value: None,
        }
    }

    /// Use a preconfigured client, e.g. one with a request timeout.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_missing_as_empty(mut self, missing_as_empty: bool) -> Self {
        self.missing_as_empty = missing_as_empty;
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Appends the key to the base URL as a single percent-encoded path segment.
    fn url_for(&self, key: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            FetchError::with_source(format!("invalid upstream url {}", self.base_url), e)
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                FetchError::new(format!("upstream url {} cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .push(key);
        Ok(url)
    }
}

#[async_trait]
impl ValueFetcher for HttpValueFetcher {
    type Args = str;
    type Value = String;

    fn key(&self, args: &str) -> String {
        args.to_string()
    }

    async fn fetch_value(&self, args: &str) -> Result<String, FetchError> {
        let url = self.url_for(args)?;
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::with_source(format!("request to {} failed", url), e))?;

        match response.status() {
            StatusCode::NOT_FOUND if self.missing_as_empty => Ok(String::new()),
            StatusCode::NOT_FOUND => Err(FetchError::use_default(format!(
                "{} not found upstream",
                args
            ))),
            status if status.is_success() => response.text().await.map_err(|e| {
                FetchError::with_source(format!("reading body from {} failed", url), e)
            }),
            status => Err(FetchError::new(format!(
                "upstream returned {} for {}",
                status, url
            ))),
        }
    }

    fn default_fetcher(&self) -> Option<&dyn DefaultValueFetcher<str, String>> {
        self.default_value
            .as_ref()
            .map(|_| self as &dyn DefaultValueFetcher<str, String>)
    }
}

#[async_trait]
impl DefaultValueFetcher<str, String> for HttpValueFetcher {
    async fn default_value(&self, _args: &str) -> Result<String, FetchError> {
        self.default_value
            .clone()
            .ok_or_else(|| FetchError::new("no default value configured"))
    }
}
