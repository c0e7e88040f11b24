//! Fetcher Module
//!
//! The contract a data source implements to sit behind a
//! [`RefreshingCache`](crate::cache::RefreshingCache).
//!
//! A fetcher always provides [`ValueFetcher`]. The default-value fallback is a
//! separate capability, [`DefaultValueFetcher`], which the cache discovers via
//! [`ValueFetcher::default_fetcher`].

mod http;

pub use http::HttpValueFetcher;

use async_trait::async_trait;

use crate::error::FetchError;

// == Value Fetcher ==
/// Pluggable strategy producing a cache key and a fresh value.
#[async_trait]
pub trait ValueFetcher: Send + Sync {
    /// Request arguments. Fetchers that need a deadline or a cancellation
    /// signal carry it here; the cache imposes none of its own.
    type Args: ?Sized + Sync;
    /// Value produced by a fetch and handed out by the cache.
    type Value: Clone + Send + Sync + 'static;

    /// Derives the cache key. Must be pure: the same logical request
    /// always yields the same key.
    fn key(&self, args: &Self::Args) -> String;

    /// Fetches the value from the source. Return
    /// [`FetchError::use_default`] to ask for the default-value fallback.
    async fn fetch_value(&self, args: &Self::Args) -> Result<Self::Value, FetchError>;

    /// Probes the default-value capability. `None` unless overridden.
    fn default_fetcher(&self) -> Option<&dyn DefaultValueFetcher<Self::Args, Self::Value>> {
        None
    }
}

// == Default Value Fetcher ==
/// Optional fallback consulted when a fetch fails with the use-default signal.
#[async_trait]
pub trait DefaultValueFetcher<A: ?Sized + Sync, T: Send>: Send + Sync {
    async fn default_value(&self, args: &A) -> Result<T, FetchError>;
}
