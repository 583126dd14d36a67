//! HTTP transport for tile fetching.

use std::path::PathBuf;

use bytes::Bytes;
use http_cache_reqwest::{CACacheManager, Cache, CacheMode, HttpCache, HttpCacheOptions};
use reqwest::header::USER_AGENT;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};

pub use reqwest::header::HeaderValue;

use crate::io::Fetch;
use crate::mercator::TileId;
use crate::sources::TileSource;

/// Controls how [`crate::HttpTiles`] use the HTTP protocol, such as caching.
pub struct HttpOptions {
    /// Path to the directory to store the HTTP cache.
    ///
    /// Keep in mind that some providers (such as OpenStreetMap) require clients
    /// to respect the HTTP `Expires` header.
    /// <https://operations.osmfoundation.org/policies/tiles/>
    pub cache: Option<PathBuf>,

    /// User agent to be sent to the tile servers. Most public servers reject requests without
    /// one.
    pub user_agent: Option<HeaderValue>,

    /// Maximum number of parallel downloads.
    ///
    /// Many services have rate limits, and exceeding them may result in throttling, bans, or
    /// degraded service. Use the default value when in doubt.
    pub max_parallel_downloads: MaxParallelDownloads,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            cache: None,
            user_agent: Some(HeaderValue::from_static(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION"),
            ))),
            max_parallel_downloads: MaxParallelDownloads::default(),
        }
    }
}

/// Maximum number of parallel downloads.
pub struct MaxParallelDownloads(pub usize);

impl Default for MaxParallelDownloads {
    /// Default number of parallel downloads. Following modern browsers' behavior.
    /// <https://stackoverflow.com/questions/985431/max-parallel-http-connections-in-a-browser>
    fn default() -> Self {
        Self(6)
    }
}

impl MaxParallelDownloads {
    /// Use custom value.
    ///
    /// Many services have rate limits, and exceeding them may result in throttling, bans, or
    /// degraded service. You are **strongly encouraged** to check the Terms of Use of the
    /// particular provider you are using.
    pub fn value_manually_confirmed_with_provider_limits(value: usize) -> Self {
        Self(value)
    }
}

fn http_client(cache: Option<PathBuf>) -> ClientWithMiddleware {
    let builder = ClientBuilder::new(reqwest::Client::new());

    if let Some(path) = cache {
        builder
            .with(Cache(HttpCache {
                mode: CacheMode::Default,
                manager: CACacheManager::new(path, false),
                options: HttpCacheOptions::default(),
            }))
            .build()
    } else {
        builder.build()
    }
}

/// [`Fetch`] implementation downloading tiles from a [`TileSource`] over HTTP.
pub(crate) struct HttpFetch<S> {
    source: S,
    client: ClientWithMiddleware,
    user_agent: Option<HeaderValue>,
    max_parallel_downloads: usize,
}

impl<S> HttpFetch<S> {
    pub fn new(source: S, options: HttpOptions) -> Self {
        Self {
            source,
            client: http_client(options.cache),
            user_agent: options.user_agent,
            max_parallel_downloads: options.max_parallel_downloads.0,
        }
    }
}

impl<S> Fetch for HttpFetch<S>
where
    S: TileSource + Send + Sync,
{
    type Error = reqwest_middleware::Error;

    async fn fetch(&self, tile_id: TileId) -> Result<Bytes, Self::Error> {
        let url = self.source.tile_url(tile_id);
        log::trace!("Getting {tile_id:?} from {url}.");

        let mut request = self.client.get(&url);
        if let Some(user_agent) = &self.user_agent {
            request = request.header(USER_AGENT, user_agent.to_owned());
        }

        let response = request.send().await?;
        log::trace!("Downloaded {:?}.", response.status());

        let bytes = response
            .error_for_status()
            .map_err(reqwest_middleware::Error::Reqwest)?
            .bytes()
            .await
            .map_err(reqwest_middleware::Error::Reqwest)?;

        Ok(bytes)
    }

    fn max_concurrency(&self) -> usize {
        self.max_parallel_downloads
    }
}
