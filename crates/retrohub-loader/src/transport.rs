//! HTTP transport for archive and module downloads
//!
//! One GET per call, no retries: a failed download is terminal for the
//! attempt and the caller decides whether to try again.

use crate::config::HttpConfig;
use crate::error::FetchError;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;

/// Shared HTTP client
#[derive(Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Build a client from the transport configuration
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        // reqwest is built without a bundled crypto provider
        let _ = rustls::crypto::ring::default_provider().install_default();

        let mut builder = ClientBuilder::new()
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.clone());

        if config.enable_compression {
            builder = builder.gzip(true).brotli(true).deflate(true);
        }

        Ok(Self {
            client: Arc::new(builder.build()?),
        })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Download `url` into memory, refusing bodies larger than `limit` bytes
    pub async fn get_bytes(&self, url: &str, limit: u64) -> Result<Bytes, FetchError> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let declared = response.content_length();
        if let Some(size) = declared
            && size > limit
        {
            return Err(FetchError::TooLarge { size, limit });
        }

        let mut body = BytesMut::with_capacity(declared.unwrap_or(0) as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let size = (body.len() + chunk.len()) as u64;
            if size > limit {
                return Err(FetchError::TooLarge { size, limit });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body.freeze())
    }
}
