//! Rate-limited outbound HTTP fetcher
//!
//! One fetcher per upstream source. Every caller of that source shares its
//! limits, so no burst of logical requests can exceed the provider's quota:
//! - concurrency ceiling (semaphore)
//! - minimum spacing between dispatches (governor, burst of one)
//! - hard timeout per attempt
//! - fixed-delay retry on HTTP 429 only; other failures surface immediately

use crate::config::{get_user_agent, FetcherConfig};
use crate::{Error, Result};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

/// Anything that can produce the bytes behind a URL
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Fetch the body at `url`
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Source name for logs and errors
    fn source_name(&self) -> &str;
}

/// Fetch `url` and decode the body as JSON
///
/// An undecodable body is reported as an upstream failure.
pub async fn fetch_json<T: DeserializeOwned>(source: &dyn ByteSource, url: &str) -> Result<T> {
    let body = source.fetch(url).await?;
    serde_json::from_slice(&body).map_err(|e| {
        Error::upstream(
            source.source_name(),
            format!("invalid JSON from {}: {}", url, e),
        )
    })
}

/// Outcome of a single attempt that did not fail outright
enum Attempt {
    Body(Vec<u8>),
    RateLimited,
}

/// [`ByteSource`] over HTTP with shared per-source limits
pub struct RateLimitedFetcher {
    source_name: String,
    client: reqwest::Client,
    permits: Semaphore,
    spacing: Option<DefaultDirectRateLimiter>,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl RateLimitedFetcher {
    pub fn new(source_name: impl Into<String>, config: &FetcherConfig) -> Result<Self> {
        let source_name = source_name.into();
        config.validate(&source_name)?;

        let client = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .connect_timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        let spacing = Quota::with_period(Duration::from_millis(config.min_spacing_ms))
            .map(RateLimiter::direct);

        Ok(Self {
            source_name,
            client,
            permits: Semaphore::new(config.max_concurrent),
            spacing,
            timeout: Duration::from_millis(config.timeout_ms),
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// One admission-controlled, timeout-bounded request
    async fn attempt(&self, url: &str) -> Result<Attempt> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::upstream(&self.source_name, "fetcher is shut down"))?;

        if let Some(spacing) = &self.spacing {
            spacing.until_ready().await;
        }

        debug!(source = %self.source_name, url, "Dispatching request");

        let call = async {
            let response = self.client.get(url).send().await.map_err(|e| {
                Error::upstream(&self.source_name, format!("request to {} failed: {}", url, e))
            })?;

            let status = response.status();
            if status.as_u16() == 429 {
                return Ok(Attempt::RateLimited);
            }
            if !status.is_success() {
                return Err(Error::Upstream {
                    source_name: self.source_name.clone(),
                    status: Some(status.as_u16()),
                    message: format!("{} returned {}", url, status),
                });
            }

            let body = response.bytes().await.map_err(|e| {
                Error::upstream(&self.source_name, format!("reading body of {} failed: {}", url, e))
            })?;
            Ok(Attempt::Body(body.to_vec()))
        };

        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                source_name: self.source_name.clone(),
                url: url.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ByteSource for RateLimitedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut retries = 0;

        loop {
            match self.attempt(url).await {
                Ok(Attempt::Body(body)) => return Ok(body),
                Ok(Attempt::RateLimited) if retries < self.max_retries => {
                    retries += 1;
                    warn!(
                        source = %self.source_name,
                        url,
                        attempt = retries,
                        max_retries = self.max_retries,
                        "Rate limited, retrying after {:?}",
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Ok(Attempt::RateLimited) => {
                    error!(source = %self.source_name, url, "Rate limit retries exhausted");
                    return Err(Error::Upstream {
                        source_name: self.source_name.clone(),
                        status: Some(429),
                        message: format!("{} still rate limited after {} retries", url, retries),
                    });
                }
                Err(e) => {
                    warn!(source = %self.source_name, url, error = %e, "Upstream call failed");
                    return Err(e);
                }
            }
        }
    }

    fn source_name(&self) -> &str {
        &self.source_name
    }
}
