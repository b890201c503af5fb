//! Session-scoped HTTP client with pacing, retries, and cookies.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header::{COOKIE, SET_COOKIE};
use tracing::{debug, warn};

use crate::cookies::CookieJar;
use crate::error::FetchError;
use crate::limiter::RateLimiter;

/// Non-200 responses shorter than this (bytes) count as failed fetches.
pub const MIN_USABLE_BODY: usize = 256;

/// Request behaviour shared by every session of a crawl.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub user_agent: String,
    pub request_timeout: Duration,
    /// Retries after the first attempt for transport errors and 429/5xx answers.
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("lexitalia/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl SessionConfig {
    /// `backoff_base * 2^attempt`, saturating.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }

    /// Delay before the next try, or `None` once the retry budget is spent.
    fn retry_delay(&self, attempt: u32) -> Option<Duration> {
        (attempt < self.max_retries).then(|| self.backoff(attempt))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl FetchResponse {
    /// First header value with this name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Reject non-200 answers too short to carry a page.
    pub fn into_usable(self, url: &str) -> Result<Self, FetchError> {
        if self.status != 200 && self.body.len() < MIN_USABLE_BODY {
            return Err(FetchError::Unusable {
                url: url.to_string(),
                status: self.status,
                len: self.body.len(),
            });
        }
        Ok(self)
    }
}

/// Per-URL results of a batch. A batch never aborts early.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub successes: Vec<(String, FetchResponse)>,
    pub failures: Vec<(String, FetchError)>,
}

impl BatchOutcome {
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Anything that can GET a page within one crawl session.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;

    /// Fetch `urls` in chunks of `concurrency`, each chunk awaited before the
    /// next. Results keep input order within successes and failures.
    async fn fetch_batch(&self, urls: &[String], concurrency: usize) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for chunk in urls.chunks(concurrency.max(1)) {
            let results = join_all(chunk.iter().map(|url| self.fetch(url))).await;
            for (url, result) in chunk.iter().zip(results) {
                match result.and_then(|resp| resp.into_usable(url)) {
                    Ok(resp) => outcome.successes.push((url.clone(), resp)),
                    Err(e) => {
                        warn!(url = %url, error = %e, "article fetch failed");
                        outcome.failures.push((url.clone(), e));
                    }
                }
            }
        }
        outcome
    }
}

/// Builds a fresh session per Act.
pub trait SessionFactory: Send + Sync {
    type Session: Fetcher;

    fn session(&self) -> Result<Self::Session, FetchError>;
}

/// One crawl session: shared pacing, private cookies.
pub struct SessionClient {
    client: reqwest::Client,
    config: SessionConfig,
    limiter: Arc<RateLimiter>,
    jar: CookieJar,
}

impl SessionClient {
    pub fn new(config: SessionConfig, limiter: Arc<RateLimiter>) -> Result<Self, FetchError> {
        let client = build_client(&config)?;
        Ok(Self::with_client(client, config, limiter))
    }

    fn with_client(client: reqwest::Client, config: SessionConfig, limiter: Arc<RateLimiter>) -> Self {
        Self {
            client,
            config,
            limiter,
            jar: CookieJar::new(),
        }
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.jar
    }
}

#[async_trait]
impl Fetcher for SessionClient {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let target =
            reqwest::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        let mut attempt = 0;
        loop {
            self.limiter.acquire().await;

            let mut request = self.client.get(target.clone());
            if let Some(cookie) = self.jar.header() {
                request = request.header(COOKIE, cookie);
            }
            debug!(url = %url, attempt, "GET");

            let resp = match request.send().await {
                Ok(resp) => resp,
                Err(source) => {
                    let Some(delay) = self.config.retry_delay(attempt) else {
                        return Err(FetchError::Unreachable {
                            url: url.to_string(),
                            attempts: attempt + 1,
                            source,
                        });
                    };
                    warn!(url = %url, error = %source, attempt = attempt + 1, ?delay, "transport error, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
            };

            for value in resp.headers().get_all(SET_COOKIE) {
                if let Ok(value) = value.to_str() {
                    self.jar.store(value);
                }
            }

            let status = resp.status().as_u16();
            if status == 429 || (500..600).contains(&status) {
                let Some(delay) = self.config.retry_delay(attempt) else {
                    return Err(FetchError::RetriesExhausted {
                        url: url.to_string(),
                        status,
                        attempts: attempt + 1,
                    });
                };
                warn!(url = %url, status, attempt = attempt + 1, ?delay, "retryable status, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let headers = resp
                .headers()
                .iter()
                .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
                .collect();
            let body = match resp.text().await {
                Ok(body) => body,
                Err(source) => {
                    let Some(delay) = self.config.retry_delay(attempt) else {
                        return Err(FetchError::Unreachable {
                            url: url.to_string(),
                            attempts: attempt + 1,
                            source,
                        });
                    };
                    warn!(url = %url, error = %source, attempt = attempt + 1, ?delay, "body read failed, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
            };
            debug!(url = %url, status, bytes = body.len(), "response");
            return Ok(FetchResponse {
                status,
                body,
                headers,
            });
        }
    }
}

fn build_client(config: &SessionConfig) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout)
        .build()
        .map_err(FetchError::Client)
}

/// Production factory: one pooled `reqwest::Client` and one [`RateLimiter`]
/// for the whole crawl, a new cookie jar per session.
pub struct ClientFactory {
    client: reqwest::Client,
    config: SessionConfig,
    limiter: Arc<RateLimiter>,
}

impl ClientFactory {
    pub fn new(config: SessionConfig, min_delay: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(&config)?,
            config,
            limiter: Arc::new(RateLimiter::new(min_delay)),
        })
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}

impl SessionFactory for ClientFactory {
    type Session = SessionClient;

    fn session(&self) -> Result<SessionClient, FetchError> {
        Ok(SessionClient::with_client(
            self.client.clone(),
            self.config.clone(),
            Arc::clone(&self.limiter),
        ))
    }
}
