//! Crawl transport: paced, retrying, cookie-carrying HTTP sessions.
//!
//! A crawl owns one [`ClientFactory`]; each Act gets a fresh
//! [`SessionClient`] from it. Sessions share the [`RateLimiter`] and nothing
//! else.

pub mod cookies;
pub mod error;
pub mod http;
pub mod limiter;

pub use cookies::CookieJar;
pub use error::FetchError;
pub use http::{
    BatchOutcome, ClientFactory, FetchResponse, Fetcher, MIN_USABLE_BODY, SessionClient,
    SessionConfig, SessionFactory,
};
pub use limiter::RateLimiter;
