use lexitalia_crawl::FetchError;
use lexitalia_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed config file: {0}")]
    ConfigFormat(#[from] toml::de::Error),

    #[error("{0} has neither a url nor a urn")]
    MissingLocator(String),

    #[error("cannot resolve {url:?} against {base:?}")]
    BadUrl { base: String, url: String },
}
