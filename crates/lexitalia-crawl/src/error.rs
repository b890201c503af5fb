use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed after {attempts} attempts: {source}")]
    Unreachable {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} still returned {status} after {attempts} attempts")]
    RetriesExhausted { url: String, status: u16, attempts: u32 },
    #[error("{url} returned {status} with an unusable {len}-byte body")]
    Unusable { url: String, status: u16, len: usize },
    #[error("invalid URL {0:?}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Final HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RetriesExhausted { status, .. } | Self::Unusable { status, .. } => Some(*status),
            _ => None,
        }
    }
}
