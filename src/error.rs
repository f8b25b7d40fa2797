use thiserror::Error;

/// Everything that can go wrong between issuing a request and handing typed data to a page.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    NotFound { status: u16, url: String },
    #[error("unparseable response from {url}: {source}")]
    BadResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// True when the server answered but had nothing for the request.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    pub fn is_bad_response(&self) -> bool {
        matches!(self, ClientError::BadResponse { .. })
    }
}
