use reqwest::StatusCode;
use thiserror::Error;

/// Failure to obtain the ranked album list. Always fatal for a run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Top albums request failed with HTTP status {status}{}", describe(.message))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("API error ({code}): {message}")]
    Api { code: i32, message: String },
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

fn describe(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|message| format!(": {}", message))
        .unwrap_or_default()
}

/// Failure to obtain the cover of a single album. The tile stays blank.
#[derive(Debug, Error)]
pub enum ImageFetchError {
    #[error("Album has no cover image")]
    MissingUrl,
    #[error("Error fetching image from {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Error fetching image from {url}: HTTP status {status}")]
    Status { url: String, status: StatusCode },
    #[error("Error decoding image from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },
    #[error("Image from {url} resized to {actual:?} instead of {expected:?}")]
    UnexpectedSize {
        url: String,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}
