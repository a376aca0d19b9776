#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SearchError {
    #[error("HTTP client initialization failed: {0}")]
    HttpClientInit(reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API returned HTTP {status}: {message}")]
    Api {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("search API returned malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
