use std::time::Duration;

use reqwest::Url;

use crate::error::SearchError;

const ERROR_BODY_MAX_BYTES: usize = 512;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin handle over the catalog's search endpoint. Cloning is cheap: the
/// underlying `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct BookClient {
    pub(crate) http: reqwest::Client,
    pub(crate) endpoint: Url,
}

impl BookClient {
    pub fn new(endpoint: Url) -> Result<Self, SearchError> {
        // No overall request timeout: a slow search stays in flight until it
        // resolves and is then either applied or discarded as stale.
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("book-search/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SearchError::HttpClientInit)?;

        Ok(Self { http, endpoint })
    }

    /// Browser URL for a catalog key such as `/works/OL45804W`, resolved
    /// against the origin of the search endpoint.
    pub fn work_url(&self, key: &str) -> Option<Url> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let path = if key.starts_with('/') {
            key.to_string()
        } else {
            format!("/{key}")
        };
        self.endpoint.join(&path).ok()
    }
}

/// Collapse a response body into a single short line for error messages.
pub(crate) fn body_excerpt(bytes: &[u8]) -> String {
    let full = String::from_utf8_lossy(bytes);

    let truncated: &str = if full.len() > ERROR_BODY_MAX_BYTES {
        let mut end = ERROR_BODY_MAX_BYTES;
        while end > 0 && !full.is_char_boundary(end) {
            end -= 1;
        }
        &full[..end]
    } else {
        full.as_ref()
    };

    let mut s = truncated.trim().replace(['\n', '\r', '\t'], " ");
    if full.len() > ERROR_BODY_MAX_BYTES {
        s.push_str(" …");
    }
    s
}
