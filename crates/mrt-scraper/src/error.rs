use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// `retry_after_secs` is the server's `Retry-After` in seconds, when sent.
    #[error("rate limited by {url}")]
    RateLimited {
        url: String,
        retry_after_secs: Option<u64>,
    },

    #[error("anti-bot proxy failed for {url}: {reason}")]
    ProtectionBypass { url: String, reason: String },

    #[error("failed to parse {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("required field \"{field}\" missing on {url}")]
    MissingField { url: String, field: &'static str },

    #[error("pagination limit reached for {url}: exceeded {max_pages} pages")]
    PaginationLimit { url: String, max_pages: usize },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid rule for site {site}: {reason}")]
    InvalidRule { site: String, reason: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to persist record {url}: {reason}")]
    Persist { url: String, reason: String },
}

impl ScraperError {
    /// Classifies a `reqwest` failure for `url`, splitting timeouts out of
    /// general transport errors.
    pub(crate) fn from_request(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_owned(),
            }
        } else {
            Self::Transport(err)
        }
    }
}
