use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrdersError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("pagination limit reached for {store_domain}: exceeded {max_pages} pages")]
    PaginationLimit {
        store_domain: String,
        max_pages: usize,
    },

    #[error("missing credentials: {what}")]
    MissingCredentials { what: &'static str },
}
