use crate::repository::LinkRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// The outcome of a shorten request, as handed to the routing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: ShortCode,
    /// The normalized URL stored under `short_code`.
    pub original_url: String,
    /// `base_url/short_code`.
    pub short_url: String,
}

/// Statistics for a single link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    pub short_code: ShortCode,
    pub original_url: String,
    pub clicks: u64,
    pub created_at: Timestamp,
}

impl LinkStats {
    pub fn new(short_code: ShortCode, record: &LinkRecord) -> Self {
        Self {
            short_code,
            original_url: record.original_url.clone(),
            clicks: record.clicks,
            created_at: record.created_at,
        }
    }
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Shortens `url`, returning the existing code if the normalized URL
    /// has been shortened before.
    async fn shorten(&self, url: &str) -> Result<ShortenResponse>;

    /// Counts one visit of `code` and returns the updated record, whose
    /// `original_url` is the redirect target.
    async fn resolve(&self, code: &str) -> Result<LinkRecord>;

    /// Returns the statistics of `code` without counting a visit.
    async fn stats(&self, code: &str) -> Result<LinkStats>;
}
