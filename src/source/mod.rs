//! Content sources the site is generated from

mod memory;
mod prismic;

pub use memory::MemorySource;
pub use prismic::PrismicClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::content::{Post, TitleIndexEntry};
use crate::listing::ListPage;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server error: status {status} body {body}")]
    Server { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("the repository has no master ref")]
    MissingMasterRef,
    #[error("API endpoint is not configured (set api.endpoint or PRISMIC_API_ENDPOINT)")]
    MissingEndpoint,
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("failed to read fixture: {0}")]
    Io(#[from] std::io::Error),
}

/// Where posts come from
///
/// Listing pages carry summary fields only; `document` returns the full post.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// First page of the listing, newest first
    async fn first_page(&self, page_size: usize) -> Result<ListPage, SourceError>;

    /// Follow a cursor returned by a previous page
    async fn page_at(&self, cursor: &str) -> Result<ListPage, SourceError>;

    /// A full post by its route identifier
    async fn document(&self, id: &str) -> Result<Post, SourceError>;

    /// Id and title of every post, ordered like the listing
    async fn title_index(&self, page_size: usize) -> Result<Vec<TitleIndexEntry>, SourceError>;
}
