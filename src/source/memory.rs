//! In-memory content source for offline builds and tests

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use super::{ContentSource, SourceError};
use crate::content::{Post, RawDocument, TitleIndexEntry};
use crate::listing::ListPage;

/// A fixture file: either a bare array of documents or a saved search
/// response with a `results` field
#[derive(Deserialize)]
#[serde(untagged)]
enum Fixture {
    Documents(Vec<RawDocument>),
    Search { results: Vec<RawDocument> },
}

/// Posts held in memory, ordered newest first
///
/// Cursors have the form `<offset>:<page size>`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    posts: Vec<Post>,
}

impl MemorySource {
    pub fn new(mut posts: Vec<Post>) -> Self {
        posts.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.title.cmp(&b.title))
        });
        Self { posts }
    }

    /// Load raw CMS documents from a JSON file
    pub fn from_fixture<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let documents = match serde_json::from_str::<Fixture>(json)? {
            Fixture::Documents(docs) | Fixture::Search { results: docs } => docs,
        };
        tracing::debug!("Loaded {} fixture documents", documents.len());
        Ok(Self::new(documents.into_iter().map(RawDocument::into_post).collect()))
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    fn page(&self, offset: usize, page_size: usize) -> ListPage {
        let page_size = page_size.max(1);
        let end = offset.saturating_add(page_size).min(self.posts.len());
        let items = self
            .posts
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(Post::summary)
            .collect();
        let next_cursor = (end < self.posts.len()).then(|| format!("{}:{}", end, page_size));
        ListPage::new(items, next_cursor)
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn first_page(&self, page_size: usize) -> Result<ListPage, SourceError> {
        Ok(self.page(0, page_size))
    }

    async fn page_at(&self, cursor: &str) -> Result<ListPage, SourceError> {
        let invalid = || SourceError::InvalidCursor(cursor.to_string());
        let (offset, size) = cursor.split_once(':').ok_or_else(invalid)?;
        let offset = offset.parse().map_err(|_| invalid())?;
        let size = size.parse().map_err(|_| invalid())?;
        Ok(self.page(offset, size))
    }

    async fn document(&self, id: &str) -> Result<Post, SourceError> {
        self.posts
            .iter()
            .find(|post| post.id == id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }

    async fn title_index(&self, page_size: usize) -> Result<Vec<TitleIndexEntry>, SourceError> {
        if self.posts.len() > page_size {
            tracing::warn!(
                "Title index truncated: {} of {} posts fetched; raise api.index_page_size",
                page_size,
                self.posts.len()
            );
        }
        Ok(self
            .posts
            .iter()
            .take(page_size)
            .map(Post::index_entry)
            .collect())
    }
}
