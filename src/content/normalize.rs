//! Normalization of raw CMS search responses into post models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::post::{Banner, ContentSection, Post, SummaryRecord, TitleIndexEntry};
use super::rich_text::RichTextBlock;
use crate::listing::ListPage;

/// A page of search results
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub page: usize,

    #[serde(default)]
    pub total_results_size: usize,

    /// URL of the next page, if any
    #[serde(default)]
    pub next_page: Option<String>,

    #[serde(default)]
    pub results: Vec<RawDocument>,
}

impl RawSearchResponse {
    /// Convert into a listing page
    pub fn into_list_page(self) -> ListPage {
        ListPage {
            next_cursor: self.next_page,
            items: self
                .results
                .into_iter()
                .map(RawDocument::into_summary)
                .collect(),
        }
    }
}

/// A document as returned by the search endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDocument {
    pub id: String,

    #[serde(default)]
    pub uid: Option<String>,

    #[serde(default)]
    pub first_publication_date: Option<String>,

    #[serde(default)]
    pub data: Option<RawPostData>,
}

/// The custom-type fields of a post document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPostData {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub subtitle: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub author: String,

    #[serde(default)]
    pub banner: Option<RawImage>,

    #[serde(default)]
    pub content: Vec<RawContentGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContentGroup {
    #[serde(default, deserialize_with = "lenient_text")]
    pub heading: String,

    #[serde(default)]
    pub body: Vec<RichTextBlock>,
}

impl RawDocument {
    /// The route identifier: the UID, or the document id when no UID is set
    pub fn slug(&self) -> &str {
        self.uid
            .as_deref()
            .filter(|uid| !uid.is_empty())
            .unwrap_or(&self.id)
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.first_publication_date
            .as_deref()
            .and_then(parse_timestamp)
    }

    pub fn into_summary(self) -> SummaryRecord {
        let id = self.slug().to_string();
        let published_at = self.published_at();
        let data = self.data.unwrap_or_default();
        SummaryRecord {
            id,
            published_at,
            title: data.title,
            subtitle: data.subtitle,
            author: data.author,
        }
    }

    pub fn into_index_entry(self) -> TitleIndexEntry {
        let id = self.slug().to_string();
        let title = self.data.map(|d| d.title).unwrap_or_default();
        TitleIndexEntry { id, title }
    }

    pub fn into_post(self) -> Post {
        let id = self.slug().to_string();
        let published_at = self.published_at();
        let data = self.data.unwrap_or_default();

        let banner = data.banner.and_then(|image| {
            image
                .url
                .filter(|url| !url.is_empty())
                .map(|url| Banner {
                    url,
                    alt: image.alt,
                })
        });

        let content = data
            .content
            .into_iter()
            .map(|group| ContentSection {
                heading: group.heading,
                body: group.body,
            })
            .collect();

        Post {
            id,
            published_at,
            title: data.title,
            subtitle: data.subtitle,
            banner,
            author: data.author,
            content,
        }
    }
}

/// Parse a CMS timestamp.
///
/// Accepts RFC 3339 as well as offsets without a colon (`+0000`).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Deserialize a text field, treating anything that is not text as empty.
///
/// Title fields stored as rich text arrays are flattened to their text.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Array(blocks) => blocks
            .iter()
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    })
}
