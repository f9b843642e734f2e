//! Post models normalized from CMS documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rich_text::{self, RichTextBlock};

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Document UID, also the route parameter of the post page
    pub id: String,

    /// First publication date
    pub published_at: Option<DateTime<Utc>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl SummaryRecord {
    /// Create a summary with only an id and a title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            published_at: None,
            title: title.into(),
            subtitle: String::new(),
            author: String::new(),
        }
    }
}

/// One entry of the title index used for previous/next navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleIndexEntry {
    pub id: String,
    pub title: String,
}

impl TitleIndexEntry {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Post banner image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

/// A titled group of rich-text blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSection {
    #[serde(default)]
    pub heading: String,

    #[serde(default)]
    pub body: Vec<RichTextBlock>,
}

impl ContentSection {
    /// Plain text of the body, blocks joined by a space
    pub fn body_text(&self) -> String {
        rich_text::as_text(&self.body)
    }

    /// HTML rendering of the body
    pub fn body_html(&self) -> String {
        rich_text::as_html(&self.body)
    }
}

/// A full post with its content sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Document UID
    pub id: String,

    /// First publication date
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    pub title: String,

    #[serde(default)]
    pub subtitle: String,

    #[serde(default)]
    pub banner: Option<Banner>,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub content: Vec<ContentSection>,
}

impl Post {
    /// Create an empty post
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            published_at: None,
            title: title.into(),
            subtitle: String::new(),
            banner: None,
            author: String::new(),
            content: Vec::new(),
        }
    }

    /// Listing view of this post
    pub fn summary(&self) -> SummaryRecord {
        SummaryRecord {
            id: self.id.clone(),
            published_at: self.published_at,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            author: self.author.clone(),
        }
    }

    /// Title index view of this post
    pub fn index_entry(&self) -> TitleIndexEntry {
        TitleIndexEntry::new(self.id.clone(), self.title.clone())
    }
}
