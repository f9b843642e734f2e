//! Content module - post models, CMS normalization and rich text

pub mod normalize;
mod post;
pub mod rich_text;

pub use normalize::{RawDocument, RawSearchResponse};
pub use post::{Banner, ContentSection, Post, SummaryRecord, TitleIndexEntry};
pub use rich_text::{RichTextBlock, Span, SpanData};
