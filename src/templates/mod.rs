//! Built-in theme templates using the Tera template engine
//!
//! Templates and the stylesheet are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

/// The theme stylesheet, written to `css/style.css`
pub const STYLESHEET: &str = include_str!("theme/style.css");

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all theme templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Rich text arrives as rendered HTML; plain fields are escaped in
        // the templates themselves
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/post_meta.html",
                include_str!("theme/partials/post_meta.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub url: String,
    pub root: String,
}

/// A post as shown in the listing
#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub id: String,
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub datetime: String,
}

/// One accumulated listing page
#[derive(Debug, Clone, Serialize)]
pub struct ListingData {
    pub page: usize,
    pub items: Vec<SummaryData>,
    /// Link to the next, longer listing page while more posts exist
    pub next_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}

/// Banner image; both fields are already attribute-escaped
#[derive(Debug, Clone, Serialize)]
pub struct BannerData {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: String,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub id: String,
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub datetime: String,
    pub banner: Option<BannerData>,
    pub reading_time: u32,
    pub sections: Vec<SectionData>,
    pub prev: Option<NavPost>,
    pub next: Option<NavPost>,
    /// Rendered comment widget, empty when disabled
    pub comments: String,
}
