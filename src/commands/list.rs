//! List posts from the content source

use anyhow::Result;
use std::collections::HashSet;
use std::io::Write;

use crate::generator::{group_by_page, load_next_page};
use crate::helpers::format_published;
use crate::i18n::I18n;
use crate::listing::{ListState, PaginatedListLoader};
use crate::source::ContentSource;
use crate::Blog;

/// Print the first listing page, or every page when `all` is set
pub async fn run(blog: &Blog, source: &dyn ContentSource, all: bool) -> Result<()> {
    let state = load(blog, source, all).await?;
    write_listing(blog, &state, &mut std::io::stdout().lock())
}

/// Load the first page, then keep loading while `all` is set
async fn load(blog: &Blog, source: &dyn ContentSource, all: bool) -> Result<ListState> {
    let loader = PaginatedListLoader::new(source.first_page(blog.config.api.page_size).await?);

    if all {
        let mut followed = HashSet::new();
        while load_next_page(&loader, source, &mut followed)
            .await?
            .is_some()
        {}
    }

    Ok(loader.snapshot())
}

fn write_listing<W: Write>(blog: &Blog, state: &ListState, out: &mut W) -> Result<()> {
    let i18n = I18n::new(&blog.config.language);
    let tz = blog.config.tz();

    writeln!(out, "Posts ({}):", state.len())?;
    for (page, records) in group_by_page(state, blog.config.api.page_size) {
        writeln!(out, "Page {}:", page)?;
        for record in records {
            let date = format_published(record.published_at, tz, "YYYY-MM-DD", &i18n);
            writeln!(out, "  {} - {} [{}]", date, record.title, record.id)?;
        }
    }
    if state.has_more() {
        writeln!(out, "More posts available (use --all)")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::Post;
    use crate::source::MemorySource;
    use chrono::{TimeZone, Utc};

    fn source() -> MemorySource {
        let posts = (1..=3)
            .map(|day| {
                let mut post = Post::new(format!("post-{}", day), format!("Post {}", day));
                post.published_at = Some(Utc.with_ymd_and_hms(2021, 3, day, 15, 0, 0).unwrap());
                post
            })
            .collect();
        MemorySource::new(posts)
    }

    fn blog() -> Blog {
        let mut config = SiteConfig::default();
        config.api.page_size = 2;
        Blog::with_config(".", config)
    }

    #[tokio::test]
    async fn test_list_first_page() {
        let blog = blog();
        let state = load(&blog, &source(), false).await.unwrap();
        let mut out = Vec::new();
        write_listing(&blog, &state, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with("Posts (2):\nPage 1:\n"));
        assert!(out.contains("  2021-03-03 - Post 3 [post-3]"));
        assert!(!out.contains("post-1"));
        assert!(out.contains("use --all"));
    }

    #[tokio::test]
    async fn test_list_all_pages() {
        let blog = blog();
        let state = load(&blog, &source(), true).await.unwrap();
        let mut out = Vec::new();
        write_listing(&blog, &state, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("Posts (3):"));
        assert!(out.contains("Page 2:\n  2021-03-01 - Post 1 [post-1]"));
        assert!(!out.contains("use --all"));
    }
}
