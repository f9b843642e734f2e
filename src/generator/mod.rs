//! Generator module - fetches posts from a content source and writes the
//! static site using the built-in Tera templates

use anyhow::{Context as _, Result};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::content::{Post, SummaryRecord};
use crate::helpers::{
    comments_widget, css, date_xml, encode_url, estimate_with_rate, format_published, full_url_for,
    html_escape, listing_path, post_path, url_for,
};
use crate::i18n::I18n;
use crate::listing::{resolve_adjacent, Adjacent, AdjacencyError, ListState, PaginatedListLoader};
use crate::source::{ContentSource, SourceError};
use crate::templates::{
    BannerData, ConfigData, ListingData, NavPost, PostPageData, SectionData, SummaryData,
    TemplateRenderer, STYLESHEET,
};
use crate::Blog;

/// What a generation run produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub listing_pages: usize,
    pub posts_written: usize,
    pub posts_skipped: usize,
}

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    i18n: I18n,
    tz: chrono_tz::Tz,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;

        let mut i18n = I18n::new(&blog.config.language);
        i18n.load_languages(&blog.languages_dir)?;

        Ok(Self {
            blog: blog.clone(),
            renderer,
            i18n,
            tz: blog.config.tz(),
        })
    }

    /// Generate the entire site
    pub async fn generate(&self, source: &dyn ContentSource) -> Result<GenerateReport> {
        fs::create_dir_all(&self.blog.public_dir)?;

        self.write_stylesheet()?;
        self.copy_static_assets()?;

        let listing_pages = self.generate_listing_pages(source).await?;
        let (posts_written, posts_skipped) = self.generate_post_pages(source).await?;

        Ok(GenerateReport {
            listing_pages,
            posts_written,
            posts_skipped,
        })
    }

    /// Build config data for templates
    fn build_config_data(&self) -> ConfigData {
        let config = &self.blog.config;
        ConfigData {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root: config.root.clone(),
        }
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let config = &self.blog.config;
        let mut context = Context::new();
        context.insert("config", &self.build_config_data());
        context.insert("t", &self.i18n.get_all_translations());
        context.insert("home_path", &url_for(config, "/"));
        context.insert("stylesheet", &css(config, "style.css"));
        context.insert("description", &config.description);
        context
    }

    /// Walk the listing one page at a time, writing each accumulated list.
    ///
    /// Page 1 is `index.html`; page N holds everything loaded after N
    /// fetches and lives at `page/N/index.html`.
    async fn generate_listing_pages(&self, source: &dyn ContentSource) -> Result<usize> {
        let page_size = self.blog.config.api.page_size;
        let first = source
            .first_page(page_size)
            .await
            .context("Failed to fetch the first listing page")?;
        let loader = PaginatedListLoader::new(first);

        let mut page = 1;
        self.write_listing_page(page, &loader.snapshot())?;

        let mut followed = HashSet::new();
        while let Some(state) = load_next_page(&loader, source, &mut followed)
            .await
            .with_context(|| format!("Failed to load listing page {}", page + 1))?
        {
            page += 1;
            self.write_listing_page(page, &state)?;
        }

        let keep: HashSet<String> = (2..=page).map(|n| n.to_string()).collect();
        prune_stale_dirs(&self.blog.public_dir.join("page"), &keep)?;

        tracing::info!(
            "Generated {} listing pages with {} posts",
            page,
            loader.len()
        );
        Ok(page)
    }

    fn write_listing_page(&self, page: usize, state: &ListState) -> Result<()> {
        let config = &self.blog.config;
        let items = state
            .items()
            .iter()
            .map(|record| self.summary_data(record))
            .collect();

        let listing = ListingData {
            page,
            items,
            next_path: state
                .has_more()
                .then(|| url_for(config, &listing_path(page + 1))),
        };

        let mut context = self.create_base_context();
        context.insert("canonical", &full_url_for(config, &listing_path(page)));
        context.insert("listing", &listing);

        let html = self.renderer.render("index.html", &context)?;
        let output_path = self
            .blog
            .public_dir
            .join(listing_path(page))
            .join("index.html");
        write_file(&output_path, &html)?;
        tracing::debug!("Generated: {:?}", output_path);

        Ok(())
    }

    fn summary_data(&self, record: &SummaryRecord) -> SummaryData {
        let config = &self.blog.config;
        SummaryData {
            id: record.id.clone(),
            path: url_for(config, &post_path(&record.id)),
            title: record.title.clone(),
            subtitle: record.subtitle.clone(),
            author: record.author.clone(),
            date: format_published(record.published_at, self.tz, &config.date_format, &self.i18n),
            datetime: self.machine_date(record.published_at),
        }
    }

    /// `datetime` attribute value in the site timezone
    fn machine_date(&self, date: Option<chrono::DateTime<chrono::Utc>>) -> String {
        date.map(|d| date_xml(&d.with_timezone(&self.tz)))
            .unwrap_or_default()
    }

    /// Generate one page per entry of the title index.
    ///
    /// Returns the number of posts written and skipped.
    async fn generate_post_pages(&self, source: &dyn ContentSource) -> Result<(usize, usize)> {
        let index = source
            .title_index(self.blog.config.api.index_page_size)
            .await
            .context("Failed to fetch the title index")?;

        let mut written = 0;
        let mut skipped = 0;
        // Post directories that stay in public/post; a transient failure
        // keeps the page from the previous run
        let mut keep = HashSet::new();

        for entry in &index {
            let post = match source.document(&entry.id).await {
                Ok(post) => post,
                Err(SourceError::NotFound(id)) => {
                    tracing::warn!("Skipping {}: document not found", id);
                    skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", entry.id, e);
                    keep.insert(encode_url(&entry.id));
                    skipped += 1;
                    continue;
                }
            };

            let adjacent = match resolve_adjacent(&index, &post.id) {
                Ok(adjacent) => adjacent,
                Err(AdjacencyError::NotFound(id)) => {
                    tracing::warn!("{} is missing from the title index, no prev/next links", id);
                    Adjacent::none()
                }
            };

            self.write_post_page(&post, adjacent)?;
            keep.insert(encode_url(&post.id));
            written += 1;
        }

        prune_stale_dirs(&self.blog.public_dir.join("post"), &keep)?;

        tracing::info!("Generated {} posts ({} skipped)", written, skipped);
        Ok((written, skipped))
    }

    fn write_post_page(&self, post: &Post, adjacent: Adjacent<'_>) -> Result<()> {
        let config = &self.blog.config;
        let nav = |entry: &crate::content::TitleIndexEntry| NavPost {
            title: entry.title.clone(),
            path: url_for(config, &post_path(&entry.id)),
        };

        let data = PostPageData {
            id: post.id.clone(),
            path: url_for(config, &post_path(&post.id)),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: format_published(post.published_at, self.tz, &config.date_format, &self.i18n),
            datetime: self.machine_date(post.published_at),
            banner: post.banner.as_ref().map(|banner| BannerData {
                url: html_escape(&banner.url),
                alt: html_escape(banner.alt.as_deref().unwrap_or("Banner")),
            }),
            reading_time: estimate_with_rate(&post.content, config.reading.words_per_minute),
            sections: post
                .content
                .iter()
                .map(|section| SectionData {
                    heading: section.heading.clone(),
                    html: section.body_html(),
                })
                .collect(),
            // Prev is the newer post, next the older one, as in the index order
            prev: adjacent.prev.map(nav),
            next: adjacent.next.map(nav),
            comments: comments_widget(&config.comments),
        };

        let mut context = self.create_base_context();
        context.insert("canonical", &full_url_for(config, &post_path(&post.id)));
        if !post.subtitle.is_empty() {
            context.insert("description", &post.subtitle);
        }
        context.insert("post", &data);

        let html = self.renderer.render("post.html", &context)?;
        let output_path = self
            .blog
            .public_dir
            .join(post_path(&post.id))
            .join("index.html");
        write_file(&output_path, &html)?;
        tracing::debug!("Generated post: {:?}", output_path);

        Ok(())
    }

    fn write_stylesheet(&self) -> Result<()> {
        let output_path = self.blog.public_dir.join("css").join("style.css");
        write_file(&output_path, STYLESHEET)
    }

    /// Copy static assets (images, etc.) to public directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        tracing::debug!("Copied {} static files", copied);
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(path, contents).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))
}

/// Remove the subdirectories of `dir` left by an earlier run whose names are
/// not in `keep`. Returns how many were removed.
fn prune_stale_dirs(dir: &Path, keep: &HashSet<String>) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !keep.contains(&name) {
            fs::remove_dir_all(entry.path())
                .with_context(|| format!("Failed to remove stale {:?}", entry.path()))?;
            tracing::debug!("Removed stale page {:?}", entry.path());
            removed += 1;
        }
    }

    if removed > 0 {
        tracing::info!("Removed {} stale pages from {:?}", removed, dir);
    }
    Ok(removed)
}

/// Load the page after the loader's current cursor.
///
/// Returns `None` once the listing is exhausted. `followed` holds every cursor
/// already requested during this walk; a cursor that comes back means the
/// API is cycling and the walk would never end, so it is an error.
pub async fn load_next_page(
    loader: &PaginatedListLoader,
    source: &dyn ContentSource,
    followed: &mut HashSet<String>,
) -> Result<Option<ListState>> {
    let before = loader.snapshot();
    let Some(cursor) = before.cursor() else {
        return Ok(None);
    };

    if !followed.insert(cursor.to_string()) {
        anyhow::bail!(
            "Listing pagination stalled: cursor {:?} was already followed ({} posts loaded)",
            cursor,
            before.len()
        );
    }

    let next = loader
        .load_next(|cursor| async move { source.page_at(&cursor).await })
        .await?;
    Ok(Some(next))
}

/// Posts per listing page, keyed by page number
pub fn group_by_page(state: &ListState, page_size: usize) -> BTreeMap<usize, Vec<&SummaryRecord>> {
    let page_size = page_size.max(1);
    let mut pages: BTreeMap<usize, Vec<&SummaryRecord>> = BTreeMap::new();
    for (i, record) in state.items().iter().enumerate() {
        pages.entry(i / page_size + 1).or_default().push(record);
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::{Banner, ContentSection, RichTextBlock, SummaryRecord, TitleIndexEntry};
    use crate::listing::ListPage;
    use crate::source::MemorySource;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    fn blog(dir: &Path) -> Blog {
        let mut config = SiteConfig::default();
        config.api.page_size = 2;
        config.comments.repo = "owner/comments".to_string();
        Blog::with_config(dir, config)
    }

    fn post(id: &str, day: u32, words: usize) -> Post {
        let mut post = Post::new(id, format!("Title {}", id));
        post.published_at = Some(Utc.with_ymd_and_hms(2021, 3, day, 15, 0, 0).unwrap());
        post.author = "Ana".to_string();
        post.banner = Some(Banner {
            url: format!("https://images.example.com/{}.png", id),
            alt: None,
        });
        post.content = vec![ContentSection {
            heading: "Heading".to_string(),
            body: vec![RichTextBlock::paragraph(vec!["word"; words].join(" "))],
        }];
        post
    }

    fn read(dir: &Path, path: &str) -> String {
        fs::read_to_string(dir.join("public").join(path)).unwrap()
    }

    #[tokio::test]
    async fn test_generate_site_from_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blog = blog(dir.path());
        let source = MemorySource::new(vec![post("a", 1, 10), post("b", 2, 450), post("c", 3, 10)]);

        let report = Generator::new(&blog)
            .unwrap()
            .generate(&source)
            .await
            .unwrap();

        assert_eq!(
            report,
            GenerateReport {
                listing_pages: 2,
                posts_written: 3,
                posts_skipped: 0,
            }
        );

        let index = read(dir.path(), "index.html");
        assert!(index.contains("/post/c/"));
        assert!(index.contains("/post/b/"));
        assert!(!index.contains("/post/a/"));
        assert!(index.contains(r#"href="/page/2/""#));

        let page2 = read(dir.path(), "page/2/index.html");
        assert!(page2.contains("/post/c/") && page2.contains("/post/a/"));
        assert!(!page2.contains("load-more"));

        // 1 heading word + 450 body words at 200 wpm
        let middle = read(dir.path(), "post/b/index.html");
        assert!(middle.contains("3 min"));
        assert!(middle.contains("02 mar 2021"));
        assert!(middle.contains(r#"<a href="/post/c/">"#));
        assert!(middle.contains(r#"<a href="/post/a/">"#));
        assert!(middle.contains(r#"repo="owner/comments""#));

        assert!(dir.path().join("public/css/style.css").exists());
    }

    /// Serves the same page forever
    struct StuckSource;

    #[async_trait]
    impl ContentSource for StuckSource {
        async fn first_page(&self, _page_size: usize) -> Result<ListPage, SourceError> {
            Ok(ListPage::new(
                vec![SummaryRecord::new("a", "A")],
                Some("again".to_string()),
            ))
        }

        async fn page_at(&self, cursor: &str) -> Result<ListPage, SourceError> {
            Ok(ListPage::new(
                vec![SummaryRecord::new("a", "A")],
                Some(cursor.to_string()),
            ))
        }

        async fn document(&self, id: &str) -> Result<Post, SourceError> {
            Err(SourceError::NotFound(id.to_string()))
        }

        async fn title_index(&self, _page_size: usize) -> Result<Vec<TitleIndexEntry>, SourceError> {
            Ok(vec![TitleIndexEntry::new("a", "A")])
        }
    }

    #[tokio::test]
    async fn test_stalled_pagination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Generator::new(&blog(dir.path())).unwrap();

        let err = generator.generate(&StuckSource).await.unwrap_err();
        assert!(format!("{:#}", err).contains("stalled"));
    }

    /// Hands out cursors "A" and "B" in turn, always with the same post
    struct CyclingSource;

    #[async_trait]
    impl ContentSource for CyclingSource {
        async fn first_page(&self, _page_size: usize) -> Result<ListPage, SourceError> {
            Ok(ListPage::new(
                vec![SummaryRecord::new("a", "A")],
                Some("A".to_string()),
            ))
        }

        async fn page_at(&self, cursor: &str) -> Result<ListPage, SourceError> {
            let next = if cursor == "A" { "B" } else { "A" };
            Ok(ListPage::new(
                vec![SummaryRecord::new("a", "A")],
                Some(next.to_string()),
            ))
        }

        async fn document(&self, id: &str) -> Result<Post, SourceError> {
            Err(SourceError::NotFound(id.to_string()))
        }

        async fn title_index(&self, _page_size: usize) -> Result<Vec<TitleIndexEntry>, SourceError> {
            Ok(vec![TitleIndexEntry::new("a", "A")])
        }
    }

    #[tokio::test]
    async fn test_cycling_cursors_end_the_walk() {
        let source = CyclingSource;
        let loader = PaginatedListLoader::new(source.first_page(1).await.unwrap());
        let mut followed = HashSet::new();

        let mut steps = 0;
        let err = loop {
            match load_next_page(&loader, &source, &mut followed).await {
                Ok(Some(_)) => steps += 1,
                Ok(None) => panic!("cycling listing reported as exhausted"),
                Err(err) => break err,
            }
            assert!(steps < 10, "walk did not stop");
        };

        // A and B are each followed once, then A comes back
        assert_eq!(steps, 2);
        assert!(err.to_string().contains("stalled"));
        assert_eq!(loader.len(), 1);
        assert!(!loader.is_loading());
    }

    #[tokio::test]
    async fn test_cycling_cursors_fail_generation() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Generator::new(&blog(dir.path())).unwrap();

        let err = generator.generate(&CyclingSource).await.unwrap_err();
        assert!(format!("{:#}", err).contains("stalled"));
    }

    #[tokio::test]
    async fn test_walk_ends_when_listing_is_exhausted() {
        let source = MemorySource::new(vec![post("a", 1, 1), post("b", 2, 1), post("c", 3, 1)]);
        let loader = PaginatedListLoader::new(source.first_page(1).await.unwrap());
        let mut followed = HashSet::new();

        while load_next_page(&loader, &source, &mut followed)
            .await
            .unwrap()
            .is_some()
        {}

        assert_eq!(loader.len(), 3);
        assert_eq!(followed.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_documents_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Generator::new(&blog(dir.path())).unwrap();

        let (written, skipped) = generator.generate_post_pages(&StuckSource).await.unwrap();
        assert_eq!((written, skipped), (0, 1));
    }

    #[tokio::test]
    async fn test_regeneration_removes_stale_pages() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Generator::new(&blog(dir.path())).unwrap();

        let before = MemorySource::new(vec![post("a", 1, 1), post("b", 2, 1), post("c", 3, 1)]);
        let report = generator.generate(&before).await.unwrap();
        assert_eq!(report.listing_pages, 2);
        assert!(dir.path().join("public/post/a/index.html").exists());

        // "a" was deleted upstream
        let after = MemorySource::new(vec![post("b", 2, 1), post("c", 3, 1)]);
        let report = generator.generate(&after).await.unwrap();
        assert_eq!(report.listing_pages, 1);

        assert!(!dir.path().join("public/post/a").exists());
        assert!(dir.path().join("public/post/b/index.html").exists());
        assert!(!dir.path().join("public/page/2").exists());
        assert!(dir.path().join("public/css/style.css").exists());
    }

    #[test]
    fn test_prune_keeps_listed_dirs_and_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("keep")).unwrap();
        fs::create_dir_all(dir.path().join("stale")).unwrap();
        fs::write(dir.path().join("note.txt"), "x").unwrap();

        let keep: HashSet<String> = ["keep".to_string()].into_iter().collect();
        assert_eq!(prune_stale_dirs(dir.path(), &keep).unwrap(), 1);
        assert!(dir.path().join("keep").exists());
        assert!(!dir.path().join("stale").exists());
        assert!(dir.path().join("note.txt").exists());

        assert_eq!(prune_stale_dirs(&dir.path().join("missing"), &keep).unwrap(), 0);
    }

    #[test]
    fn test_group_by_page() {
        let state = ListState::initialize(ListPage::new(
            vec![
                SummaryRecord::new("a", "A"),
                SummaryRecord::new("b", "B"),
                SummaryRecord::new("c", "C"),
            ],
            None,
        ));
        let pages = group_by_page(&state, 2);
        assert_eq!(pages[&1].len(), 2);
        assert_eq!(pages[&2][0].id, "c");
    }
}
