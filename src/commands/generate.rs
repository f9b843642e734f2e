//! Generate static files

use anyhow::Result;
use std::path::Path;

use crate::generator::{GenerateReport, Generator};
use crate::Blog;

/// Generate the static site from the CMS, or from a fixture file
pub async fn run(blog: &Blog, fixture: Option<&Path>) -> Result<GenerateReport> {
    let start = std::time::Instant::now();

    let source = blog.source(fixture)?;
    let generator = Generator::new(blog)?;
    let report = generator.generate(source.as_ref()).await?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} listing pages and {} posts in {:.2}s",
        report.listing_pages,
        report.posts_written,
        duration.as_secs_f64()
    );

    Ok(report)
}
