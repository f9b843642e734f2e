//! spacetraveling: a static blog generator fed by a headless CMS
//!
//! Posts are pulled from a Prismic-compatible API, the listing is walked
//! page by page with an incremental loader, and every post is rendered with
//! its reading time, previous/next links and a comment widget.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod listing;
pub mod server;
pub mod source;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use source::{ContentSource, MemorySource, PrismicClient};

/// The main blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets copied verbatim
    pub static_dir: PathBuf,
    /// Language overrides
    pub languages_dir: PathBuf,
}

impl Blog {
    /// Create a blog from a directory, reading `_config.yml` when present
    /// and applying `PRISMIC_*` environment overrides
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env_overrides();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a blog with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let languages_dir = base_dir.join(&config.languages_dir);

        Self {
            config,
            base_dir,
            public_dir,
            static_dir,
            languages_dir,
        }
    }

    /// The content source: a fixture file when given, the CMS otherwise
    pub fn source(&self, fixture: Option<&Path>) -> Result<Box<dyn ContentSource>> {
        match fixture {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    self.base_dir.join(path)
                };
                tracing::info!("Reading posts from fixture {:?}", path);
                Ok(Box::new(MemorySource::from_fixture(&path)?))
            }
            None => Ok(Box::new(PrismicClient::new(&self.config.api)?)),
        }
    }

    /// Generate the static site
    pub async fn generate(
        &self,
        fixture: Option<&Path>,
    ) -> Result<generator::GenerateReport> {
        commands::generate::run(self, fixture).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
