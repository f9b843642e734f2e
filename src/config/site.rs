//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding `api.endpoint`
pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";

/// Environment variable overriding `api.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,
    pub date_format: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,
    pub languages_dir: String,

    /// Seconds between regenerations while serving
    pub revalidate: u64,

    pub api: ApiConfig,
    pub reading: ReadingConfig,
    pub comments: CommentsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            date_format: "DD MMM YYYY".to_string(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            languages_dir: "languages".to_string(),

            revalidate: 60 * 30,

            api: ApiConfig::default(),
            reading: ReadingConfig::default(),
            comments: CommentsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `PRISMIC_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!("API endpoint taken from {}", ENDPOINT_ENV);
            self.api.endpoint = endpoint;
        }
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|v| !v.is_empty()) {
            tracing::debug!("API access token taken from {}", ACCESS_TOKEN_ENV);
            self.api.access_token = Some(token);
        }
    }

    /// The display timezone, UTC when unset or unknown
    pub fn tz(&self) -> chrono_tz::Tz {
        if self.timezone.is_empty() {
            return chrono_tz::UTC;
        }
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
            chrono_tz::UTC
        })
    }
}

/// Headless CMS connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Repository API entry point, e.g. `https://<repo>.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type of post documents
    pub document_type: String,
    /// Posts per listing page
    pub page_size: usize,
    /// Page size of the title index fetch; must cover the whole corpus
    pub index_page_size: usize,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 1,
            index_page_size: 100,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: u32,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: crate::helpers::WORDS_PER_MINUTE,
        }
    }
}

/// utterances comment widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    pub enable: bool,
    /// GitHub repository holding the comment issues (`owner/name`)
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
    pub script_url: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            repo: String::new(),
            issue_term: "pathname".to_string(),
            theme: "photon-dark".to_string(),
            script_url: "https://utteranc.es/client.js".to_string(),
        }
    }
}

impl CommentsConfig {
    /// Whether the widget should be embedded at all
    pub fn is_active(&self) -> bool {
        self.enable && !self.repo.trim().is_empty()
    }
}
