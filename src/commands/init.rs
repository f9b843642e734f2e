//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling
description: ''
language: pt-BR
timezone: America/Sao_Paulo
date_format: DD MMM YYYY

# URL
url: http://localhost:4000
root: /

# Directory
public_dir: public
static_dir: static
languages_dir: languages

# Seconds between regenerations while serving
revalidate: 1800

# Content API (PRISMIC_API_ENDPOINT / PRISMIC_ACCESS_TOKEN override these)
api:
  endpoint: ''
  access_token:
  document_type: posts
  page_size: 1
  index_page_size: 100
  timeout_secs: 10

reading:
  words_per_minute: 200

# utterances comments, stored as issues of a GitHub repository
comments:
  enable: true
  repo: ''
  issue_term: pathname
  theme: photon-dark
"#;

/// Raw documents in the shape the search API returns them, for
/// `generate --fixture`
const SAMPLE_FIXTURE: &str = r#"[
  {
    "id": "YFhhXhAAACMAGaK5",
    "uid": "hello-world",
    "first_publication_date": "2021-03-25T19:25:28+0000",
    "data": {
      "title": "Hello World",
      "subtitle": "Your first post",
      "author": "spacetraveling",
      "banner": { "url": "", "alt": null },
      "content": [
        {
          "heading": "Getting started",
          "body": [
            {
              "type": "paragraph",
              "text": "Point api.endpoint at your repository and run generate.",
              "spans": [{ "start": 0, "end": 5, "type": "strong" }]
            }
          ]
        }
      ]
    }
  }
]
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("static"))?;
    fs::create_dir_all(target_dir.join("languages"))?;
    fs::create_dir_all(target_dir.join("fixtures"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        tracing::warn!("{:?} already exists, leaving it untouched", config_path);
    } else {
        fs::write(&config_path, CONFIG_TEMPLATE)?;
    }

    fs::write(target_dir.join("fixtures/posts.json"), SAMPLE_FIXTURE)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::source::MemorySource;

    #[test]
    fn test_init_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        assert!(dir.path().join("static").is_dir());
        let config = SiteConfig::load(dir.path().join("_config.yml")).unwrap();
        assert_eq!(config.api.document_type, "posts");
        assert_eq!(config.api.access_token, None);
        assert_eq!(config.revalidate, 1800);

        let fixture = MemorySource::from_fixture(dir.path().join("fixtures/posts.json")).unwrap();
        assert_eq!(fixture.posts()[0].id, "hello-world");
        assert!(fixture.posts()[0].banner.is_none());
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_config.yml"), "title: Mine\n").unwrap();

        init_site(dir.path()).unwrap();
        let config = SiteConfig::load(dir.path().join("_config.yml")).unwrap();
        assert_eq!(config.title, "Mine");
    }
}
