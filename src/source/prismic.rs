//! Prismic REST API client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::OnceCell;

use super::{ContentSource, SourceError};
use crate::config::ApiConfig;
use crate::content::{Post, RawSearchResponse, TitleIndexEntry};
use crate::listing::ListPage;

/// API entry point document; only the refs matter here
#[derive(Debug, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// Content source backed by a Prismic repository
pub struct PrismicClient {
    client: Client,
    endpoint: Url,
    search: Url,
    access_token: Option<String>,
    document_type: String,
    master_ref: OnceCell<String>,
}

impl PrismicClient {
    pub fn new(config: &ApiConfig) -> Result<Self, SourceError> {
        let endpoint = config.endpoint.trim();
        if endpoint.is_empty() {
            return Err(SourceError::MissingEndpoint);
        }

        let search = Url::parse(&format!(
            "{}/documents/search",
            endpoint.trim_end_matches('/')
        ))?;
        let endpoint = Url::parse(endpoint)?;

        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            search,
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            document_type: config.document_type.clone(),
            master_ref: OnceCell::new(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("spacetraveling/", env!("CARGO_PKG_VERSION"))
    }

    /// The master ref, fetched once per client
    async fn master_ref(&self) -> Result<&str, SourceError> {
        let reference = self
            .master_ref
            .get_or_try_init(|| async {
                let url = self.with_token(self.endpoint.clone());
                let info: ApiInfo = self.get_json(url).await?;
                info.refs
                    .into_iter()
                    .find(|r| r.is_master_ref)
                    .map(|r| r.reference)
                    .ok_or(SourceError::MissingMasterRef)
            })
            .await?;
        Ok(reference.as_str())
    }

    /// Build a search query against the master ref
    async fn search_url(
        &self,
        predicate: &str,
        page_size: usize,
        fetch: Option<&str>,
    ) -> Result<Url, SourceError> {
        let master_ref = self.master_ref().await?;
        let mut url = self.search.clone();
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("ref", master_ref);
            qp.append_pair("q", &format!("[{}]", predicate));
            qp.append_pair(
                "orderings",
                &format!(
                    "[document.first_publication_date desc,my.{}.title]",
                    self.document_type
                ),
            );
            qp.append_pair("pageSize", &page_size.max(1).to_string());
            if let Some(fetch) = fetch {
                qp.append_pair("fetch", fetch);
            }
        }
        Ok(self.with_token(url))
    }

    /// Predicate matching a single document by UID
    fn uid_predicate(&self, id: &str) -> String {
        format!(
            r#"[at(my.{}.uid,"{}")]"#,
            self.document_type,
            quote_predicate_value(id)
        )
    }

    fn type_predicate(&self) -> String {
        format!(r#"[at(document.type,"{}")]"#, self.document_type)
    }

    fn fetch_fields(&self, fields: &[&str]) -> String {
        fields
            .iter()
            .map(|field| format!("{}.{}", self.document_type, field))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn with_token(&self, mut url: Url) -> Url {
        if let Some(token) = &self.access_token {
            let present = url.query_pairs().any(|(k, _)| k == "access_token");
            if !present {
                url.query_pairs_mut().append_pair("access_token", token);
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SourceError> {
        tracing::debug!("GET {}", redact(&url));
        let resp = self.client.get(url).send().await?;
        Self::handle(resp).await
    }

    async fn handle<T: DeserializeOwned>(resp: Response) -> Result<T, SourceError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            return Err(SourceError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Strip the access token before a URL reaches the logs
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "access_token" { "***".into() } else { v };
            (k.into_owned(), v.into_owned())
        })
        .collect();
    if !pairs.is_empty() {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url.to_string()
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn first_page(&self, page_size: usize) -> Result<ListPage, SourceError> {
        let fetch = self.fetch_fields(&["title", "subtitle", "author"]);
        let url = self
            .search_url(&self.type_predicate(), page_size, Some(&fetch))
            .await?;
        let response: RawSearchResponse = self.get_json(url).await?;
        Ok(response.into_list_page())
    }

    async fn page_at(&self, cursor: &str) -> Result<ListPage, SourceError> {
        let url =
            Url::parse(cursor).map_err(|_| SourceError::InvalidCursor(cursor.to_string()))?;
        let response: RawSearchResponse = self.get_json(self.with_token(url)).await?;
        Ok(response.into_list_page())
    }

    async fn document(&self, id: &str) -> Result<Post, SourceError> {
        let url = self.search_url(&self.uid_predicate(id), 1, None).await?;
        let response: RawSearchResponse = self.get_json(url).await?;

        response
            .results
            .into_iter()
            .next()
            .map(|doc| doc.into_post())
            .ok_or_else(|| SourceError::NotFound(id.to_string()))
    }

    async fn title_index(&self, page_size: usize) -> Result<Vec<TitleIndexEntry>, SourceError> {
        let fetch = self.fetch_fields(&["title"]);
        let url = self
            .search_url(&self.type_predicate(), page_size, Some(&fetch))
            .await?;
        let response: RawSearchResponse = self.get_json(url).await?;

        if response.total_results_size > response.results.len() {
            tracing::warn!(
                "Title index truncated: {} of {} posts fetched; raise api.index_page_size",
                response.results.len(),
                response.total_results_size
            );
        }

        Ok(response
            .results
            .into_iter()
            .map(|doc| doc.into_index_entry())
            .collect())
    }
}

/// Escape a value for a double-quoted predicate string
fn quote_predicate_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted
}
