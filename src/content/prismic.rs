//! HTTP content source (Prismic-style REST API)
//!
//! The repository endpoint is resolved once per request: the API root is
//! fetched for the current master ref, then `/documents/search` is queried
//! with the predicate/ordering/field parameters. Failures are surfaced as
//! `Error::ContentSource`; there is no retry.

use async_trait::async_trait;
use serde::Deserialize;

use super::post::Document;
use super::source::{ContentSource, DateFilter, Direction, PostPage, Query};
use crate::error::{Error, Result};

const DATE_FIELD: &str = "document.first_publication_date";

/// Content source backed by a Prismic-compatible repository API.
pub struct PrismicSource {
    client: reqwest::Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiInfo {
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master: bool,
}

impl PrismicSource {
    /// Create a source for the given API endpoint
    /// (e.g. `https://repo.cdn.prismic.io/api/v2`).
    pub fn new(api_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve the ref to query against: the preview ref when present,
    /// otherwise the repository's current master ref.
    async fn resolve_ref(&self, preview_ref: Option<&str>) -> Result<String> {
        if let Some(preview) = preview_ref {
            return Ok(preview.to_string());
        }
        let info: ApiInfo = self
            .client
            .get(&self.api_url)
            .send()
            .await
            .map_err(Error::content_source)?
            .error_for_status()
            .map_err(Error::content_source)?
            .json()
            .await
            .map_err(Error::content_source)?;

        info.refs
            .into_iter()
            .find(|r| r.is_master)
            .map(|r| r.reference)
            .ok_or_else(|| Error::content_source("api info has no master ref"))
    }

    async fn search(&self, params: &[(&str, String)]) -> Result<PostPage> {
        let url = format!("{}/documents/search", self.api_url);
        self.client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(Error::content_source)?
            .error_for_status()
            .map_err(Error::content_source)?
            .json()
            .await
            .map_err(Error::content_source)
    }
}

#[async_trait]
impl ContentSource for PrismicSource {
    async fn query(&self, query: &Query) -> Result<PostPage> {
        let reference = self.resolve_ref(query.preview_ref.as_deref()).await?;

        let mut params: Vec<(&str, String)> = vec![
            ("ref", reference),
            ("q", r#"[[at(document.type,"post")]]"#.to_string()),
            ("pageSize", query.page_size.to_string()),
            ("orderings", orderings_param(query.direction)),
        ];
        if let Some(filter) = &query.date_filter {
            params.push(("q", date_predicate(filter)));
        }
        if !query.fetch.is_empty() {
            params.push(("fetch", query.fetch.join(",")));
        }

        self.search(&params).await
    }

    async fn get_by_uid(
        &self,
        slug: &str,
        fetch: &[&str],
        preview_ref: Option<&str>,
    ) -> Result<Option<Document>> {
        let reference = self.resolve_ref(preview_ref).await?;

        let mut params: Vec<(&str, String)> = vec![
            ("ref", reference),
            ("q", uid_predicate(slug)),
            ("pageSize", "1".to_string()),
        ];
        if !fetch.is_empty() {
            params.push(("fetch", fetch.join(",")));
        }

        let page = self.search(&params).await?;
        Ok(page.results.into_iter().next())
    }

    async fn fetch_page(&self, cursor: &str) -> Result<PostPage> {
        self.client
            .get(cursor)
            .send()
            .await
            .map_err(Error::content_source)?
            .error_for_status()
            .map_err(Error::content_source)?
            .json()
            .await
            .map_err(Error::content_source)
    }
}

fn orderings_param(direction: Direction) -> String {
    match direction {
        Direction::Desc => format!("[{} desc]", DATE_FIELD),
        Direction::Asc => format!("[{}]", DATE_FIELD),
    }
}

fn date_predicate(filter: &DateFilter) -> String {
    match filter {
        DateFilter::Before(pivot) => {
            format!(r#"[[date.before({},"{}")]]"#, DATE_FIELD, pivot)
        }
        DateFilter::After(pivot) => {
            format!(r#"[[date.after({},"{}")]]"#, DATE_FIELD, pivot)
        }
    }
}

fn uid_predicate(slug: &str) -> String {
    // Slugs are URL path segments; quotes cannot legally appear, but
    // strip them anyway so the predicate stays well-formed.
    format!(r#"[[at(my.post.uid,"{}")]]"#, slug.replace('"', ""))
}
