//! Content source contract
//!
//! The core depends on this narrow interface only; the HTTP client in
//! `prismic` and the in-memory fake used by tests both implement it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::post::Document;
use crate::error::Result;

/// Fields selected by list queries.
pub const LIST_FIELDS: &[&str] = &["post.title", "post.subtitle", "post.author"];

/// Fields selected when resolving a single post.
pub const DETAIL_FIELDS: &[&str] = &[
    "post.title",
    "post.subtitle",
    "post.author",
    "post.banner",
    "post.content",
];

/// One page of query results plus the opaque continuation cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub results: Vec<Document>,
    #[serde(default)]
    pub next_page: Option<String>,
}

/// Sort direction on `first_publication_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Filter on `first_publication_date`, strict on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFilter {
    Before(String),
    After(String),
}

/// A query against documents of type "post".
#[derive(Debug, Clone)]
pub struct Query {
    pub date_filter: Option<DateFilter>,
    pub fetch: Vec<String>,
    pub page_size: usize,
    pub direction: Direction,
    pub preview_ref: Option<String>,
}

impl Query {
    pub fn new(page_size: usize, direction: Direction) -> Self {
        Self {
            date_filter: None,
            fetch: Vec::new(),
            page_size,
            direction,
            preview_ref: None,
        }
    }

    pub fn fetch(mut self, fields: &[&str]) -> Self {
        self.fetch = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn date_filter(mut self, filter: DateFilter) -> Self {
        self.date_filter = Some(filter);
        self
    }

    pub fn preview_ref(mut self, preview_ref: Option<&str>) -> Self {
        self.preview_ref = preview_ref.map(|r| r.to_string());
        self
    }
}

/// Read-only access to the external content repository.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Run a query over documents of type "post".
    async fn query(&self, query: &Query) -> Result<PostPage>;

    /// Fetch one document by its unique slug. `Ok(None)` when the slug
    /// does not resolve.
    async fn get_by_uid(
        &self,
        slug: &str,
        fetch: &[&str],
        preview_ref: Option<&str>,
    ) -> Result<Option<Document>>;

    /// Follow an opaque continuation cursor returned by a prior page.
    async fn fetch_page(&self, cursor: &str) -> Result<PostPage>;
}
