//! Post list aggregation
//!
//! One `PaginationState` exists per page view. It is owned by its caller
//! and mutated only by `load_next_page`, which appends the fetched page
//! and replaces the cursor. Items keep arrival order; nothing is ever
//! reordered or deduplicated.

use super::post::PostSummary;
use super::source::{ContentSource, Direction, Query, LIST_FIELDS};
use crate::error::{Error, Result};

/// Default list page size.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// The running post list plus its continuation cursor.
///
/// `generation` counts merges. Exclusive borrows already prevent two
/// concurrent `load_next_page` calls on one state; the counter lets a
/// caller that cloned the state detect a stale snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState {
    pub items: Vec<PostSummary>,
    pub next_cursor: Option<String>,
    pub generation: u64,
}

impl PaginationState {
    /// True when another page can be loaded.
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// Fetch the first page of post summaries, newest first.
pub async fn fetch_first_page(
    source: &dyn ContentSource,
    page_size: usize,
    preview_ref: Option<&str>,
) -> Result<PaginationState> {
    let query = Query::new(page_size, Direction::Desc)
        .fetch(LIST_FIELDS)
        .preview_ref(preview_ref);
    let page = source.query(&query).await?;

    Ok(PaginationState {
        items: page.results.iter().map(PostSummary::from).collect(),
        next_cursor: page.next_page,
        generation: 0,
    })
}

/// Fetch the next page and merge it into `state`.
///
/// Appends the fetched items and replaces the cursor. Calling this with
/// no cursor left is a caller bug; it returns an error rather than
/// re-fetching anything.
pub async fn load_next_page(
    source: &dyn ContentSource,
    state: &mut PaginationState,
) -> Result<()> {
    let cursor = state
        .next_cursor
        .as_deref()
        .ok_or_else(|| Error::content_source("no further pages"))?;

    let page = source.fetch_page(cursor).await?;

    state
        .items
        .extend(page.results.iter().map(PostSummary::from));
    state.next_cursor = page.next_page;
    state.generation += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::post::{Document, PostData};
    use crate::content::source::memory::MemorySource;

    fn doc(uid: &str, date: &str) -> Document {
        Document {
            uid: uid.to_string(),
            first_publication_date: Some(date.to_string()),
            last_publication_date: Some(date.to_string()),
            data: PostData {
                title: format!("Post {}", uid),
                subtitle: format!("Subtitle {}", uid),
                author: "Ana".to_string(),
                banner: None,
                content: None,
            },
        }
    }

    fn seven_posts() -> MemorySource {
        MemorySource::new(
            (1..=7)
                .map(|i| doc(&format!("p{}", i), &format!("2021-03-{:02}T00:00:00Z", i)))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_first_page_newest_first() {
        let source = seven_posts();
        let state = fetch_first_page(&source, DEFAULT_PAGE_SIZE, None).await.unwrap();

        let uids: Vec<&str> = state.items.iter().map(|p| p.uid.as_str()).collect();
        assert_eq!(uids, ["p7", "p6", "p5", "p4", "p3"]);
        assert!(state.has_more());
        assert_eq!(state.generation, 0);
    }

    #[tokio::test]
    async fn test_load_next_page_appends() {
        let source = seven_posts();
        let mut state = fetch_first_page(&source, DEFAULT_PAGE_SIZE, None).await.unwrap();
        load_next_page(&source, &mut state).await.unwrap();

        let uids: Vec<&str> = state.items.iter().map(|p| p.uid.as_str()).collect();
        assert_eq!(uids, ["p7", "p6", "p5", "p4", "p3", "p2", "p1"]);
        assert_eq!(state.next_cursor, None);
        assert_eq!(state.generation, 1);
    }

    #[tokio::test]
    async fn test_load_next_page_without_cursor_errors() {
        let source = seven_posts();
        let mut state = fetch_first_page(&source, 10, None).await.unwrap();
        assert!(!state.has_more());
        assert!(load_next_page(&source, &mut state).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_first_page_idempotent() {
        let source = seven_posts();
        let first = fetch_first_page(&source, DEFAULT_PAGE_SIZE, None).await.unwrap();
        let second = fetch_first_page(&source, DEFAULT_PAGE_SIZE, None).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_single_page_has_no_cursor() {
        let source = MemorySource::new(vec![doc("only", "2021-01-01T00:00:00Z")]);
        let state = fetch_first_page(&source, DEFAULT_PAGE_SIZE, None).await.unwrap();
        assert_eq!(state.items.len(), 1);
        assert!(!state.has_more());
    }
}
