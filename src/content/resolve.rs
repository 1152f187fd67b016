//! Post detail assembly
//!
//! Resolving a slug fetches the post, its chronological neighbors, and a
//! derived reading-time estimate. Nothing is cached; every resolve
//! re-queries the content source.

use super::post::{PostDetail, PostSummary, Section};
use super::richtext;
use super::source::{ContentSource, DateFilter, Direction, Query, DETAIL_FIELDS, LIST_FIELDS};
use crate::error::{Error, Result};

/// Words per minute assumed by the reading-time estimate.
const WORDS_PER_MINUTE: u64 = 200;

/// A post plus everything its page needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPost {
    pub post: PostDetail,
    pub previous: Option<PostSummary>,
    pub next: Option<PostSummary>,
    pub reading_time_minutes: u64,
}

/// Resolve one post by slug.
///
/// The neighbor lookups are independent reads and run concurrently. A
/// post with no first publication date has no neighbors. When several
/// posts share the exact same timestamp, the neighbor is whichever
/// single row the source returns under the requested ordering.
pub async fn resolve(
    source: &dyn ContentSource,
    slug: &str,
    preview_ref: Option<&str>,
) -> Result<ResolvedPost> {
    let doc = source
        .get_by_uid(slug, DETAIL_FIELDS, preview_ref)
        .await?
        .ok_or_else(|| Error::NotFound(slug.to_string()))?;
    let post = PostDetail::from(doc);

    let (previous, next) = match &post.first_publication_date {
        Some(date) => {
            let before = Query::new(1, Direction::Desc)
                .date_filter(DateFilter::Before(date.clone()))
                .fetch(LIST_FIELDS)
                .preview_ref(preview_ref);
            let after = Query::new(1, Direction::Asc)
                .date_filter(DateFilter::After(date.clone()))
                .fetch(LIST_FIELDS)
                .preview_ref(preview_ref);

            let (previous, next) = tokio::join!(source.query(&before), source.query(&after));
            (
                previous?.results.first().map(PostSummary::from),
                next?.results.first().map(PostSummary::from),
            )
        }
        None => (None, None),
    };

    let reading_time_minutes = reading_time_minutes(&post.content);

    Ok(ResolvedPost {
        post,
        previous,
        next,
        reading_time_minutes,
    })
}

/// Estimated minutes to read the given sections at 200 words per minute,
/// rounded up. A zero-word post yields 0, not 1.
pub fn reading_time_minutes(sections: &[Section]) -> u64 {
    let words: u64 = sections
        .iter()
        .map(|section| {
            let text = format!("{} {}", section.heading, richtext::as_text(&section.body));
            text.split_whitespace().count() as u64
        })
        .sum();

    words.div_ceil(WORDS_PER_MINUTE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::post::{Banner, Document, PostData};
    use crate::content::richtext::{Block, BlockKind};
    use crate::content::source::memory::MemorySource;

    fn section(heading: &str, body_words: usize) -> Section {
        let text = vec!["palavra"; body_words].join(" ");
        Section {
            heading: heading.to_string(),
            body: vec![Block {
                kind: BlockKind::Paragraph,
                text,
                spans: vec![],
            }],
        }
    }

    fn doc(uid: &str, date: Option<&str>) -> Document {
        Document {
            uid: uid.to_string(),
            first_publication_date: date.map(|d| d.to_string()),
            last_publication_date: date.map(|d| d.to_string()),
            data: PostData {
                title: format!("Post {}", uid),
                subtitle: "sub".to_string(),
                author: "Ana".to_string(),
                banner: Some(Banner {
                    url: "https://images.example/banner.png".to_string(),
                }),
                content: Some(vec![section("Hello", 10)]),
            },
        }
    }

    fn three_posts() -> MemorySource {
        MemorySource::new(vec![
            doc("oldest", Some("2021-01-01T00:00:00Z")),
            doc("middle", Some("2021-02-01T00:00:00Z")),
            doc("newest", Some("2021-03-01T00:00:00Z")),
        ])
    }

    #[tokio::test]
    async fn test_resolve_middle_post_has_both_neighbors() {
        let source = three_posts();
        let resolved = resolve(&source, "middle", None).await.unwrap();
        assert_eq!(resolved.post.uid, "middle");
        assert_eq!(resolved.previous.unwrap().uid, "oldest");
        assert_eq!(resolved.next.unwrap().uid, "newest");
    }

    #[tokio::test]
    async fn test_oldest_post_has_no_previous() {
        let source = three_posts();
        let resolved = resolve(&source, "oldest", None).await.unwrap();
        assert!(resolved.previous.is_none());
        assert_eq!(resolved.next.unwrap().uid, "middle");
    }

    #[tokio::test]
    async fn test_newest_post_has_no_next() {
        let source = three_posts();
        let resolved = resolve(&source, "newest", None).await.unwrap();
        assert_eq!(resolved.previous.unwrap().uid, "middle");
        assert!(resolved.next.is_none());
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let source = three_posts();
        let err = resolve(&source, "nao-existe", None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(slug) if slug == "nao-existe"));
    }

    #[tokio::test]
    async fn test_undated_post_has_no_neighbors() {
        let mut docs = vec![doc("draft", None)];
        docs.push(doc("dated", Some("2021-01-01T00:00:00Z")));
        let source = MemorySource::new(docs);
        let resolved = resolve(&source, "draft", None).await.unwrap();
        assert!(resolved.previous.is_none());
        assert!(resolved.next.is_none());
    }

    #[test]
    fn test_reading_time_rounds_up() {
        // "Hello" heading + 200 body words = 201 words -> 2 minutes
        assert_eq!(reading_time_minutes(&[section("Hello", 200)]), 2);
    }

    #[test]
    fn test_reading_time_exact_multiple() {
        // 1-word heading + 199 body words = 200 words -> 1 minute
        assert_eq!(reading_time_minutes(&[section("Hello", 199)]), 1);
    }

    #[test]
    fn test_reading_time_sums_sections() {
        let sections = vec![section("a", 99), section("b", 99)];
        assert_eq!(reading_time_minutes(&sections), 1);
        let sections = vec![section("a", 100), section("b", 100)];
        assert_eq!(reading_time_minutes(&sections), 2);
    }

    #[test]
    fn test_zero_content_reads_in_zero_minutes() {
        assert_eq!(reading_time_minutes(&[]), 0);
        assert_eq!(
            reading_time_minutes(&[Section {
                heading: String::new(),
                body: vec![],
            }]),
            0
        );
    }
}
