//! Post models
//!
//! `Document` mirrors the content source's wire shape; `PostSummary` and
//! `PostDetail` are the views the rest of the crate works with. All are
//! immutable once fetched.

use serde::{Deserialize, Serialize};

use super::richtext::Block;

/// A document as returned by the content source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub uid: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    pub data: PostData,
}

/// Document payload. List queries select only title/subtitle/author;
/// the remaining fields arrive on detail fetches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub banner: Option<Banner>,
    #[serde(default)]
    pub content: Option<Vec<Section>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub url: String,
}

/// One titled section of a post body. Order is display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub body: Vec<Block>,
}

/// The fields shown on the post list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: String,
    pub first_publication_date: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A fully resolved post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: Option<String>,
    pub last_publication_date: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner_url: String,
    pub content: Vec<Section>,
}

impl From<&Document> for PostSummary {
    fn from(doc: &Document) -> Self {
        Self {
            uid: doc.uid.clone(),
            first_publication_date: doc.first_publication_date.clone(),
            title: doc.data.title.clone(),
            subtitle: doc.data.subtitle.clone(),
            author: doc.data.author.clone(),
        }
    }
}

impl From<Document> for PostDetail {
    fn from(doc: Document) -> Self {
        Self {
            uid: doc.uid,
            first_publication_date: doc.first_publication_date,
            last_publication_date: doc.last_publication_date,
            title: doc.data.title,
            subtitle: doc.data.subtitle,
            author: doc.data.author,
            banner_url: doc.data.banner.map(|b| b.url).unwrap_or_default(),
            content: doc.data.content.unwrap_or_default(),
        }
    }
}

impl PostDetail {
    /// True when the post was edited after first publication.
    pub fn was_edited(&self) -> bool {
        match (&self.first_publication_date, &self.last_publication_date) {
            (Some(first), Some(last)) => first != last,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_from_document() {
        let json = r#"{
            "uid": "meu-post",
            "first_publication_date": "2021-03-25T00:00:00+0000",
            "data": {"title": "Meu post", "subtitle": "Um subtítulo", "author": "Ana"}
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        let summary = PostSummary::from(&doc);
        assert_eq!(summary.uid, "meu-post");
        assert_eq!(summary.title, "Meu post");
        assert_eq!(
            summary.first_publication_date.as_deref(),
            Some("2021-03-25T00:00:00+0000")
        );
    }

    #[test]
    fn test_detail_from_document() {
        let json = r#"{
            "uid": "meu-post",
            "first_publication_date": "2021-03-25T00:00:00+0000",
            "last_publication_date": "2021-03-26T10:00:00+0000",
            "data": {
                "title": "Meu post",
                "subtitle": "Um subtítulo",
                "author": "Ana",
                "banner": {"url": "https://images.example/banner.png"},
                "content": [
                    {"heading": "Primeira seção",
                     "body": [{"type": "paragraph", "text": "Olá", "spans": []}]}
                ]
            }
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        let detail = PostDetail::from(doc);
        assert_eq!(detail.banner_url, "https://images.example/banner.png");
        assert_eq!(detail.content.len(), 1);
        assert!(detail.was_edited());
    }

    #[test]
    fn test_not_edited_when_dates_match() {
        let detail = PostDetail {
            uid: "x".into(),
            first_publication_date: Some("2021-03-25T00:00:00Z".into()),
            last_publication_date: Some("2021-03-25T00:00:00Z".into()),
            title: String::new(),
            subtitle: String::new(),
            author: String::new(),
            banner_url: String::new(),
            content: vec![],
        };
        assert!(!detail.was_edited());
    }
}
