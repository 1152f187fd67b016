//! Page templates rendered with the Tera template engine
//!
//! All page templates are embedded directly in the binary and rendered
//! with typed context structs. Tera's autoescaping covers every value;
//! the one exception is rich-text bodies, which arrive already escaped
//! from the normalizer and are marked `safe` in the templates.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::list::PaginationState;
use crate::content::post::PostSummary;
use crate::content::resolve::ResolvedPost;
use crate::content::richtext;
use crate::helpers::date::{format_date, format_date_with, DateTemplate};

/// Template renderer with embedded page templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all page templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("pages/layout.html")),
            ("home.html", include_str!("pages/home.html")),
            ("post.html", include_str!("pages/post.html")),
            ("not_found.html", include_str!("pages/not_found.html")),
            ("error.html", include_str!("pages/error.html")),
        ])?;

        Ok(Self { tera })
    }

    fn base_context(&self, config: &SiteConfig, page_title: &str, preview: bool) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from(config));
        context.insert("page_title", page_title);
        context.insert("preview", &preview);
        context
    }

    /// Render the home page from the current pagination state.
    pub fn render_home(
        &self,
        config: &SiteConfig,
        state: &PaginationState,
        preview: bool,
    ) -> Result<String> {
        let posts: Vec<PostItemData> = state.items.iter().map(PostItemData::from).collect();

        let mut context =
            self.base_context(config, &format!("Posts | {}", config.title), preview);
        context.insert("posts", &posts);
        context.insert("next_cursor", &state.next_cursor);

        Ok(self.tera.render("home.html", &context)?)
    }

    /// Render a post page.
    pub fn render_post(
        &self,
        config: &SiteConfig,
        resolved: &ResolvedPost,
        preview: bool,
    ) -> Result<String> {
        let mut context = self.base_context(
            config,
            &format!("{} | {}", resolved.post.title, config.title),
            preview,
        );
        context.insert("post", &PostPageData::from(resolved));

        Ok(self.tera.render("post.html", &context)?)
    }

    /// Render the not-found page.
    pub fn render_not_found(&self, config: &SiteConfig) -> Result<String> {
        let context = self.base_context(
            config,
            &format!("Post não encontrado | {}", config.title),
            false,
        );
        Ok(self.tera.render("not_found.html", &context)?)
    }

    /// Render a generic error page.
    pub fn render_error(&self, config: &SiteConfig) -> Result<String> {
        let context = self.base_context(config, &format!("Erro | {}", config.title), false);
        Ok(self.tera.render("error.html", &context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
struct SiteData {
    title: String,
    language: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            language: config.language.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct PostItemData {
    uid: String,
    title: String,
    subtitle: String,
    author: String,
    date: String,
}

impl From<&PostSummary> for PostItemData {
    fn from(post: &PostSummary) -> Self {
        Self {
            uid: post.uid.clone(),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: display_date(post.first_publication_date.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct PostPageData {
    title: String,
    author: String,
    date: String,
    banner_url: String,
    minutes: u64,
    edited_date: Option<String>,
    sections: Vec<SectionData>,
    previous: Option<NavPostData>,
    next: Option<NavPostData>,
}

#[derive(Debug, Clone, Serialize)]
struct SectionData {
    heading: String,
    body_html: String,
}

#[derive(Debug, Clone, Serialize)]
struct NavPostData {
    uid: String,
    title: String,
}

impl From<&PostSummary> for NavPostData {
    fn from(post: &PostSummary) -> Self {
        Self {
            uid: post.uid.clone(),
            title: post.title.clone(),
        }
    }
}

impl From<&ResolvedPost> for PostPageData {
    fn from(resolved: &ResolvedPost) -> Self {
        let post = &resolved.post;

        let edited_date = if post.was_edited() {
            post.last_publication_date
                .as_deref()
                .and_then(|d| format_date_with(d, DateTemplate::LongWithTime).ok())
        } else {
            None
        };

        Self {
            title: post.title.clone(),
            author: post.author.clone(),
            date: display_date(post.first_publication_date.as_deref()),
            banner_url: post.banner_url.clone(),
            minutes: resolved.reading_time_minutes,
            edited_date,
            sections: post
                .content
                .iter()
                .map(|section| SectionData {
                    heading: section.heading.clone(),
                    body_html: richtext::as_html(&section.body),
                })
                .collect(),
            previous: resolved.previous.as_ref().map(NavPostData::from),
            next: resolved.next.as_ref().map(NavPostData::from),
        }
    }
}

fn display_date(date: Option<&str>) -> String {
    date.and_then(|d| format_date(d).ok()).unwrap_or_default()
}
