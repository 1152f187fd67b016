//! Rich text normalization
//!
//! The content source stores post bodies as structured rich text: a
//! sequence of blocks, each carrying plain text plus inline formatting
//! spans addressed by character offsets. This module converts a block
//! sequence into plain text (for word counting) or semantic HTML (for
//! display). Rendering is deterministic: the same input always produces
//! byte-identical output, since the result is inserted into the page
//! verbatim. Text and attribute values are escaped here; anything beyond
//! that is trusted as already sanitized by the upstream content source.

use serde::{Deserialize, Serialize};

use crate::helpers::html::{escape_attr, html_escape};

/// One rich-text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
}

/// Block-level element kinds understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "heading1")]
    Heading1,
    #[serde(rename = "heading2")]
    Heading2,
    #[serde(rename = "heading3")]
    Heading3,
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "list-item")]
    ListItem,
    #[serde(rename = "o-list-item")]
    OrderedListItem,
    #[serde(rename = "preformatted")]
    Preformatted,
}

/// An inline formatting span over `[start, end)` character offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(flatten)]
    pub kind: SpanKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SpanKind {
    #[serde(rename = "strong")]
    Strong,
    #[serde(rename = "em")]
    Em,
    #[serde(rename = "hyperlink")]
    Hyperlink { data: LinkData },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    pub url: String,
}

impl SpanKind {
    fn open_tag(&self) -> String {
        match self {
            SpanKind::Strong => "<strong>".to_string(),
            SpanKind::Em => "<em>".to_string(),
            SpanKind::Hyperlink { data } => {
                format!(r#"<a href="{}">"#, escape_attr(&data.url))
            }
        }
    }

    fn close_tag(&self) -> &'static str {
        match self {
            SpanKind::Strong => "</strong>",
            SpanKind::Em => "</em>",
            SpanKind::Hyperlink { .. } => "</a>",
        }
    }
}

/// Concatenate all block texts in order, separated by single spaces.
///
/// No markup is introduced; this output feeds the word counter only.
pub fn as_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a block sequence as semantic HTML.
///
/// Adjacent list items of the same kind are grouped under one `<ul>` or
/// `<ol>`. Newlines inside a block render as `<br/>`.
pub fn as_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut open_list: Option<BlockKind> = None;

    for block in blocks {
        let is_list = matches!(block.kind, BlockKind::ListItem | BlockKind::OrderedListItem);

        if open_list != Some(block.kind) || !is_list {
            close_list(&mut out, &mut open_list);
        }

        match block.kind {
            BlockKind::Heading1 => wrap(&mut out, "h1", block),
            BlockKind::Heading2 => wrap(&mut out, "h2", block),
            BlockKind::Heading3 => wrap(&mut out, "h3", block),
            BlockKind::Paragraph => wrap(&mut out, "p", block),
            BlockKind::Preformatted => wrap(&mut out, "pre", block),
            BlockKind::ListItem => {
                if open_list.is_none() {
                    out.push_str("<ul>");
                    open_list = Some(BlockKind::ListItem);
                }
                wrap(&mut out, "li", block);
            }
            BlockKind::OrderedListItem => {
                if open_list.is_none() {
                    out.push_str("<ol>");
                    open_list = Some(BlockKind::OrderedListItem);
                }
                wrap(&mut out, "li", block);
            }
        }
    }

    close_list(&mut out, &mut open_list);
    out
}

fn close_list(out: &mut String, open_list: &mut Option<BlockKind>) {
    match open_list.take() {
        Some(BlockKind::ListItem) => out.push_str("</ul>"),
        Some(BlockKind::OrderedListItem) => out.push_str("</ol>"),
        _ => {}
    }
}

fn wrap(out: &mut String, tag: &str, block: &Block) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&render_spans(&block.text, &block.spans));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Apply inline spans to a block's text.
///
/// Spans are applied by (start asc, end desc) so that an enclosing span
/// opens before any span it contains. Offsets are character offsets;
/// overlapping spans are assumed not to occur (the content source does
/// not emit them).
fn render_spans(text: &str, spans: &[Span]) -> String {
    let chars: Vec<char> = text.chars().collect();

    let mut ordered: Vec<&Span> = spans.iter().collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    // Tags to emit before the character at each offset. Closings at an
    // offset go before openings so that sibling spans do not interleave.
    let mut openings: Vec<Vec<String>> = vec![Vec::new(); chars.len() + 1];
    let mut closings: Vec<Vec<&'static str>> = vec![Vec::new(); chars.len() + 1];

    for span in ordered {
        let start = span.start.min(chars.len());
        let end = span.end.min(chars.len());
        if start >= end {
            continue;
        }
        openings[start].push(span.kind.open_tag());
        // Later-opened spans close first at a shared end offset.
        closings[end].insert(0, span.kind.close_tag());
    }

    let mut out = String::with_capacity(text.len());
    for (i, c) in chars.iter().enumerate() {
        for tag in &closings[i] {
            out.push_str(tag);
        }
        for tag in &openings[i] {
            out.push_str(tag);
        }
        if *c == '\n' {
            out.push_str("<br/>");
        } else {
            out.push_str(&html_escape(&c.to_string()));
        }
    }
    for tag in &closings[chars.len()] {
        out.push_str(tag);
    }
    for tag in &openings[chars.len()] {
        out.push_str(tag);
    }

    out
}
