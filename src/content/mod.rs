//! Content fetching and normalization

pub mod list;
pub mod post;
pub mod prismic;
pub mod resolve;
pub mod richtext;
pub mod source;
