//! Configuration module

mod site;

pub use site::{CommentsConfig, ServerConfig, SiteConfig};
