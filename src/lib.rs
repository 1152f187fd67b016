//! spacetraveling: a server-rendered blog front-end over a headless
//! content API
//!
//! Posts live in an external content repository; this crate fetches,
//! normalizes, and renders them, and exposes the thin JSON endpoints the
//! pages use (list continuation, comment-widget configuration, preview
//! mode toggles).

pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use content::prismic::PrismicSource;
use content::source::ContentSource;

/// The main application
#[derive(Clone)]
pub struct SpaceTraveling {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Content repository the posts are fetched from
    pub source: Arc<dyn ContentSource>,
}

impl SpaceTraveling {
    /// Create an application instance from a directory, reading
    /// `_config.yml` when present.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            let mut config = config::SiteConfig::default();
            config.apply_env();
            config
        };

        let source: Arc<dyn ContentSource> =
            Arc::new(PrismicSource::new(&config.content_api));

        Ok(Self { config, source })
    }
}
