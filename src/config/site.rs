//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,

    // Content source
    pub content_api: String,
    pub page_size: usize,

    // Comment widget
    #[serde(default)]
    pub comments: CommentsConfig,

    // Server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Space Traveling".to_string(),
            language: "pt-BR".to_string(),
            content_api: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            page_size: 5,
            comments: CommentsConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Pick up the comments repository from the environment when the
    /// config file does not set one.
    pub fn apply_env(&mut self) {
        if self.comments.repo.is_empty() {
            if let Ok(repo) = std::env::var("UTTERANCES_COMMENTS_GITHUB_REPO") {
                self.comments.repo = repo;
            }
        }
    }
}

/// Comment-widget (utterances) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    pub repo: String,
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            theme: "github-dark".to_string(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Space Traveling");
        assert_eq!(config.page_size, 5);
        assert_eq!(config.comments.theme, "github-dark");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Meu Blog
content_api: https://meublog.cdn.prismic.io/api/v2
page_size: 10
comments:
  repo: user/blog-comments
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Meu Blog");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.comments.repo, "user/blog-comments");
        // Nested defaults still apply
        assert_eq!(config.comments.theme, "github-dark");
    }
}
