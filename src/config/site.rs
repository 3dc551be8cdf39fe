//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::image::AttributePolicies;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Prefix for site-absolute image URLs (`/images/a.png`)
    pub source_dir: String,

    #[serde(default)]
    pub image_size: ImageSizeConfig,

    #[serde(default)]
    pub highlight: HighlightConfig,

    #[serde(default)]
    pub markdown: MarkdownConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source_dir: "./src".to_string(),
            image_size: ImageSizeConfig::default(),
            highlight: HighlightConfig::default(),
            markdown: MarkdownConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Image sizing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSizeConfig {
    /// When false, images are emitted without measuring
    pub enable: bool,
    #[serde(flatten)]
    pub policies: AttributePolicies,
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Default for ImageSizeConfig {
    fn default() -> Self {
        Self {
            enable: true,
            policies: AttributePolicies::default(),
            fetch: FetchConfig::default(),
        }
    }
}

/// Remote image download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds, 0 for none
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("md-image-size/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Code block highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}

/// Markdown rendering switches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Give headings a slug `id` when they have none
    pub heading_anchors: bool,
    /// Replace `[[toc]]` paragraphs with a table of contents
    pub toc: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            heading_anchors: true,
            toc: true,
        }
    }
}
