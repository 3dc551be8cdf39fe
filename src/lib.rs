//! md-image-size: Markdown rendering with measured image dimensions
//!
//! Every image in a Markdown document is routed through an image hook that
//! reads the referenced file (or downloads the remote URL), measures it, and
//! writes an `<img>` tag with explicit `width` and `height`. Filenames with a
//! density suffix such as `photo_2x.png` are declared at their logical size.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod image;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::content::MarkdownRenderer;
use crate::image::{DiagnosticSink, ImageRenderer, ImageSizer, PlainImageRenderer, TracingSink};

/// A site rooted at a base directory
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory; relative image paths are read from here
    pub base_dir: std::path::PathBuf,
}

impl Site {
    /// Create a new site from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            tracing::debug!("Loading configuration from {:?}", config_path);
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self { config, base_dir })
    }

    /// Resolve a command-line path against the base directory
    pub fn resolve_path(&self, path: &Path) -> std::path::PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Image hook reporting failures to `sink`
    pub fn image_renderer(
        &self,
        sink: Arc<dyn DiagnosticSink + Send + Sync>,
    ) -> Result<Arc<dyn ImageRenderer + Send + Sync>> {
        if !self.config.image_size.enable {
            return Ok(Arc::new(PlainImageRenderer));
        }
        Ok(Arc::new(ImageSizer::with_sink(
            &self.config,
            &self.base_dir,
            sink,
        )?))
    }

    /// Markdown renderer with the image hook installed
    pub fn markdown_renderer(&self) -> Result<MarkdownRenderer> {
        let images = self.image_renderer(Arc::new(TracingSink))?;
        Ok(MarkdownRenderer::from_config(&self.config, images))
    }

    /// Render a Markdown file
    pub fn render(&self, input: &Path, output: Option<&Path>, include_drafts: bool) -> Result<()> {
        commands::render::run(self, input, output, include_drafts)
    }
}
