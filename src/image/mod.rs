//! Image sizing hook for the Markdown renderer
//!
//! Every image token the Markdown engine produces is routed through an
//! [`ImageRenderer`]. The production implementation, [`ImageSizer`],
//! measures the referenced image (local file or remote URL) and emits an
//! `<img>` tag carrying explicit `width` and `height` attributes so the
//! browser can reserve layout space before the image loads.

mod attrs;
mod classify;
mod diagnostics;
mod fetch;
mod resolve;
mod scale;
mod sizer;

#[cfg(test)]
pub(crate) mod fixtures;

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use attrs::{AttributePolicies, EscapePolicy};
pub use classify::UrlKind;
pub use diagnostics::{DiagnosticSink, RecordingSink, TracingSink};
pub use fetch::{Fetcher, HttpFetcher};
pub use resolve::{DimensionResolver, Resolution};
pub use scale::ScaleFactor;
pub use sizer::ImageSizer;

/// Error raised while measuring an image
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported image format")]
    Unsupported,
    #[error("failed to inspect image: {0}")]
    Probe(String),
    #[error("failed to fetch image: {0}")]
    Fetch(#[from] reqwest::Error),
}

impl From<imagesize::ImageError> for ImageError {
    fn from(err: imagesize::ImageError) -> Self {
        match err {
            imagesize::ImageError::NotSupported => ImageError::Unsupported,
            imagesize::ImageError::CorruptedImage => {
                ImageError::Probe("corrupted image".to_string())
            }
            imagesize::ImageError::IoError(err) => ImageError::Io(err),
        }
    }
}

/// An image element as handed over by the Markdown engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageToken {
    /// Ordered attributes, `src` and `alt` included
    attrs: IndexMap<String, String>,
}

impl ImageToken {
    /// Create a token with the two mandatory attributes
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        let mut attrs = IndexMap::new();
        attrs.insert("src".to_string(), src.into());
        attrs.insert("alt".to_string(), alt.into());
        Self { attrs }
    }

    /// Add (or replace) an attribute, keeping first-insertion order
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn src(&self) -> &str {
        self.attrs.get("src").map(String::as_str).unwrap_or_default()
    }

    pub fn alt(&self) -> &str {
        self.attrs.get("alt").map(String::as_str).unwrap_or_default()
    }

    pub fn title(&self) -> Option<&str> {
        self.attrs.get("title").map(String::as_str)
    }

    /// All attributes in token order
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Per-document information available to the hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Path of the Markdown file being rendered
    pub input_path: PathBuf,
}

impl RenderContext {
    pub fn new<P: AsRef<Path>>(input_path: P) -> Self {
        Self {
            input_path: input_path.as_ref().to_path_buf(),
        }
    }

    /// Directory of the document, used as the base for relative retries.
    ///
    /// Everything before the last `/`, with `/./` segments collapsed.
    pub fn directory(&self) -> Option<String> {
        let path = self.input_path.to_string_lossy().replace('\\', "/");
        let dir = &path[..path.rfind('/')?];
        if dir.is_empty() {
            return None;
        }

        let mut dir = dir.to_string();
        while dir.contains("/./") {
            dir = dir.replace("/./", "/");
        }
        Some(dir)
    }
}

/// Pixel size of an image as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl From<imagesize::ImageSize> for Dimensions {
    fn from(size: imagesize::ImageSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

/// Something that can turn an image token into HTML.
///
/// This is the single extension point the Markdown renderer exposes for
/// images; implementations must not fail.
pub trait ImageRenderer {
    fn render_image(&self, token: &ImageToken, ctx: Option<&RenderContext>) -> String;
}

/// Plain `<img>` output with no measuring, used when sizing is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainImageRenderer;

impl ImageRenderer for PlainImageRenderer {
    fn render_image(&self, token: &ImageToken, _ctx: Option<&RenderContext>) -> String {
        AttributePolicies::default().render_tag(token, None)
    }
}
