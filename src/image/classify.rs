//! Image URL classification

use serde::Serialize;

/// Where an image reference points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlKind {
    /// `http://`, `https://` or protocol-relative `//`
    External,
    /// Rooted at the site source directory
    LocalAbsolute,
    /// Relative to the working directory, or the document on retry
    LocalRelative,
}

impl UrlKind {
    pub fn classify(url: &str) -> Self {
        if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//") {
            UrlKind::External
        } else if url.starts_with('/') {
            UrlKind::LocalAbsolute
        } else {
            UrlKind::LocalRelative
        }
    }
}

/// URL actually requested for an external image
pub fn fetch_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}
