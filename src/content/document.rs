//! Document loader - reads one Markdown file and renders it

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{FrontMatter, MarkdownRenderer};
use crate::image::RenderContext;

/// A rendered Markdown document
#[derive(Debug, Clone)]
pub struct Document {
    /// Title from front-matter, or the file stem
    pub title: String,
    pub permalink: Option<String>,
    /// Source path as given
    pub source: PathBuf,
    /// Rendered HTML body
    pub content: String,
}

/// Loads and renders Markdown documents
pub struct DocumentLoader {
    renderer: MarkdownRenderer,
    include_drafts: bool,
}

impl DocumentLoader {
    pub fn new(renderer: MarkdownRenderer, include_drafts: bool) -> Self {
        Self {
            renderer,
            include_drafts,
        }
    }

    /// Render a single file; `None` when the document is an excluded draft
    pub fn load(&self, path: &Path) -> Result<Option<Document>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let (fm, body) = FrontMatter::parse(&content)?;

        if fm.is_excluded(self.include_drafts) {
            tracing::info!("Skipping draft {:?}", path);
            return Ok(None);
        }

        // Get title from front-matter or filename
        let title = fm.title.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
                .to_string()
        });

        let ctx = RenderContext::new(path);
        let html = self.renderer.render(body, Some(&ctx))?;

        Ok(Some(Document {
            title,
            permalink: fm.permalink,
            source: path.to_path_buf(),
            content: html,
        }))
    }
}

/// Check if a file is a markdown file
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::image::fixtures::{self, StubFetcher};
    use crate::image::{AttributePolicies, DimensionResolver, ImageSizer, RecordingSink};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn make_loader(base: &Path, include_drafts: bool) -> (DocumentLoader, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let resolver =
            DimensionResolver::new(base, "./src", Box::new(StubFetcher::failing("offline")));
        let sizer = ImageSizer::new(resolver, AttributePolicies::default(), sink.clone());
        let renderer = MarkdownRenderer::from_config(&SiteConfig::default(), Arc::new(sizer));
        (DocumentLoader::new(renderer, include_drafts), sink)
    }

    #[test]
    fn test_render_document_with_images() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path();
        fixtures::write(&base.join("src/images/hero_2x.png"), &fixtures::png_bytes(1600, 900));
        fixtures::write(&base.join("src/posts/trip/map.gif"), &fixtures::gif_bytes(120, 80));
        let doc_path = base.join("src/posts/trip/index.md");
        fixtures::write(
            &doc_path,
            b"---\ntitle: Trip\npermalink: /trip/\n---\n![Hero](/images/hero_2x.png)\n\n![Map](map.gif \"Route\")\n\n![Lost](nowhere.png)\n",
        );

        let (loader, sink) = make_loader(base, false);
        let doc = loader.load(&doc_path).unwrap().unwrap();

        assert_eq!(doc.title, "Trip");
        assert_eq!(doc.permalink.as_deref(), Some("/trip/"));
        assert!(doc.content.contains(
            r#"<img src="/images/hero_2x.png" alt="Hero" width="800" height="450">"#
        ));
        assert!(doc
            .content
            .contains(r#"<img src="map.gif" alt="Map" width="120" height="80" title="Route">"#));
        assert!(doc
            .content
            .contains(r#"<img src="nowhere.png" alt="Lost">"#));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_draft_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let doc_path = tmp.path().join("draft.md");
        fixtures::write(&doc_path, b"---\ndraft: true\n---\n# WIP\n");

        let (loader, _) = make_loader(tmp.path(), false);
        assert!(loader.load(&doc_path).unwrap().is_none());

        let (loader, _) = make_loader(tmp.path(), true);
        let doc = loader.load(&doc_path).unwrap().unwrap();
        assert_eq!(doc.title, "draft");
        assert!(doc.content.contains("WIP"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let (loader, _) = make_loader(tmp.path(), false);
        assert!(loader.load(&tmp.path().join("missing.md")).is_err());
    }

    #[test]
    fn test_is_markdown_file() {
        assert!(is_markdown_file(Path::new("a/b.md")));
        assert!(is_markdown_file(Path::new("b.markdown")));
        assert!(!is_markdown_file(Path::new("b.html")));
    }
}
