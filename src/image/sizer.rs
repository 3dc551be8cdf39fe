//! The image renderer installed into the Markdown pipeline

use std::path::Path;
use std::sync::Arc;

use super::{
    AttributePolicies, DiagnosticSink, DimensionResolver, HttpFetcher, ImageError,
    ImageRenderer, ImageToken, RenderContext, Resolution, ScaleFactor,
};
use crate::config::SiteConfig;

/// Emits `<img>` tags with measured `width` and `height`.
///
/// Holds no per-call state; rendering the same token twice gives the same
/// string as long as the image itself is unchanged.
pub struct ImageSizer {
    resolver: DimensionResolver,
    policies: AttributePolicies,
    sink: Arc<dyn DiagnosticSink + Send + Sync>,
}

impl ImageSizer {
    pub fn new(
        resolver: DimensionResolver,
        policies: AttributePolicies,
        sink: Arc<dyn DiagnosticSink + Send + Sync>,
    ) -> Self {
        Self {
            resolver,
            policies,
            sink,
        }
    }

    /// Production setup: HTTP fetcher reading `config`, failures sent to `sink`
    pub fn with_sink<P: AsRef<Path>>(
        config: &SiteConfig,
        base_dir: P,
        sink: Arc<dyn DiagnosticSink + Send + Sync>,
    ) -> Result<Self, ImageError> {
        let fetcher = HttpFetcher::new(&config.image_size.fetch)?;
        let resolver = DimensionResolver::new(base_dir, &config.source_dir, Box::new(fetcher));
        Ok(Self::new(resolver, config.image_size.policies.clone(), sink))
    }

    pub fn resolver(&self) -> &DimensionResolver {
        &self.resolver
    }

    /// Render from an already computed resolution
    pub fn render_resolved(&self, token: &ImageToken, resolution: &Resolution) -> String {
        let size = match &resolution.dimensions {
            Ok(dims) => Some(match ScaleFactor::from_url(token.src()) {
                Some(scale) => scale.apply(dims.width, dims.height),
                None => (dims.width as f64, dims.height as f64),
            }),
            Err(err) => {
                self.sink.report(&format!(
                    "Could not get dimensions of image with url {}: {}",
                    token.src(),
                    err
                ));
                None
            }
        };

        self.policies.render_tag(token, size)
    }
}

impl ImageRenderer for ImageSizer {
    fn render_image(&self, token: &ImageToken, ctx: Option<&RenderContext>) -> String {
        let resolution = self.resolver.resolve(token.src(), ctx);
        self.render_resolved(token, &resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::fixtures::{self, StubFetcher};
    use crate::image::RecordingSink;
    use tempfile::TempDir;

    fn sizer(base: &Path, fetcher: Arc<StubFetcher>) -> (ImageSizer, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let resolver = DimensionResolver::new(base, "./src", Box::new(fetcher));
        let sizer = ImageSizer::new(resolver, AttributePolicies::default(), sink.clone());
        (sizer, sink)
    }

    #[test]
    fn test_scaled_local_image() {
        let tmp = TempDir::new().unwrap();
        fixtures::write(
            &tmp.path().join("images/photo_2x.png"),
            &fixtures::png_bytes(800, 600),
        );

        let (sizer, sink) = sizer(tmp.path(), StubFetcher::failing("offline"));
        let html = sizer.render_image(&ImageToken::new("images/photo_2x.png", "Photo"), None);

        assert_eq!(
            html,
            r#"<img src="images/photo_2x.png" alt="Photo" width="400" height="300">"#
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_last_scale_marker_applies() {
        let tmp = TempDir::new().unwrap();
        fixtures::write(
            &tmp.path().join("images/a_1x_b_3x.gif"),
            &fixtures::gif_bytes(90, 60),
        );

        let (sizer, _) = sizer(tmp.path(), StubFetcher::failing("offline"));
        let html = sizer.render_image(&ImageToken::new("images/a_1x_b_3x.gif", ""), None);

        assert!(html.contains(r#"width="30" height="20""#));
    }

    #[test]
    fn test_missing_image_degrades() {
        let tmp = TempDir::new().unwrap();
        let (sizer, sink) = sizer(tmp.path(), StubFetcher::failing("offline"));

        let html = sizer.render_image(&ImageToken::new("images/missing.png", "gone"), None);

        assert_eq!(html, r#"<img src="images/missing.png" alt="gone">"#);
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("images/missing.png"));
        assert!(messages[0].contains("failed to read image"));
    }

    #[test]
    fn test_attribute_escaping_asymmetry() {
        let tmp = TempDir::new().unwrap();
        fixtures::write(&tmp.path().join("a.png"), &fixtures::png_bytes(10, 10));

        let (sizer, _) = sizer(tmp.path(), StubFetcher::failing("offline"));
        let token = ImageToken::new("a.png", "alt & text")
            .with_attr("title", r#"A "quoted" title"#)
            .with_attr("class", "<script>");
        let html = sizer.render_image(&token, None);

        assert_eq!(
            html,
            r#"<img src="a.png" alt="alt &amp; text" width="10" height="10" title="A &quot;quoted&quot; title" class="<script>">"#
        );
    }

    #[test]
    fn test_repeated_render_is_stable() {
        let tmp = TempDir::new().unwrap();
        fixtures::write(&tmp.path().join("src/img/logo.png"), &fixtures::png_bytes(64, 32));

        let (sizer, _) = sizer(tmp.path(), StubFetcher::failing("offline"));
        let token = ImageToken::new("/img/logo.png", "Logo");
        let first = sizer.render_image(&token, None);
        let second = sizer.render_image(&token, None);

        assert_eq!(first, second);
        assert!(first.contains(r#"width="64" height="32""#));
    }

    #[test]
    fn test_external_image_dimensions() {
        let tmp = TempDir::new().unwrap();
        let fetcher = StubFetcher::serving(fixtures::png_bytes(1024, 512));
        let (sizer, sink) = sizer(tmp.path(), fetcher.clone());

        let html = sizer.render_image(&ImageToken::new("//cdn.example.com/hero.png", ""), None);

        assert_eq!(fetcher.requested(), vec!["https://cdn.example.com/hero.png"]);
        assert_eq!(
            html,
            r#"<img src="//cdn.example.com/hero.png" alt="" width="1024" height="512">"#
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_external_failure_degrades() {
        let tmp = TempDir::new().unwrap();
        let (sizer, sink) = sizer(tmp.path(), StubFetcher::failing("connection reset"));

        let html = sizer.render_image(&ImageToken::new("https://example.com/x_2x.png", "x"), None);

        assert_eq!(html, r#"<img src="https://example.com/x_2x.png" alt="x">"#);
        assert_eq!(sink.len(), 1);
        assert!(sink.messages()[0].contains("https://example.com/x_2x.png"));
    }

    #[test]
    fn test_relative_image_next_to_document() {
        let tmp = TempDir::new().unwrap();
        fixtures::write(
            &tmp.path().join("src/posts/trip/map_2x.png"),
            &fixtures::png_bytes(500, 250),
        );

        let (sizer, sink) = sizer(tmp.path(), StubFetcher::failing("offline"));
        let ctx = RenderContext::new("./src/posts/trip/index.md");
        let html = sizer.render_image(&ImageToken::new("map_2x.png", "Map"), Some(&ctx));

        assert!(html.contains(r#"width="250" height="125""#));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_with_sink_reads_config() {
        let tmp = TempDir::new().unwrap();
        fixtures::write(&tmp.path().join("public/a.gif"), &fixtures::gif_bytes(7, 9));

        let mut config = SiteConfig::default();
        config.source_dir = "public".to_string();
        let sink = Arc::new(RecordingSink::new());
        let sizer = ImageSizer::with_sink(&config, tmp.path(), sink.clone()).unwrap();

        let html = sizer.render_image(&ImageToken::new("/a.gif", ""), None);
        assert!(html.contains(r#"width="7" height="9""#));
        assert!(sink.is_empty());
    }
}
