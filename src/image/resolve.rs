//! Dimension lookup for local and remote images

use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::classify::{fetch_url, UrlKind};
use super::{Dimensions, Fetcher, ImageError, RenderContext};

/// Outcome of measuring one image reference
#[derive(Debug, Serialize)]
pub struct Resolution {
    pub kind: UrlKind,
    /// Filesystem paths tried, in order (empty for external images)
    pub candidates: Vec<PathBuf>,
    /// URL requested for external images
    pub fetched: Option<String>,
    #[serde(serialize_with = "serialize_dimensions")]
    pub dimensions: Result<Dimensions, ImageError>,
}

fn serialize_dimensions<S>(
    dimensions: &Result<Dimensions, ImageError>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(2))?;
    match dimensions {
        Ok(size) => {
            map.serialize_entry("width", &size.width)?;
            map.serialize_entry("height", &size.height)?;
        }
        Err(err) => {
            map.serialize_entry("error", &err.to_string())?;
        }
    }
    map.end()
}

/// Measures images referenced from Markdown documents
pub struct DimensionResolver {
    base_dir: PathBuf,
    source_dir: String,
    fetcher: Box<dyn Fetcher + Send + Sync>,
}

impl DimensionResolver {
    /// `source_dir` is prefixed to site-absolute URLs as a string, so
    /// `./src` turns `/images/a.png` into `./src/images/a.png`.
    pub fn new<P: AsRef<Path>>(
        base_dir: P,
        source_dir: &str,
        fetcher: Box<dyn Fetcher + Send + Sync>,
    ) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            source_dir: source_dir.trim_end_matches('/').to_string(),
            fetcher,
        }
    }

    pub fn resolve(&self, url: &str, ctx: Option<&RenderContext>) -> Resolution {
        let kind = UrlKind::classify(url);

        if kind == UrlKind::External {
            let target = fetch_url(url);
            let dimensions: Result<Dimensions, ImageError> = self
                .fetcher
                .fetch(&target)
                .and_then(|body| Ok(imagesize::blob_size(&body)?.into()));
            return Resolution {
                kind,
                candidates: Vec::new(),
                fetched: Some(target),
                dimensions,
            };
        }

        let (resolved, retry) = self.candidate_paths(url, kind, ctx);
        let dimensions = measure(&resolved).or_else(|err| match &retry {
            Some(path) => measure(path),
            None => Err(err),
        });
        Resolution {
            kind,
            candidates: std::iter::once(resolved).chain(retry).collect(),
            fetched: None,
            dimensions,
        }
    }

    /// Ordered filesystem locations for a local image.
    ///
    /// The document-relative retry is only added when the first path, as
    /// built from the URL, is not rooted at `/`.
    pub fn candidates(
        &self,
        url: &str,
        kind: UrlKind,
        ctx: Option<&RenderContext>,
    ) -> Vec<PathBuf> {
        let (resolved, retry) = self.candidate_paths(url, kind, ctx);
        std::iter::once(resolved).chain(retry).collect()
    }

    fn candidate_paths(
        &self,
        url: &str,
        kind: UrlKind,
        ctx: Option<&RenderContext>,
    ) -> (PathBuf, Option<PathBuf>) {
        let resolved = match kind {
            UrlKind::LocalAbsolute => format!("{}{}", self.source_dir, url),
            _ => url.to_string(),
        };

        let retry = if resolved.starts_with('/') {
            None
        } else {
            ctx.and_then(RenderContext::directory).map(|dir| {
                let relative = url.trim_start_matches('/');
                self.base_dir.join(format!("{}/{}", dir, decode(relative)))
            })
        };

        (self.base_dir.join(decode(&resolved)), retry)
    }
}

fn measure(path: &Path) -> Result<Dimensions, ImageError> {
    match imagesize::size(path) {
        Ok(size) => {
            tracing::debug!("Measured {:?}: {}x{}", path, size.width, size.height);
            Ok(size.into())
        }
        Err(err) => {
            tracing::debug!("Could not measure {:?}: {}", path, err);
            Err(err.into())
        }
    }
}

fn decode(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}
