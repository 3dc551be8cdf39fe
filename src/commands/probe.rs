//! Measure a single image reference

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::image::{ImageSizer, ImageToken, RecordingSink, RenderContext, Resolution, ScaleFactor};
use crate::Site;

/// What `probe --json` prints
#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub src: String,
    #[serde(flatten)]
    pub resolution: Resolution,
    pub scale: Option<u8>,
    pub html: String,
    pub diagnostics: Vec<String>,
}

/// Options for a single probe
#[derive(Debug, Default)]
pub struct ProbeOptions<'a> {
    /// Document the image is referenced from
    pub page: Option<&'a Path>,
    pub alt: &'a str,
    pub title: Option<&'a str>,
}

/// Resolve one image the way the Markdown hook would
pub fn probe(site: &Site, src: &str, options: &ProbeOptions<'_>) -> Result<ProbeReport> {
    let sink = Arc::new(RecordingSink::new());
    let sizer = ImageSizer::with_sink(&site.config, &site.base_dir, sink.clone())?;

    let mut token = ImageToken::new(src, options.alt);
    if let Some(title) = options.title {
        token = token.with_attr("title", title);
    }

    let ctx = options.page.map(RenderContext::new);
    let resolution = sizer.resolver().resolve(src, ctx.as_ref());
    let html = sizer.render_resolved(&token, &resolution);

    Ok(ProbeReport {
        src: src.to_string(),
        resolution,
        scale: ScaleFactor::from_url(src).map(ScaleFactor::value),
        html,
        diagnostics: sink.messages(),
    })
}

/// Print the `<img>` tag, or the full report as JSON
pub fn run(site: &Site, src: &str, options: &ProbeOptions<'_>, json: bool) -> Result<()> {
    let report = probe(site, src, options)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.html);
    }
    Ok(())
}
