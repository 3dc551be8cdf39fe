//! Render a Markdown file to HTML

use anyhow::Result;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Once;

use crate::content::{is_markdown_file, DocumentLoader};
use crate::Site;

/// Environment variable that turns drafts on for a run
pub const BUILD_DRAFTS_ENV: &str = "BUILD_DRAFTS";

static DRAFTS_LOGGED: Once = Once::new();

/// Whether drafts are rendered, from the CLI flag or `BUILD_DRAFTS=true`
pub fn drafts_enabled(flag: bool) -> bool {
    let enabled = flag || std::env::var(BUILD_DRAFTS_ENV).is_ok_and(|v| v == "true");

    DRAFTS_LOGGED.call_once(|| {
        let text = if enabled { "Including" } else { "Excluding" };
        tracing::info!("{} drafts.", text);
    });

    enabled
}

/// Render `input`, writing the HTML body to `output` or stdout
pub fn run(site: &Site, input: &Path, output: Option<&Path>, include_drafts: bool) -> Result<()> {
    let start = std::time::Instant::now();

    let input = site.resolve_path(input);
    if !is_markdown_file(&input) {
        tracing::warn!("{:?} does not have a Markdown extension", input);
    }

    let loader = DocumentLoader::new(site.markdown_renderer()?, drafts_enabled(include_drafts));
    let Some(document) = loader.load(&input)? else {
        return Ok(());
    };

    match output.map(|path| site.resolve_path(path)) {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &document.content)?;
            tracing::info!("Wrote {:?}", path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(document.content.as_bytes())?;
            stdout.flush()?;
        }
    }

    let duration = start.elapsed();
    tracing::info!("Rendered {:?} in {:.2}s", input, duration.as_secs_f64());

    Ok(())
}
