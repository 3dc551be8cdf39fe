//! CLI entry point for md-image-size

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use md_image_size::commands::probe::ProbeOptions;

#[derive(Parser)]
#[command(name = "md-image-size")]
#[command(version)]
#[command(about = "Render Markdown with measured <img> width and height", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Markdown file to HTML
    #[command(alias = "r")]
    Render {
        /// Markdown file to render
        input: PathBuf,

        /// Write HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render documents marked `draft: true`
        #[arg(long)]
        drafts: bool,
    },

    /// Resolve a single image reference and print its <img> tag
    Probe {
        /// Image URL as written in Markdown
        src: String,

        /// Markdown file the image is referenced from
        #[arg(short, long)]
        page: Option<PathBuf>,

        /// Alt text
        #[arg(long, default_value = "")]
        alt: String,

        /// Title attribute
        #[arg(long)]
        title: Option<String>,

        /// Print the full resolution report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "md_image_size=debug,info"
    } else {
        "md_image_size=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Render {
            input,
            output,
            drafts,
        } => {
            let site = md_image_size::Site::new(&base_dir)?;
            tracing::info!("Rendering {:?}", input);
            site.render(&input, output.as_deref(), drafts)?;
        }

        Commands::Probe {
            src,
            page,
            alt,
            title,
            json,
        } => {
            let site = md_image_size::Site::new(&base_dir)?;
            let options = ProbeOptions {
                page: page.as_deref(),
                alt: &alt,
                title: title.as_deref(),
            };
            md_image_size::commands::probe::run(&site, &src, &options, json)?;
        }

        Commands::Version => {
            println!("md-image-size version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
