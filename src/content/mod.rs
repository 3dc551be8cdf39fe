//! Content module - handles front-matter, documents, Markdown rendering and tables of contents

mod document;
mod frontmatter;
mod markdown;
mod toc;

pub use document::{is_markdown_file, Document, DocumentLoader};
pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
