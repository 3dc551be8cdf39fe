//! Markdown rendering with image sizing and syntax highlighting

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::collections::HashSet;
use std::sync::Arc;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::toc::insert_toc;
use crate::config::SiteConfig;
use crate::helpers::html_escape;
use crate::image::{ImageRenderer, ImageToken, PlainImageRenderer, RenderContext};

/// Markdown renderer with a pluggable image hook
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
    highlight: bool,
    heading_anchors: bool,
    toc: bool,
    images: Arc<dyn ImageRenderer + Send + Sync>,
}

/// Image being collected between its start and end events
struct PendingImage {
    src: String,
    title: String,
    alt: String,
}

impl PendingImage {
    fn into_token(self) -> ImageToken {
        let token = ImageToken::new(self.src, self.alt);
        if self.title.is_empty() {
            token
        } else {
            token.with_attr("title", self.title)
        }
    }
}

/// Heading waiting for its text to compute an anchor id
struct PendingHeading<'a> {
    level: HeadingLevel,
    classes: Vec<CowStr<'a>>,
    attrs: Vec<(CowStr<'a>, Option<CowStr<'a>>)>,
    inner: Vec<Event<'a>>,
    text: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", true)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
            highlight: true,
            heading_anchors: true,
            toc: true,
            images: Arc::new(PlainImageRenderer),
        }
    }

    /// Create from site configuration with the given image hook
    pub fn from_config(config: &SiteConfig, images: Arc<dyn ImageRenderer + Send + Sync>) -> Self {
        let mut renderer =
            Self::with_options(&config.highlight.theme, config.highlight.line_number);
        renderer.highlight = config.highlight.enable;
        renderer.heading_anchors = config.markdown.heading_anchors;
        renderer.toc = config.markdown.toc;
        renderer.images = images;
        renderer
    }

    /// Replace the image hook
    pub fn with_image_renderer(mut self, images: Arc<dyn ImageRenderer + Send + Sync>) -> Self {
        self.images = images;
        self
    }

    /// Render markdown to HTML
    ///
    /// `ctx` is handed to the image hook for every image in the document.
    pub fn render(&self, markdown: &str, ctx: Option<&RenderContext>) -> Result<String> {
        // Front-matter is stripped by FrontMatter::parse() before we get here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_DEFINITION_LIST
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;
        let mut image: Option<PendingImage> = None;
        // images nested inside an image's alt text
        let mut nested_images = 0usize;

        for event in parser {
            if image.is_some() {
                match event {
                    Event::Start(Tag::Image { .. }) => nested_images += 1,
                    Event::End(TagEnd::Image) if nested_images > 0 => nested_images -= 1,
                    Event::End(TagEnd::Image) => {
                        if let Some(pending) = image.take() {
                            let token = pending.into_token();
                            let html = self.images.render_image(&token, ctx);
                            events.push(Event::InlineHtml(CowStr::from(html)));
                        }
                    }
                    Event::Text(text) | Event::Code(text) => {
                        if let Some(pending) = image.as_mut() {
                            pending.alt.push_str(&text);
                        }
                    }
                    Event::SoftBreak | Event::HardBreak => {
                        if let Some(pending) = image.as_mut() {
                            pending.alt.push(' ');
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    image = Some(PendingImage {
                        src: dest_url.to_string(),
                        title: title.to_string(),
                        alt: String::new(),
                    });
                }
                Event::Start(Tag::CodeBlock(kind)) if self.highlight => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) if code_block.is_some() => {
                    if let Some((lang, content)) = code_block.take() {
                        let highlighted = self.highlight_code(&content, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, content)) = code_block.as_mut() {
                        content.push_str(&text);
                    }
                }
                other => events.push(other),
            }
        }

        let events = if self.heading_anchors {
            add_heading_ids(events)
        } else {
            events
        };
        let events = if self.toc { insert_toc(events) } else { events };

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang, highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang,
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");
        let code_lines = lines.join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
            lang, gutter, code_lines
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Give every heading without an explicit `{#id}` a unique slug id
fn add_heading_ids(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut used: HashSet<String> = HashSet::new();
    let mut heading: Option<PendingHeading> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading {
                level,
                id: None,
                classes,
                attrs,
            }) => {
                heading = Some(PendingHeading {
                    level,
                    classes,
                    attrs,
                    inner: Vec::new(),
                    text: String::new(),
                });
            }
            Event::Start(Tag::Heading {
                level,
                id: Some(id),
                classes,
                attrs,
            }) => {
                used.insert(id.to_string());
                out.push(Event::Start(Tag::Heading {
                    level,
                    id: Some(id),
                    classes,
                    attrs,
                }));
            }
            Event::End(TagEnd::Heading(level)) => {
                if let Some(open) = heading.take() {
                    let id = unique_slug(&open.text, &mut used);
                    out.push(Event::Start(Tag::Heading {
                        level: open.level,
                        id: Some(CowStr::from(id)),
                        classes: open.classes,
                        attrs: open.attrs,
                    }));
                    out.extend(open.inner);
                }
                out.push(Event::End(TagEnd::Heading(level)));
            }
            other => match heading.as_mut() {
                Some(open) => {
                    if let Event::Text(text) | Event::Code(text) = &other {
                        open.text.push_str(text);
                    }
                    open.inner.push(other);
                }
                None => out.push(other),
            },
        }
    }

    out
}

fn unique_slug(text: &str, used: &mut HashSet<String>) -> String {
    let base = match slug::slugify(text) {
        s if s.is_empty() => "section".to_string(),
        s => s,
    };

    let mut candidate = base.clone();
    let mut n = 0;
    while used.contains(&candidate) {
        n += 1;
        candidate = format!("{}-{}", base, n);
    }
    used.insert(candidate.clone());
    candidate
}
