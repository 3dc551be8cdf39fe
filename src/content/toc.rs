//! Table of contents for the `[[toc]]` marker

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

use crate::helpers::html_escape;

/// Paragraph text replaced by the table of contents (case-insensitive)
const TOC_MARKER: &str = "[[toc]]";

struct TocEntry {
    level: usize,
    id: String,
    text: String,
}

/// Replace every `[[toc]]` paragraph with a nested list of the document's
/// headings, levels 1 to 6.
///
/// Headings are linked by their `id`, so this runs after anchors are
/// assigned. Headings without an id are not listed.
pub fn insert_toc(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let markers = marker_paragraphs(&events);
    if markers.is_empty() {
        return events;
    }

    let html = toc_html(&collect_headings(&events));
    let mut markers = markers.into_iter().peekable();
    let mut out = Vec::with_capacity(events.len());

    for (i, event) in events.into_iter().enumerate() {
        match markers.peek() {
            Some(&(start, end)) if i >= start => {
                if i == start {
                    out.push(Event::Html(CowStr::from(html.clone())));
                }
                if i == end {
                    markers.next();
                }
            }
            _ => out.push(event),
        }
    }

    out
}

/// Index ranges of paragraphs holding nothing but the marker text
fn marker_paragraphs(events: &[Event<'_>]) -> Vec<(usize, usize)> {
    let mut found = Vec::new();
    let mut i = 0;

    while i < events.len() {
        if let Event::Start(Tag::Paragraph) = &events[i] {
            // the parser may split bracketed text into several events
            let mut text = String::new();
            let mut j = i + 1;
            while let Some(Event::Text(part)) = events.get(j) {
                text.push_str(part);
                j += 1;
            }
            if matches!(events.get(j), Some(Event::End(TagEnd::Paragraph)))
                && text.trim().eq_ignore_ascii_case(TOC_MARKER)
            {
                found.push((i, j));
                i = j;
            }
        }
        i += 1;
    }

    found
}

fn collect_headings(events: &[Event<'_>]) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    let mut open: Option<TocEntry> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                open = id.as_ref().map(|id| TocEntry {
                    level: *level as usize,
                    id: id.to_string(),
                    text: String::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) => entries.extend(open.take()),
            Event::Text(text) | Event::Code(text) => {
                if let Some(entry) = open.as_mut() {
                    entry.text.push_str(text);
                }
            }
            _ => {}
        }
    }

    entries
}

fn toc_html(entries: &[TocEntry]) -> String {
    let mut html = r#"<ol class="toc">"#.to_string();
    // levels of the lists currently open, outermost first
    let mut open: Vec<usize> = Vec::new();

    for entry in entries {
        match open.last() {
            None => open.push(entry.level),
            Some(&top) if entry.level > top => {
                html.push_str(r#"<ol class="toc-child">"#);
                open.push(entry.level);
            }
            Some(_) => {
                html.push_str("</li>");
                while open.len() > 1 && open.last().is_some_and(|&top| entry.level < top) {
                    open.pop();
                    html.push_str("</ol></li>");
                }
            }
        }

        html.push_str(&format!(
            r##"<li class="toc-item toc-level-{}"><a class="toc-link" href="#{}"><span class="toc-text">{}</span></a>"##,
            entry.level,
            html_escape(&entry.id),
            html_escape(entry.text.trim())
        ));
    }

    if !open.is_empty() {
        html.push_str("</li>");
        for _ in 1..open.len() {
            html.push_str("</ol></li>");
        }
    }
    html.push_str("</ol>");
    html
}
