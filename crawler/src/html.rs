use lazy_static::lazy_static;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

lazy_static! {
    static ref ANCHORS: Selector = Selector::parse("a[href]").expect("valid selector");
}

/// Elements whose text is never page content.
const SKIPPED: &[&str] = &["head", "script", "style", "noscript", "template", "svg"];

/// Visible text of an HTML document, one space between text nodes.
///
/// Entities are decoded by the parser.
pub fn strip_markup(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut text = String::with_capacity(html.len() / 2);
    for node in doc.root_element().descendants() {
        let Some(t) = node.value().as_text() else { continue };
        let hidden = node
            .ancestors()
            .filter_map(|a| a.value().as_element())
            .any(|e| SKIPPED.contains(&e.name()));
        if !hidden {
            text.push_str(t);
            text.push(' ');
        }
    }
    text
}

/// Absolute http(s) links of the page, in document order, without fragments or repeats.
pub fn extract_links(base: &Url, html: &str) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for a in doc.select(&ANCHORS) {
        let Some(h) = a.value().attr("href") else { continue };
        let h = h.trim();
        if let Ok(mut u) = Url::parse(h).or_else(|_| base.join(h)) {
            u.set_fragment(None);
            if matches!(u.scheme(), "http" | "https") && seen.insert(u.to_string()) {
                links.push(u);
            }
        }
    }
    links
}

/// Seen-set key and index location for a URL.
pub fn norm(u: &Url) -> String { let mut s = u.clone(); s.set_fragment(None); s.to_string() }
