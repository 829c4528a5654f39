//! Title and body extraction for review pages.
//!
//! The body comes from the first strategy in [`STRATEGIES`] that yields
//! non-empty text. Extraction never fails: a page with no recognizable
//! structure simply produces an empty body.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

pub const NO_TITLE: &str = "No Title";

/// Paragraphs must be longer than this to count in the fallback strategy.
const MIN_PARAGRAPH_CHARS: usize = 50;

/// Subtrees that never contribute text.
const SKIPPED_TAGS: &[&str] = &["script", "style", "iframe", "figure"];

/// Site-template body classes, tried in order.
const BODY_CLASSES: &[&str] = &[
    "c-entry__body",
    "article__body",
    "content-body",
    "js-mediator-article",
    "article-content",
    "c-editor-content",
    "doc__body",
    "post-content",
];

lazy_static! {
    static ref ARTICLE_BODY: Selector = Selector::parse(r#"[itemprop~="articleBody"]"#).expect("valid selector");
    static ref CLASS_SELECTORS: Vec<Selector> = BODY_CLASSES
        .iter()
        .map(|c| Selector::parse(&format!(".{c}")).expect("valid selector"))
        .collect();
    static ref ARTICLE: Selector = Selector::parse("article").expect("valid selector");
    static ref PARAGRAPH: Selector = Selector::parse("p").expect("valid selector");
    static ref H1: Selector = Selector::parse("h1").expect("valid selector");
}

pub type Strategy = fn(&Html) -> Option<String>;

pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("item-prop", by_item_prop),
    ("body-class", by_body_class),
    ("article-tag", by_article_tag),
    ("long-paragraphs", by_long_paragraphs),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub title: String,
    pub body: String,
    /// Name of the strategy that produced `body`, `None` when all came up empty.
    pub strategy: Option<&'static str>,
}

pub fn extract(html: &str) -> Extracted {
    let doc = Html::parse_document(html);
    let title = doc
        .select(&H1)
        .next()
        .map(|h| stripped_fragments(h).concat())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    for (name, strategy) in STRATEGIES {
        if let Some(body) = strategy(&doc) {
            return Extracted { title, body, strategy: Some(*name) };
        }
    }
    Extracted { title, body: String::new(), strategy: None }
}

fn by_item_prop(doc: &Html) -> Option<String> {
    doc.select(&ARTICLE_BODY).next().and_then(container_text)
}

fn by_body_class(doc: &Html) -> Option<String> {
    CLASS_SELECTORS
        .iter()
        .find_map(|sel| doc.select(sel).next())
        .and_then(container_text)
}

fn by_article_tag(doc: &Html) -> Option<String> {
    doc.select(&ARTICLE).next().and_then(container_text)
}

fn by_long_paragraphs(doc: &Html) -> Option<String> {
    let paragraphs: Vec<String> = doc
        .select(&PARAGRAPH)
        .map(|p| stripped_fragments(p).concat())
        .filter(|t| t.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect();
    non_empty(paragraphs.join(" "))
}

/// Text of a container with skipped subtrees removed, fragments joined by one space.
fn container_text(el: ElementRef<'_>) -> Option<String> {
    let mut parts = Vec::new();
    collect_visible(el, &mut parts);
    non_empty(parts.join(" "))
}

fn collect_visible(el: ElementRef<'_>, parts: &mut Vec<String>) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            let t = text.trim();
            if !t.is_empty() {
                parts.push(t.to_string());
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !SKIPPED_TAGS.contains(&child_el.value().name()) {
                collect_visible(child_el, parts);
            }
        }
    }
}

fn stripped_fragments(el: ElementRef<'_>) -> Vec<&str> {
    el.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
