use lazy_static::lazy_static;
use reviewdex_core::config::SourceConfig;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

lazy_static! {
    static ref LINK: Selector = Selector::parse("a[href]").expect("valid selector");
}

/// Article urls listed on a catalog page, absolute, de-duplicated, in page order.
///
/// A link qualifies when its href contains the source's link marker, is not a
/// comments anchor, and does not point back into the catalog section itself.
pub fn discover_links(html: &str, source: &SourceConfig) -> Vec<String> {
    let Ok(base) = Url::parse(&source.base) else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for a in doc.select(&LINK) {
        let Some(href) = a.value().attr("href") else { continue };
        if !href.contains(&source.link_marker) || href.contains("#comments") {
            continue;
        }
        let Ok(resolved) = base.join(href) else { continue };
        let resolved = resolved.to_string();
        if resolved.contains(&source.section) {
            continue;
        }
        if seen.insert(resolved.clone()) {
            links.push(resolved);
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SourceConfig {
        SourceConfig {
            name: "kanobu".into(),
            base: "https://kanobu.ru".into(),
            section: "anime-reviews".into(),
            link_marker: "/reviews/".into(),
        }
    }

    #[test]
    fn finds_review_links_only() {
        let html = r##"
            <a href="/reviews/frieren-123/">Frieren</a>
            <a href="https://kanobu.ru/reviews/mushoku-456/">Mushoku</a>
            <a href="/reviews/frieren-123/">Frieren again</a>
            <a href="/reviews/frieren-123/#comments">comments</a>
            <a href="/anime-reviews/?page=2">next page</a>
            <a href="/news/something/">news</a>
            <a>no href</a>
        "##;
        assert_eq!(
            discover_links(html, &source()),
            vec!["https://kanobu.ru/reviews/frieren-123/", "https://kanobu.ru/reviews/mushoku-456/"]
        );
    }

    #[test]
    fn empty_page_has_no_links() {
        assert!(discover_links("<html><body><p>nothing</p></body></html>", &source()).is_empty());
    }
}
