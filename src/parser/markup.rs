//! HTML scanner built on `scraper` (html5ever).
//!
//! Parsing never fails: html5ever recovers from anything, and the number of
//! recovered errors is reported through [`ParseStatus`].

use crate::types::ParseStatus;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::trace;

/// Elements known to carry resource references, with the attribute holding them.
pub const LINK_ATTRIBUTES: &[(&str, &str)] = &[
    ("a", "href"),
    ("link", "href"),
    ("script", "src"),
    ("img", "src"),
    ("iframe", "src"),
];

static LINK_SELECTORS: LazyLock<Vec<(Selector, &'static str)>> = LazyLock::new(|| {
    LINK_ATTRIBUTES
        .iter()
        .map(|(tag, attr)| {
            let selector = Selector::parse(&format!("{}[{}]", tag, attr))
                .expect("link selector table holds valid selectors");
            (selector, *attr)
        })
        .collect()
});

static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid selector"));

static STYLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("style").expect("valid selector"));

/// A `<script>` element as the extractor sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptElement {
    /// Non-empty `src` attribute.
    External(String),
    /// Literal script text.
    Inline(String),
}

/// Parsed markup, shared by the scanners that work on one page.
pub struct MarkupTree {
    document: Html,
}

impl MarkupTree {
    /// All `<script>` elements that reference or contain code, in document order.
    ///
    /// A script with both a `src` and a body counts as external, as in a browser.
    pub fn scripts(&self) -> Vec<ScriptElement> {
        self.document
            .select(&SCRIPT_SELECTOR)
            .filter_map(|el| {
                if let Some(src) = external_src(&el) {
                    return Some(ScriptElement::External(src.to_string()));
                }
                element_text(&el).map(ScriptElement::Inline)
            })
            .collect()
    }

    /// Text of inline scripts only.
    pub fn inline_scripts(&self) -> impl Iterator<Item = String> + '_ {
        self.document
            .select(&SCRIPT_SELECTOR)
            .filter(|el| external_src(el).is_none())
            .filter_map(|el| element_text(&el))
    }

    /// Text of every `<style>` block.
    pub fn style_blocks(&self) -> impl Iterator<Item = String> + '_ {
        self.document
            .select(&STYLE_SELECTOR)
            .filter_map(|el| element_text(&el))
    }
}

/// Result of [`scan`].
pub struct MarkupScan {
    pub tree: MarkupTree,
    pub candidates: Vec<String>,
    pub status: ParseStatus,
}

/// Parse `markup` and collect the values of link-bearing attributes.
pub fn scan(markup: &str) -> MarkupScan {
    let document = Html::parse_document(markup);
    let status = ParseStatus::from_error_count(document.errors.len());

    if let ParseStatus::Degraded { errors } = status {
        trace!("Markup parsed with {} recovered errors", errors);
    }

    let mut candidates = Vec::new();
    for (selector, attr) in LINK_SELECTORS.iter() {
        for el in document.select(selector) {
            if let Some(value) = el.value().attr(attr) {
                candidates.push(value.to_string());
            }
        }
    }

    MarkupScan {
        tree: MarkupTree { document },
        candidates,
        status,
    }
}

fn external_src<'a>(el: &ElementRef<'a>) -> Option<&'a str> {
    el.value().attr("src").filter(|src| !src.trim().is_empty())
}

fn element_text(el: &ElementRef<'_>) -> Option<String> {
    let text: String = el.text().collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_every_link_attribute() {
        let html = r#"
            <html><head>
                <link rel="stylesheet" href="/css/site.css">
                <script src="/js/app.js"></script>
            </head><body>
                <a href="/page2">x</a>
                <img src="logo.png">
                <iframe src="https://frames.example.com/embed"></iframe>
                <a name="no-href">anchor</a>
            </body></html>
        "#;

        let scan = scan(html);
        let mut candidates = scan.candidates.clone();
        candidates.sort();

        assert_eq!(
            candidates,
            vec![
                "/css/site.css",
                "/js/app.js",
                "/page2",
                "https://frames.example.com/embed",
                "logo.png",
            ]
        );
    }

    #[test]
    fn test_empty_attribute_is_emitted() {
        let scan = scan(r#"<a href="">self</a>"#);
        assert_eq!(scan.candidates, vec![String::new()]);
    }

    #[test]
    fn test_malformed_markup_is_tolerated() {
        let scan = scan(r#"<div><a href="/ok">unclosed <p><img src="/i.png"</div></span>"#);
        assert!(scan.candidates.contains(&"/ok".to_string()));
        assert_ne!(scan.status, ParseStatus::Failed);
    }

    #[test]
    fn test_garbage_input_yields_no_candidates() {
        let scan = scan("\u{0}\u{1}<<<>>>");
        assert!(scan.candidates.is_empty());
        assert!(scan.tree.scripts().is_empty());
    }

    #[test]
    fn test_scripts_split_external_and_inline() {
        let html = r#"
            <script src="/a.js"></script>
            <script>var a = 1;</script>
            <script src="">var b = 2;</script>
            <script>   </script>
            <script src="/c.js">ignored()</script>
        "#;

        let scan = scan(html);
        assert_eq!(
            scan.tree.scripts(),
            vec![
                ScriptElement::External("/a.js".to_string()),
                ScriptElement::Inline("var a = 1;".to_string()),
                ScriptElement::Inline("var b = 2;".to_string()),
                ScriptElement::External("/c.js".to_string()),
            ]
        );
        assert_eq!(scan.tree.inline_scripts().count(), 2);
    }

    #[test]
    fn test_style_blocks() {
        let scan = scan("<style>body{color:red}</style><style></style>");
        let blocks: Vec<_> = scan.tree.style_blocks().collect();
        assert_eq!(blocks, vec!["body{color:red}"]);
    }
}
