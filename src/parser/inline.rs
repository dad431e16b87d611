//! Lexical pass over inline `<script>` and `<style>` text.
//!
//! This does not parse JavaScript or CSS. It catches absolute URLs sitting in
//! script text and `url(...)` references in stylesheets.

use crate::parser::markup::MarkupTree;
use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

static CSS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*["']?(.*?)["']?\s*\)"#).expect("valid regex")
});

/// Collect candidates from inline script and style blocks of `tree`.
pub fn scan(tree: &MarkupTree) -> Vec<String> {
    let mut candidates = Vec::new();

    for script in tree.inline_scripts() {
        candidates.extend(script_urls(&script));
    }

    for style in tree.style_blocks() {
        candidates.extend(css_urls(&style));
    }

    candidates
}

/// Bare absolute URLs in script text.
pub fn script_urls(text: &str) -> Vec<String> {
    SCRIPT_URL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Values of CSS `url(...)` notations, without quotes.
pub fn css_urls(text: &str) -> Vec<String> {
    CSS_URL_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
