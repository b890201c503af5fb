//! Act-level metadata visible on a landing page.

use std::sync::LazyLock;

use lexitalia_core::ActStatus;
use regex::Regex;

use crate::clean::plain_text;
use crate::markup::elements_with_class;

static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("title pattern must compile")
});

/// Classes Normattiva has used for the vigency badge.
const STATUS_CLASSES: &[&str] = &["stato-vigenza", "vigenza", "badge-vigenza", "abrogato"];

/// Badge phrases, most specific first: "non ancora in vigore" contains
/// "in vigore".
const STATUS_PHRASES: &[(&str, ActStatus)] = &[
    ("abrogat", ActStatus::Repealed),
    ("non ancora in vigore", ActStatus::NotYetInForce),
    ("modificat", ActStatus::Amended),
    ("in vigore", ActStatus::InForce),
    ("vigente", ActStatus::InForce),
];

fn classify(text: &str) -> Option<ActStatus> {
    let lower = text.to_lowercase();
    STATUS_PHRASES
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(_, status)| *status)
}

/// Lifecycle status from the vigency badge, if the page shows one.
pub fn detect_status(html: &str) -> Option<ActStatus> {
    STATUS_CLASSES.iter().find_map(|class| {
        elements_with_class(html, class).iter().find_map(|el| {
            let text = plain_text(el.inner);
            // A bare `abrogato` marker carries no text of its own.
            if text.is_empty() && *class == "abrogato" {
                return Some(ActStatus::Repealed);
            }
            classify(&text)
        })
    })
}

/// Document `<title>`, cleaned. Empty titles count as absent.
pub fn page_title(html: &str) -> Option<String> {
    let caps = TITLE.captures(html)?;
    let text = plain_text(&caps[1]);
    (!text.is_empty()).then_some(text)
}
