//! Article fetch targets from an Act's landing page.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::clean::decode_entities;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:showArticle\(\s*['"]|href\s*=\s*["'])([^'"]*caricaArticolo\?[^'"]*)"#)
        .expect("directive pattern must compile")
});

/// One per-article fetch directive found on a landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleTarget {
    pub url: String,
    pub primary: u32,
    pub sub: u32,
    pub version: u32,
    pub historical: bool,
}

impl ArticleTarget {
    /// Parse the query string of a `caricaArticolo` URL.
    ///
    /// `art.idArticolo` is required; `art.idSottoArticolo` and `art.versione`
    /// default to 1. A non-zero `art.progressivo` or `art.flagTipoArticolo=2`
    /// marks a historical snapshot.
    pub fn from_url(raw: &str) -> Option<Self> {
        let url = decode_entities(raw.trim());
        let (_, query) = url.split_once('?')?;

        let mut primary = None;
        let mut sub = 1;
        let mut version = 1;
        let mut historical = false;
        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "art.idArticolo" => primary = value.parse().ok(),
                "art.idSottoArticolo" => sub = value.parse().unwrap_or(1),
                "art.versione" => version = value.parse().unwrap_or(1),
                "art.progressivo" => historical |= value.parse::<u32>().is_ok_and(|p| p > 0),
                "art.flagTipoArticolo" => historical |= value == "2",
                _ => {}
            }
        }

        Some(Self {
            primary: primary?,
            sub,
            version,
            historical,
            url,
        })
    }
}

/// Current-version article targets, deduplicated by (primary, sub) and
/// ordered by it.
///
/// The (primary, sub) order is the site's own numbering and only a proxy for
/// drafting order.
pub fn extract_article_targets(landing_html: &str) -> Vec<ArticleTarget> {
    let mut by_identity: BTreeMap<(u32, u32), ArticleTarget> = BTreeMap::new();
    let mut historical = 0usize;

    for caps in DIRECTIVE.captures_iter(landing_html) {
        let Some(target) = ArticleTarget::from_url(&caps[1]) else {
            continue;
        };
        if target.historical {
            historical += 1;
            continue;
        }
        let key = (target.primary, target.sub);
        match by_identity.get(&key) {
            Some(existing) if existing.version >= target.version => {}
            _ => {
                by_identity.insert(key, target);
            }
        }
    }

    debug!(
        targets = by_identity.len(),
        historical_dropped = historical,
        "article targets extracted"
    );
    by_identity.into_values().collect()
}

pub fn extract_article_urls(landing_html: &str) -> Vec<String> {
    extract_article_targets(landing_html)
        .into_iter()
        .map(|t| t.url)
        .collect()
}
