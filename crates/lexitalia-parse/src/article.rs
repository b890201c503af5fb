//! Article extraction: an ordered chain of markup strategies.
//!
//! Normattiva serves three dialects: Akoma Ntoso-styled article pages, legacy
//! "attachment" pages for older acts, and unstructured text. Each dialect is a
//! [`ParseStrategy`]; [`LegalTextParser`] tries them in order and the first
//! success wins.

use std::sync::LazyLock;

use lexitalia_core::model::suffix_alternation;
use lexitalia_core::{ArticleRef, Provision, dedup_provisions, normalize_article};
use regex::Regex;
use tracing::debug;

use crate::clean::{
    MIN_BODY_CHARS, clean_heading, clean_text, is_marker_artifact, plain_text, text_lines,
};
use crate::markup::{centered_elements, elements_with_class, first_with_class, remove_class};

/// One markup dialect.
pub trait ParseStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Extract a single provision, or `None` if the dialect does not apply.
    fn try_parse(&self, html: &str) -> Option<Provision>;

    /// Extract every provision the markup holds. Single-article dialects
    /// return at most one.
    fn try_parse_all(&self, html: &str) -> Vec<Provision> {
        self.try_parse(html).into_iter().collect()
    }
}

/// Ordered strategy chain.
pub struct LegalTextParser {
    strategies: Vec<Box<dyn ParseStrategy>>,
}

impl LegalTextParser {
    pub fn new(strategies: Vec<Box<dyn ParseStrategy>>) -> Self {
        Self { strategies }
    }

    /// Chain for per-article pages: structured, then attachment.
    pub fn article() -> Self {
        Self::new(vec![Box::new(StructuredStrategy), Box::new(AttachmentStrategy)])
    }

    /// Chain for whole-document pages: adds the boundary-slicing fallback.
    pub fn document() -> Self {
        Self::new(vec![
            Box::new(StructuredStrategy),
            Box::new(AttachmentStrategy),
            Box::new(FallbackStrategy),
        ])
    }

    /// Append a strategy after the existing ones.
    pub fn with_strategy(mut self, strategy: Box<dyn ParseStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn parse(&self, html: &str) -> Option<Provision> {
        self.strategies.iter().find_map(|strategy| {
            let parsed = strategy.try_parse(html)?;
            debug!(strategy = strategy.name(), article = %parsed.article, "article parsed");
            Some(parsed)
        })
    }

    /// Every provision in a whole-document page, deduplicated and in article order.
    pub fn parse_document(&self, html: &str) -> Vec<Provision> {
        for strategy in &self.strategies {
            let found = strategy.try_parse_all(html);
            if found.is_empty() {
                continue;
            }
            debug!(strategy = strategy.name(), count = found.len(), "document parsed");
            let mut provisions = dedup_provisions(found);
            provisions.sort_by_cached_key(|p| normalize_article(&p.article.token()));
            return provisions;
        }
        Vec::new()
    }
}

/// Shared acceptance check: the body must survive cleaning with some substance.
fn finish(article: ArticleRef, heading: Option<String>, body: String) -> Option<Provision> {
    if body.chars().count() < MIN_BODY_CHARS {
        return None;
    }
    Some(Provision {
        article,
        heading,
        body,
    })
}

fn article_label_pattern(anchored: bool) -> Regex {
    let source = format!(
        r"(?i){}art(?:icolo|\.)?\s*(?P<num>\d+)(?:\s*-?\s*(?P<suffix>{})\b)?\s*\.?{}",
        if anchored { "^" } else { "" },
        suffix_alternation(),
        if anchored { "$" } else { "" },
    );
    Regex::new(&source).expect("article label pattern must compile")
}

fn article_ref(caps: &regex::Captures) -> Option<ArticleRef> {
    let number = caps.name("num")?.as_str().parse().ok()?;
    Some(ArticleRef::new(number, caps.name("suffix").map(|m| m.as_str())))
}

// ── Strategy 1: structured markup ──

static STRUCTURED_NUMBER: LazyLock<Regex> = LazyLock::new(|| article_label_pattern(false));

static COMMA_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^\d+(?:\s*-?\s*(?:{})\b)?\s*\.\s*",
        suffix_alternation()
    ))
    .expect("comma number pattern must compile")
});

/// Akoma Ntoso-styled article pages: `article-num-akn` heading plus either a
/// single `art-just-text-akn` body or numbered `art-comma-div-akn` blocks.
pub struct StructuredStrategy;

impl StructuredStrategy {
    fn commas(html: &str) -> Option<String> {
        let blocks = elements_with_class(html, "art-comma-div-akn");
        if blocks.is_empty() {
            return None;
        }
        let parts: Vec<String> = blocks
            .iter()
            .filter_map(|block| {
                let without_number = remove_class(block.inner, "comma-num-akn");
                if is_marker_artifact(&plain_text(&without_number)) {
                    return None;
                }
                let text = clean_text(&without_number);
                let text = COMMA_NUMBER.replace(&text, "").trim().to_string();
                (!text.is_empty()).then_some(text)
            })
            .collect();
        Some(parts.join(" "))
    }
}

impl ParseStrategy for StructuredStrategy {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn try_parse(&self, html: &str) -> Option<Provision> {
        let number_el = first_with_class(html, "article-num-akn")?;
        let label = plain_text(number_el.inner);
        let article = STRUCTURED_NUMBER
            .captures(&label)
            .and_then(|caps| article_ref(&caps))?;

        let heading = first_with_class(html, "article-heading-akn")
            .and_then(|el| clean_heading(el.inner));

        let body = match first_with_class(html, "art-just-text-akn") {
            Some(el) => clean_text(el.inner),
            None => Self::commas(html)?,
        };

        finish(article, heading, body)
    }
}

// ── Strategy 2: legacy attachment pages ──

static ATTACHMENT_LABEL: LazyLock<Regex> = LazyLock::new(|| article_label_pattern(true));

static DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*(?:<br\s*/?>\s*)*(?:<hr\b[^>]*>|<div\b[^>]*class\s*=\s*"[^"]*\bdelimiter\b[^"]*"[^>]*>\s*</div>)"#)
        .expect("delimiter pattern must compile")
});

/// Older acts: one `attachment-just-text` container with a centred
/// `Art. N.` label; everything after the label (or after a following
/// delimiter or centred heading block) is the body.
pub struct AttachmentStrategy;

impl ParseStrategy for AttachmentStrategy {
    fn name(&self) -> &'static str {
        "attachment"
    }

    fn try_parse(&self, html: &str) -> Option<Provision> {
        let container = first_with_class(html, "attachment-just-text")?;
        let inner = container.inner;

        let centered = centered_elements(inner);
        let (label_idx, article) = centered.iter().enumerate().find_map(|(i, el)| {
            let label = plain_text(el.inner);
            let caps = ATTACHMENT_LABEL.captures(&label)?;
            Some((i, article_ref(&caps)?))
        })?;

        let mut body_start = centered[label_idx].end;
        let mut heading = None;

        // A centred block straight after the label carries the heading.
        if let Some(next) = centered.get(label_idx + 1) {
            let gap = &inner[body_start..next.start];
            let is_label = ATTACHMENT_LABEL.is_match(&plain_text(next.inner));
            if plain_text(gap).is_empty() && !is_label {
                heading = clean_heading(next.inner);
                body_start = next.end;
            }
        }
        if let Some(m) = DELIMITER.find(&inner[body_start..]) {
            body_start += m.end();
        }

        // Stop at the next article label if the container holds several.
        let body_end = centered
            .iter()
            .filter(|el| el.start >= body_start)
            .find(|el| ATTACHMENT_LABEL.is_match(&plain_text(el.inner)))
            .map_or(inner.len(), |el| el.start);

        let body = clean_text(&inner[body_start..body_end]);
        finish(article, heading, body)
    }
}

// ── Strategy 3: unstructured text ──

static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:art\.|articolo)\s*(?P<num>\d+)(?:\s*-?\s*(?P<suffix>{})\b)?\s*\.?\s*(?P<rest>.*)$",
        suffix_alternation()
    ))
    .expect("boundary pattern must compile")
});

static LOOSE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^art(?:icolo)?\.?\s*(?P<num>\d+|unico)(?:\s*-?\s*(?P<suffix>{})\b)?\s*[.:\-–]?\s*(?P<rest>.*)$",
        suffix_alternation()
    ))
    .expect("loose header pattern must compile")
});

/// Whole-document pages without article markup.
///
/// First slices the text at lines opening with `Art. N`/`Articolo N`; if no
/// such boundary exists, walks the lines with a looser header test
/// (`Art 1`, `ARTICOLO UNICO`) and accumulates text under the last header.
pub struct FallbackStrategy;

struct Section {
    article: ArticleRef,
    lines: Vec<String>,
}

impl FallbackStrategy {
    fn sections(lines: &[String], header: &Regex) -> Vec<Section> {
        let mut sections: Vec<Section> = Vec::new();
        for line in lines {
            if let Some(caps) = header.captures(line) {
                let number = match caps.name("num").map(|m| m.as_str()) {
                    Some(n) if n.eq_ignore_ascii_case("unico") => 1,
                    Some(n) => match n.parse() {
                        Ok(n) => n,
                        Err(_) => continue,
                    },
                    None => continue,
                };
                let article = ArticleRef::new(number, caps.name("suffix").map(|m| m.as_str()));
                let rest = caps.name("rest").map_or("", |m| m.as_str()).trim();
                let mut section = Section {
                    article,
                    lines: Vec::new(),
                };
                if !rest.is_empty() {
                    section.lines.push(rest.to_string());
                }
                sections.push(section);
            } else if let Some(current) = sections.last_mut() {
                current.lines.push(line.clone());
            }
        }
        sections
    }

    fn to_provision(section: Section) -> Option<Provision> {
        let mut lines = section.lines.into_iter().peekable();
        let heading = match lines.peek() {
            Some(first) if first.starts_with('(') && first.ends_with(')') => {
                lines.next().and_then(|h| clean_heading(&h))
            }
            _ => None,
        };
        let body = clean_text(&lines.collect::<Vec<_>>().join(" "));
        finish(section.article, heading, body)
    }
}

impl ParseStrategy for FallbackStrategy {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn try_parse(&self, html: &str) -> Option<Provision> {
        self.try_parse_all(html).into_iter().next()
    }

    fn try_parse_all(&self, html: &str) -> Vec<Provision> {
        let lines = text_lines(html);
        let mut sections = Self::sections(&lines, &BOUNDARY);
        if sections.is_empty() {
            sections = Self::sections(&lines, &LOOSE_HEADER);
        }
        sections.into_iter().filter_map(Self::to_provision).collect()
    }
}
