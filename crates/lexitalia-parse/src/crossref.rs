//! EU directive/regulation citations embedded in provision text.

use std::collections::HashSet;
use std::sync::LazyLock;

use lexitalia_core::model::suffix_alternation;
use lexitalia_core::{CommunityBody, CrossReference, ForeignInstrumentType, Relation};
use regex::{Captures, Regex};

/// Characters of surrounding text kept on each side of a match.
pub const CONTEXT_CHARS: usize = 120;

const INSTRUMENT: &str = r"(?P<kind>regolamento|regulation|direttiva|directive)";
const BODY: &str = r"(?P<body>UE|CE|CEE|EU|EC|EEC|Euratom)";
const NUMBER_MARK: &str = r"(?P<mark>n\.\s*|no\.?\s*|nr\.\s*)?";

/// `Regolamento (UE) 2016/679`, `Regulation (EC) No 1907/2006`.
static BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{INSTRUMENT}\s*\(\s*{BODY}\s*\)\s*{NUMBER_MARK}(?P<a>\d{{2,4}})\s*/\s*(?P<b>\d{{1,4}})\b"
    ))
    .expect("bracketed pattern must compile")
});

/// `direttiva 95/46/CE`, `Directive 2000/60/EC`.
static TRAILING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{INSTRUMENT}\s+{NUMBER_MARK}(?P<a>\d{{2,4}})\s*/\s*(?P<b>\d{{1,4}})\s*/\s*{BODY}\b"
    ))
    .expect("trailing pattern must compile")
});

/// `direttiva 2019/790` with no community marker.
static BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{INSTRUMENT}\s+{NUMBER_MARK}(?P<a>\d{{2,4}})\s*/\s*(?P<b>\d{{1,4}})\b"
    ))
    .expect("bare pattern must compile")
});

static PINPOINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:article|articolo|art\.)\s*(?P<num>\d+(?:\s*-?\s*(?:{})\b)?)",
        suffix_alternation()
    ))
    .expect("pinpoint pattern must compile")
});

const IMPLEMENTATION_STEMS: &[&str] = &[
    "implement",
    "attua",
    "recepi",
    "traspos",
    "supplement",
    "comply",
    "dà attuazione",
    "in attuazione",
];

/// Expand a 2-digit year around the 50 pivot. 4-digit values pass through
/// only when they fall within `1950..=2100`.
pub fn normalize_year(raw: &str) -> Option<i32> {
    let value: i32 = raw.parse().ok()?;
    match raw.len() {
        2 if value >= 50 => Some(1900 + value),
        2 => Some(2000 + value),
        4 if is_year(raw) => Some(value),
        _ => None,
    }
}

fn is_year(raw: &str) -> bool {
    raw.len() == 4 && raw.parse::<i32>().is_ok_and(|y| (1950..=2100).contains(&y))
}

/// Classify the relation from the surrounding context.
pub fn classify_relation(context: &str) -> Relation {
    let lower = context.to_lowercase();
    if IMPLEMENTATION_STEMS.iter().any(|stem| lower.contains(stem)) {
        Relation::Implements
    } else {
        Relation::References
    }
}

struct Candidate {
    start: usize,
    end: usize,
    reference: CrossReference,
}

/// Extract cross-references from provision text.
///
/// Pure and stateless. Later patterns never claim text already matched by an
/// earlier one; results are in text order, deduplicated by
/// (foreign id, pinpoint article).
pub fn extract_cross_references(text: &str) -> Vec<CrossReference> {
    let mut candidates: Vec<Candidate> = Vec::new();

    for pattern in [&*BRACKETED, &*TRAILING, &*BARE] {
        for caps in pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let overlaps = candidates
                .iter()
                .any(|c| whole.start() < c.end && c.start < whole.end());
            if overlaps {
                continue;
            }
            if let Some(reference) = build(text, &caps) {
                candidates.push(Candidate {
                    start: whole.start(),
                    end: whole.end(),
                    reference,
                });
            }
        }
    }

    candidates.sort_by_key(|c| c.start);

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert((c.reference.foreign_id(), c.reference.article.clone())))
        .map(|c| c.reference)
        .collect()
}

fn build(text: &str, caps: &Captures) -> Option<CrossReference> {
    let whole = caps.get(0)?;
    let instrument = match caps.name("kind")?.as_str().to_lowercase().as_str() {
        "regolamento" | "regulation" => ForeignInstrumentType::Regulation,
        _ => ForeignInstrumentType::Directive,
    };

    let a = caps.name("a")?.as_str();
    let b = caps.name("b")?.as_str();
    // Legacy EEC/EC regulations are cited number first: "n. 1907/2006", "n. 1408/71".
    let numbered_first = !is_year(a) && (is_year(b) || (b.len() == 2 && a.len() > 2));
    let (year_raw, number_raw) = if numbered_first {
        (b, a)
    } else {
        (a, b)
    };
    let year = normalize_year(year_raw)?;
    let number: u32 = number_raw.parse().ok()?;

    let body = match caps.name("body") {
        Some(m) => CommunityBody::from_label(m.as_str())?,
        None => CommunityBody::for_year(year),
    };

    let (context, match_offset) = context_window(text, whole.start(), whole.end());
    let relation = classify_relation(&context);
    let article = nearest_pinpoint(&context, match_offset, whole.as_str().len());

    Some(CrossReference {
        instrument,
        body,
        year,
        number,
        article,
        context,
        relation,
        matched_text: whole.as_str().to_string(),
        primary: false,
    })
}

/// `±CONTEXT_CHARS` characters around `start..end`, plus the byte offset of
/// the match inside the returned window.
fn context_window(text: &str, start: usize, end: usize) -> (String, usize) {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map_or(0, |(i, _)| i);
    let to = text[end..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map_or(text.len(), |(i, _)| end + i);
    (text[from..to].to_string(), start - from)
}

/// The article number in `context` closest to the match, if any.
fn nearest_pinpoint(context: &str, match_start: usize, match_len: usize) -> Option<String> {
    let match_end = match_start + match_len;
    PINPOINT
        .captures_iter(context)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let distance = if whole.end() <= match_start {
                match_start - whole.end()
            } else if whole.start() >= match_end {
                whole.start() - match_end
            } else {
                0
            };
            let num = caps.name("num")?.as_str();
            let token: String = num.chars().filter(|c| !c.is_whitespace()).collect();
            Some((distance, token))
        })
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, token)| token)
}
