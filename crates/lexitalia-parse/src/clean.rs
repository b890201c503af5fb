//! Text normalisation shared by every extraction strategy.

use std::sync::LazyLock;

use regex::Regex;

/// Bodies shorter than this (in characters) are markup-only placeholders.
pub const MIN_BODY_CHARS: usize = 5;

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<!--.*?-->")
        .expect("script pattern must compile")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern must compile"));

static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li|h[1-6]|tr)\s*>").expect("block pattern must compile")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});")
        .expect("entity pattern must compile")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern must compile"));

static INLINE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("inline whitespace pattern must compile"));

const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", " "),
    ("agrave", "à"),
    ("aacute", "á"),
    ("egrave", "è"),
    ("eacute", "é"),
    ("igrave", "ì"),
    ("iacute", "í"),
    ("ograve", "ò"),
    ("oacute", "ó"),
    ("ugrave", "ù"),
    ("uacute", "ú"),
    ("Agrave", "À"),
    ("Egrave", "È"),
    ("Eacute", "É"),
    ("Igrave", "Ì"),
    ("Ograve", "Ò"),
    ("Ugrave", "Ù"),
    ("laquo", "«"),
    ("raquo", "»"),
    ("lsquo", "‘"),
    ("rsquo", "’"),
    ("ldquo", "“"),
    ("rdquo", "”"),
    ("ndash", "–"),
    ("mdash", "—"),
    ("hellip", "…"),
    ("deg", "°"),
    ("ordm", "º"),
    ("ordf", "ª"),
    ("sect", "§"),
    ("euro", "€"),
    ("middot", "·"),
];

/// Decode numeric and named character references. Unknown names are kept verbatim.
pub fn decode_entities(s: &str) -> String {
    ENTITY
        .replace_all(s, |caps: &regex::Captures| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32).map(String::from)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32).map(String::from)
            } else {
                NAMED_ENTITIES
                    .iter()
                    .find(|(name, _)| *name == body)
                    .map(|(_, value)| value.to_string())
            };
            decoded.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Remove paired `((` … `))` amendment markers, keeping what they enclose.
///
/// Unpaired markers are left alone.
pub fn strip_amendment_markers(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find("((") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("))") else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(&after_open[..close]);
        rest = &after_open[close + 2..];
    }
    out.push_str(rest);
    out
}

/// Whether the text is nothing but bracket-marker residue such as `((` or `(( ))`.
pub fn is_marker_artifact(s: &str) -> bool {
    s.chars().all(|c| c == '(' || c == ')' || c.is_whitespace())
}

pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}

fn strip_tags(html: &str) -> String {
    let without_scripts = SCRIPT_STYLE.replace_all(html, " ");
    TAG.replace_all(&without_scripts, " ").into_owned()
}

/// Tags stripped, entities decoded, whitespace collapsed; markers kept.
pub fn plain_text(html: &str) -> String {
    collapse_whitespace(&decode_entities(&strip_tags(html)))
}

/// Full normalisation for body text.
pub fn clean_text(html: &str) -> String {
    collapse_whitespace(&strip_amendment_markers(&plain_text(html)))
}

/// Heading normalisation: clean, then unwrap one pair of surrounding parentheses.
pub fn clean_heading(html: &str) -> Option<String> {
    let text = clean_text(html);
    let unwrapped = match text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) if !inner.contains('(') && !inner.contains(')') => inner.trim().to_string(),
        _ => text,
    };
    (!unwrapped.is_empty()).then_some(unwrapped)
}

/// Line-preserving text for the fallback strategy: block boundaries become
/// newlines, spaces collapse within each line, blank lines are dropped.
pub fn text_lines(html: &str) -> Vec<String> {
    let broken = BLOCK_BREAK.replace_all(html, "\n");
    let text = strip_amendment_markers(&decode_entities(&strip_tags(&broken)));
    text.lines()
        .map(|line| INLINE_WHITESPACE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
