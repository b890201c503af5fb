//! Structural scanning over raw markup.
//!
//! No tree is built: elements are located by opening-tag patterns and closed
//! by counting same-name tags. Unclosed elements run to the end of input.

use std::sync::LazyLock;

use regex::Regex;

static CLASS_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<([a-z][a-z0-9]*)\b[^>]*?\bclass\s*=\s*["']([^"']*)["'][^>]*>"#)
        .expect("class tag pattern must compile")
});

static CENTERED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(div|p|span|center)\b([^>]*)>").expect("centered tag pattern must compile")
});

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "wbr"];

/// A located element.
#[derive(Debug, Clone)]
pub struct Element<'a> {
    pub name: String,
    /// Byte offset of the opening `<`.
    pub start: usize,
    pub inner: &'a str,
    /// Byte offset just past the closing tag.
    pub end: usize,
}

/// All elements whose `class` attribute lists `class`, in document order.
pub fn elements_with_class<'a>(html: &'a str, class: &str) -> Vec<Element<'a>> {
    let lower = html.to_ascii_lowercase();
    CLASS_TAG
        .captures_iter(html)
        .filter(|caps| caps[2].split_whitespace().any(|c| c == class))
        .filter_map(|caps| {
            let open = caps.get(0)?;
            element_at(html, &lower, open.start(), open.end(), &caps[1].to_ascii_lowercase())
        })
        .collect()
}

pub fn first_with_class<'a>(html: &'a str, class: &str) -> Option<Element<'a>> {
    elements_with_class(html, class).into_iter().next()
}

/// Elements centred via `align="center"`, an inline `text-align: center`, or `<center>`.
pub fn centered_elements(html: &str) -> Vec<Element<'_>> {
    let lower = html.to_ascii_lowercase();
    CENTERED_TAG
        .captures_iter(html)
        .filter_map(|caps| {
            let open = caps.get(0)?;
            let name = caps[1].to_ascii_lowercase();
            let attrs = caps[2].to_ascii_lowercase().replace(' ', "");
            let centered = name == "center"
                || attrs.contains("align=\"center\"")
                || attrs.contains("align=center")
                || attrs.contains("text-align:center");
            if !centered {
                return None;
            }
            element_at(html, &lower, open.start(), open.end(), &name)
        })
        .collect()
}

/// Remove every element carrying `class`, including its content.
pub fn remove_class(html: &str, class: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    for el in elements_with_class(html, class) {
        if el.start < cursor {
            continue;
        }
        out.push_str(&html[cursor..el.start]);
        out.push(' ');
        cursor = el.end;
    }
    out.push_str(&html[cursor..]);
    out
}

/// Close the element whose opening tag spans `open_start..open_end`.
///
/// `lower` is `html` ASCII-lowercased once by the caller; both share byte
/// offsets.
pub fn element_at<'a>(
    html: &'a str,
    lower: &str,
    open_start: usize,
    open_end: usize,
    name: &str,
) -> Option<Element<'a>> {
    let open_tag = html.get(open_start..open_end)?;
    if open_tag.ends_with("/>") || VOID_ELEMENTS.contains(&name) {
        return Some(Element {
            name: name.to_string(),
            start: open_start,
            inner: "",
            end: open_end,
        });
    }

    let bytes = lower.as_bytes();
    let mut depth = 1usize;
    let mut pos = open_end;

    while let Some(offset) = lower[pos..].find('<') {
        let lt = pos + offset;
        let rest = &lower[lt + 1..];
        let (closing, tail) = match rest.strip_prefix('/') {
            Some(t) => (true, t),
            None => (false, rest),
        };
        let name_end = lt + 1 + usize::from(closing) + name.len();
        let boundary = bytes
            .get(name_end)
            .is_none_or(|b| !b.is_ascii_alphanumeric());

        if tail.starts_with(name) && boundary {
            if closing {
                depth -= 1;
                if depth == 0 {
                    let end = lower[lt..].find('>').map_or(html.len(), |i| lt + i + 1);
                    return Some(Element {
                        name: name.to_string(),
                        start: open_start,
                        inner: &html[open_end..lt],
                        end,
                    });
                }
            } else {
                depth += 1;
            }
        }
        pos = lt + 1;
    }

    Some(Element {
        name: name.to_string(),
        start: open_start,
        inner: &html[open_end..],
        end: html.len(),
    })
}
