//! Render parsed citations back to text.

use serde::{Deserialize, Serialize};

use super::ParsedCitation;
use super::grammar::{code_abbreviation, month_name};
use crate::model::InstrumentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    /// `Articolo 3, Decreto Legislativo 30 giugno 2003, n. 196`
    Full,
    /// `Art. 3, D.Lgs. 196/2003`
    #[default]
    Short,
    /// `art. 3, comma 2`
    Pinpoint,
}

/// Render `citation` in `style`.
///
/// Invalid or article-less citations render to an empty string.
pub fn format_citation(citation: &ParsedCitation, style: CitationStyle) -> String {
    if !citation.valid {
        return String::new();
    }
    let Some(token) = citation.article_token() else {
        return String::new();
    };
    let paragraph = citation
        .paragraph
        .map(|p| format!(", comma {p}"))
        .unwrap_or_default();

    let instrument = citation.instrument.unwrap_or(InstrumentType::Codice);

    match style {
        CitationStyle::Pinpoint => format!("art. {token}{paragraph}"),
        CitationStyle::Short => {
            let target = match (instrument, citation.number, citation.year) {
                (InstrumentType::Codice, _, _) => code_target(citation, true),
                (t, Some(n), Some(y)) => format!("{} {n}/{y}", t.abbreviation()),
                (t, Some(n), None) => format!("{} n. {n}", t.abbreviation()),
                (t, None, _) => t.abbreviation().to_string(),
            };
            join_target(format!("Art. {token}{paragraph}"), target)
        }
        CitationStyle::Full => {
            let target = match (instrument, citation.number, citation.year) {
                (InstrumentType::Codice, _, _) => code_target(citation, false),
                (t, Some(n), Some(y)) => match spelled_date(citation.date.as_deref()) {
                    Some(date) => format!("{} {date}, n. {n}", t.full_name()),
                    None => format!("{} n. {n}/{y}", t.full_name()),
                },
                (t, Some(n), None) => format!("{} n. {n}", t.full_name()),
                (t, None, _) => t.full_name().to_string(),
            };
            join_target(format!("Articolo {token}{paragraph}"), target)
        }
    }
}

fn join_target(head: String, target: String) -> String {
    if target.is_empty() {
        head
    } else {
        format!("{head}, {target}")
    }
}

fn code_target(citation: &ParsedCitation, abbreviate: bool) -> String {
    let title = citation.title.as_deref().unwrap_or_default();
    if abbreviate && let Some(abbr) = code_abbreviation(title) {
        return abbr.to_string();
    }
    title.to_string()
}

/// `2003-06-30` → `30 giugno 2003`.
fn spelled_date(iso: Option<&str>) -> Option<String> {
    let mut parts = iso?.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    Some(format!("{day} {} {year}", month_name(month)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::parse_citation;

    #[test]
    fn short_style() {
        let c = parse_citation("art. 5 co. 2 d.lgs. 196/2003");
        assert_eq!(format_citation(&c, CitationStyle::Short), "Art. 5, comma 2, D.Lgs. 196/2003");
    }

    #[test]
    fn full_style_with_date() {
        let c = parse_citation("Art. 3, Decreto Legislativo 30 giugno 2003, n. 196");
        assert_eq!(
            format_citation(&c, CitationStyle::Full),
            "Articolo 3, Decreto Legislativo 30 giugno 2003, n. 196"
        );
    }

    #[test]
    fn full_style_without_date() {
        let c = parse_citation("Art. 1, D.Lgs. 196/2003");
        assert_eq!(
            format_citation(&c, CitationStyle::Full),
            "Articolo 1, Decreto Legislativo n. 196/2003"
        );
    }

    #[test]
    fn pinpoint_style() {
        let c = parse_citation("Art. 615-ter, Codice Penale");
        assert_eq!(format_citation(&c, CitationStyle::Pinpoint), "art. 615-ter");
        assert_eq!(format_citation(&c, CitationStyle::Short), "Art. 615-ter, c.p.");
        assert_eq!(
            format_citation(&c, CitationStyle::Full),
            "Articolo 615-ter, Codice Penale"
        );
    }

    #[test]
    fn invalid_renders_empty() {
        let c = parse_citation("nonsense");
        assert_eq!(format_citation(&c, CitationStyle::Full), "");

        let mut no_article = ParsedCitation::for_act(InstrumentType::Legge, 1, 2000, "1");
        no_article.article = None;
        assert_eq!(format_citation(&no_article, CitationStyle::Short), "");
    }

    #[test]
    fn every_style_round_trips_for_every_numbered_type() {
        for instrument in InstrumentType::ALL {
            if instrument == InstrumentType::Codice {
                continue;
            }
            for (number, year) in [(1, 1948), (196, 2003), (8123, 2024)] {
                let mut original = ParsedCitation::for_act(instrument, number, year, "12");
                original.suffix = Some("terdecies".into());
                original.paragraph = Some(2);

                for style in [CitationStyle::Full, CitationStyle::Short] {
                    let text = format_citation(&original, style);
                    let reparsed = parse_citation(&text);
                    assert!(reparsed.valid, "{text} did not parse: {:?}", reparsed.error);
                    assert_eq!(reparsed.instrument, Some(instrument), "{text}");
                    assert_eq!(reparsed.number, Some(number), "{text}");
                    assert_eq!(reparsed.year, Some(year), "{text}");
                    assert_eq!(reparsed.article_token().as_deref(), Some("12-terdecies"), "{text}");
                    assert_eq!(reparsed.paragraph, Some(2), "{text}");
                    assert_eq!(format_citation(&reparsed, style), text);
                }

                // Pinpoint text names no Act; it must match the pinpoint of the reparsed citation.
                let pinpoint = format_citation(&original, CitationStyle::Pinpoint);
                assert_eq!(pinpoint, "art. 12-terdecies, comma 2");
                let reparsed = parse_citation(&format_citation(&original, CitationStyle::Full));
                assert_eq!(format_citation(&reparsed, CitationStyle::Pinpoint), pinpoint);
            }
        }
    }

    #[test]
    fn dated_full_style_round_trips() {
        let text = "Articolo 3, Decreto Legislativo 30 giugno 2003, n. 196";
        let reparsed = parse_citation(&format_citation(&parse_citation(text), CitationStyle::Full));
        assert_eq!(reparsed.date.as_deref(), Some("2003-06-30"));
        assert_eq!(format_citation(&reparsed, CitationStyle::Full), text);
    }
}
