//! Ordered grammar table for citation parsing.
//!
//! Precedence is the table order: the first grammar whose pattern matches the
//! whole (trimmed, whitespace-collapsed) input and whose extractor accepts the
//! captures wins.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use super::{CitationForm, ParsedCitation};
use crate::model::{InstrumentType, canonical_suffix, suffix_alternation};

/// One entry of the grammar table.
pub struct Grammar {
    pub form: CitationForm,
    pub pattern: Regex,
    pub extract: fn(&Captures) -> Option<ParsedCitation>,
}

const ARTICLE: &str = r"(?:articolo|art\.?)\s*";
const PARAGRAPH: &str = r"(?:comma|co\.|c\.)\s*(?P<para>\d+)";
const SEP: &str = r"\s*,?\s*";
const SEP_OF: &str = r"\s*,?\s*(?:della\s+|del\s+|dell'\s*)?";
const ABBR: &str =
    r"(?P<abbr>(?:d\.?\s*lgs|d\.?\s*p\.?\s*c\.?\s*m|d\.?\s*p\.?\s*r|d\.?\s*l|d\.?\s*m|r\.?\s*d|legge|l)\.?)";
const NUMBER_YEAR: &str = r"\s*(?:n\.?\s*)?(?P<num>\d+)\s*/\s*(?P<year>\d{4})";
const IDENTIFIER: &str = r"(?P<code>[a-z]+)-(?P<num>\d+)-(?P<year>\d{4})";
const CODE_TITLE: &str = r"(?P<code>codice(?:\s+[\p{L}'.]+)+|c\.\s*p\.\s*c\.|c\.\s*p\.\s*p\.|c\.\s*c\.|c\.\s*p\.|costituzione|cost\.)";
const FULL_TYPE: &str = r"(?P<type>legge|decreto[\s-]+legislativo|decreto[\s-]+legge|decreto\s+del\s+presidente\s+della\s+repubblica|regio\s+decreto|decreto\s+del\s+presidente\s+del\s+consiglio\s+dei\s+ministri|decreto\s+ministeriale)";
const FULL_DATE: &str = r"\s+(?P<day>\d{1,2})\s*[°º]?\s+(?P<month>gennaio|febbraio|marzo|aprile|maggio|giugno|luglio|agosto|settembre|ottobre|novembre|dicembre)\s+(?P<year>\d{4})";
const FULL_NUMBER: &str = r"\s*,?\s*n\.?\s*(?P<num>\d+)";

const MONTHS: [&str; 12] = [
    "gennaio",
    "febbraio",
    "marzo",
    "aprile",
    "maggio",
    "giugno",
    "luglio",
    "agosto",
    "settembre",
    "ottobre",
    "novembre",
    "dicembre",
];

/// Canonical titles for the usual code abbreviations.
const CODE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("cc", "Codice Civile"),
    ("cp", "Codice Penale"),
    ("cpc", "Codice di Procedura Civile"),
    ("cpp", "Codice di Procedura Penale"),
    ("cost", "Costituzione"),
    ("costituzione", "Costituzione"),
];

fn article_number() -> String {
    format!(
        r"(?P<art>\d+)(?:\s*-?\s*(?P<suffix>{})\b)?",
        suffix_alternation()
    )
}

fn anchored(parts: &[&str]) -> Regex {
    let source = ["(?i)^", &parts.concat(), "$"].concat();
    Regex::new(&source).expect("citation grammar pattern must compile")
}

/// The grammar table, in precedence order.
pub static GRAMMARS: LazyLock<Vec<Grammar>> = LazyLock::new(|| {
    let art = article_number();
    let optional_paragraph = ["(?:", SEP, PARAGRAPH, ")?"].concat();
    vec![
        Grammar {
            form: CitationForm::ParagraphShort,
            pattern: anchored(&[ARTICLE, &art, SEP, PARAGRAPH, SEP_OF, ABBR, NUMBER_YEAR]),
            extract: extract_abbreviated,
        },
        Grammar {
            form: CitationForm::Identifier,
            pattern: anchored(&[IDENTIFIER, SEP, ARTICLE, &art, &optional_paragraph]),
            extract: extract_identifier,
        },
        Grammar {
            form: CitationForm::Code,
            pattern: anchored(&[ARTICLE, &art, &optional_paragraph, SEP_OF, CODE_TITLE]),
            extract: extract_code,
        },
        Grammar {
            form: CitationForm::FullDate,
            pattern: anchored(&[
                ARTICLE,
                &art,
                &optional_paragraph,
                SEP_OF,
                FULL_TYPE,
                FULL_DATE,
                FULL_NUMBER,
            ]),
            extract: extract_full_date,
        },
        Grammar {
            form: CitationForm::Short,
            pattern: anchored(&[ARTICLE, &art, &optional_paragraph, SEP_OF, ABBR, NUMBER_YEAR]),
            extract: extract_abbreviated,
        },
        Grammar {
            form: CitationForm::FullNumbered,
            pattern: anchored(&[ARTICLE, &art, &optional_paragraph, SEP_OF, FULL_TYPE, NUMBER_YEAR]),
            extract: extract_full_numbered,
        },
    ]
});

/// Parse a free-text citation. Never fails: unmatched input yields an
/// invalid result quoting the original text.
pub fn parse_citation(text: &str) -> ParsedCitation {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return ParsedCitation::invalid("empty citation");
    }

    for grammar in GRAMMARS.iter() {
        let Some(caps) = grammar.pattern.captures(&normalized) else {
            continue;
        };
        if let Some(mut parsed) = (grammar.extract)(&caps) {
            debug!(form = ?grammar.form, citation = %normalized, "citation parsed");
            parsed.form = Some(grammar.form);
            return parsed;
        }
    }

    ParsedCitation::invalid(format!("unrecognised citation format: \"{}\"", text.trim()))
}

// ── Extractors ──

fn base(caps: &Captures, instrument: InstrumentType) -> Option<ParsedCitation> {
    let article: u32 = caps.name("art")?.as_str().parse().ok()?;
    let suffix = match caps.name("suffix") {
        Some(m) => Some(canonical_suffix(m.as_str())?.to_string()),
        None => None,
    };
    let paragraph = match caps.name("para") {
        Some(m) => Some(m.as_str().parse().ok()?),
        None => None,
    };
    Some(ParsedCitation {
        valid: true,
        instrument: Some(instrument),
        article: Some(article.to_string()),
        suffix,
        paragraph,
        ..Default::default()
    })
}

fn number_and_year(caps: &Captures) -> Option<(u32, i32)> {
    let number = caps.name("num")?.as_str().parse().ok()?;
    let year = caps.name("year")?.as_str().parse().ok()?;
    Some((number, year))
}

fn extract_abbreviated(caps: &Captures) -> Option<ParsedCitation> {
    let instrument = InstrumentType::from_abbreviation(caps.name("abbr")?.as_str())?;
    let (number, year) = number_and_year(caps)?;
    let mut parsed = base(caps, instrument)?;
    parsed.number = Some(number);
    parsed.year = Some(year);
    Some(parsed)
}

fn extract_identifier(caps: &Captures) -> Option<ParsedCitation> {
    let instrument = InstrumentType::from_code(caps.name("code")?.as_str())?;
    if instrument == InstrumentType::Codice {
        return None;
    }
    let (number, year) = number_and_year(caps)?;
    let mut parsed = base(caps, instrument)?;
    parsed.number = Some(number);
    parsed.year = Some(year);
    Some(parsed)
}

fn extract_code(caps: &Captures) -> Option<ParsedCitation> {
    let raw = caps.name("code")?.as_str().trim();
    let squashed: String = raw
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect::<String>()
        .to_lowercase();
    let title = CODE_ABBREVIATIONS
        .iter()
        .find(|(abbr, _)| *abbr == squashed)
        .map(|(_, title)| title.to_string())
        .unwrap_or_else(|| raw.trim_end_matches('.').to_string());

    let mut parsed = base(caps, InstrumentType::Codice)?;
    parsed.title = Some(title);
    Some(parsed)
}

fn extract_full_numbered(caps: &Captures) -> Option<ParsedCitation> {
    let instrument = InstrumentType::from_full_name(caps.name("type")?.as_str())?;
    let (number, year) = number_and_year(caps)?;
    let mut parsed = base(caps, instrument)?;
    parsed.number = Some(number);
    parsed.year = Some(year);
    Some(parsed)
}

fn extract_full_date(caps: &Captures) -> Option<ParsedCitation> {
    let instrument = InstrumentType::from_full_name(caps.name("type")?.as_str())?;
    let (number, year) = number_and_year(caps)?;
    let day: u32 = caps.name("day")?.as_str().parse().ok()?;
    let month_name = caps.name("month")?.as_str().to_lowercase();
    let month = MONTHS.iter().position(|m| *m == month_name)? + 1;
    if !(1..=31).contains(&day) {
        return None;
    }

    let mut parsed = base(caps, instrument)?;
    parsed.number = Some(number);
    parsed.year = Some(year);
    parsed.date = Some(format!("{year:04}-{month:02}-{day:02}"));
    Some(parsed)
}

/// Italian month name for a 1-based month number.
pub(super) fn month_name(month: u32) -> Option<&'static str> {
    MONTHS.get(month.checked_sub(1)? as usize).copied()
}

/// Abbreviation used by the short style for a code title, if it has one.
pub(super) fn code_abbreviation(title: &str) -> Option<&'static str> {
    let abbr = match title.to_lowercase().as_str() {
        "codice civile" => "c.c.",
        "codice penale" => "c.p.",
        "codice di procedura civile" => "c.p.c.",
        "codice di procedura penale" => "c.p.p.",
        "costituzione" => "Cost.",
        _ => return None,
    };
    Some(abbr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_dlgs() {
        let c = parse_citation("Art. 1, D.Lgs. 196/2003");
        assert!(c.valid, "{:?}", c.error);
        assert_eq!(c.form, Some(CitationForm::Short));
        assert_eq!(c.instrument, Some(InstrumentType::Dlgs));
        assert_eq!(c.article.as_deref(), Some("1"));
        assert_eq!(c.number, Some(196));
        assert_eq!(c.year, Some(2003));
        assert_eq!(c.act_id().as_deref(), Some("dlgs-196-2003"));
    }

    #[test]
    fn codice_with_suffix() {
        let c = parse_citation("Art. 615-ter, Codice Penale");
        assert!(c.valid);
        assert_eq!(c.form, Some(CitationForm::Code));
        assert_eq!(c.instrument, Some(InstrumentType::Codice));
        assert_eq!(c.article.as_deref(), Some("615"));
        assert_eq!(c.suffix.as_deref(), Some("ter"));
        assert_eq!(c.title.as_deref(), Some("Codice Penale"));
        assert!(c.act_id().is_none());
    }

    #[test]
    fn code_abbreviation_maps_to_title() {
        let c = parse_citation("art. 2043 c.c.");
        assert!(c.valid);
        assert_eq!(c.title.as_deref(), Some("Codice Civile"));

        let c = parse_citation("Art. 3 Cost.");
        assert_eq!(c.title.as_deref(), Some("Costituzione"));
    }

    #[test]
    fn paragraph_form_beats_short_form() {
        let c = parse_citation("Art. 5, comma 2, D.Lgs. 196/2003");
        assert!(c.valid);
        assert_eq!(c.form, Some(CitationForm::ParagraphShort));
        assert_eq!(c.paragraph, Some(2));

        // The same text also fits the short grammar's optional paragraph.
        let short = &GRAMMARS[4];
        assert!(short.pattern.is_match("Art. 5, comma 2, D.Lgs. 196/2003"));
    }

    #[test]
    fn long_insertion_suffix() {
        let c = parse_citation("Art. 2-terdecies, D.Lgs. 196/2003");
        assert!(c.valid, "{:?}", c.error);
        assert_eq!(c.article.as_deref(), Some("2"));
        assert_eq!(c.suffix.as_deref(), Some("terdecies"));
        assert_eq!(c.article_token().as_deref(), Some("2-terdecies"));

        let c = parse_citation("art. 2-septiesdecies, comma 1, D.Lgs. 196/2003");
        assert!(c.valid, "{:?}", c.error);
        assert_eq!(c.suffix.as_deref(), Some("septiesdecies"));
        assert_eq!(c.paragraph, Some(1));
    }

    #[test]
    fn identifier_form() {
        let c = parse_citation("legge-241-1990, art. 21-octies, comma 2");
        assert!(c.valid);
        assert_eq!(c.form, Some(CitationForm::Identifier));
        assert_eq!(c.instrument, Some(InstrumentType::Legge));
        assert_eq!(c.suffix.as_deref(), Some("octies"));
        assert_eq!(c.paragraph, Some(2));
        assert_eq!(c.act_id().as_deref(), Some("legge-241-1990"));
    }

    #[test]
    fn identifier_form_rejects_unknown_prefix() {
        let c = parse_citation("foo-1-2000 art. 1");
        assert!(!c.valid);
    }

    #[test]
    fn full_date_form() {
        let c = parse_citation("Art. 3, Decreto Legislativo 30 giugno 2003, n. 196");
        assert!(c.valid, "{:?}", c.error);
        assert_eq!(c.form, Some(CitationForm::FullDate));
        assert_eq!(c.instrument, Some(InstrumentType::Dlgs));
        assert_eq!(c.number, Some(196));
        assert_eq!(c.year, Some(2003));
        assert_eq!(c.date.as_deref(), Some("2003-06-30"));
    }

    #[test]
    fn full_date_decreto_legge() {
        let c = parse_citation("articolo 2, comma 1, del decreto-legge 1° luglio 2009, n. 78");
        assert!(c.valid, "{:?}", c.error);
        assert_eq!(c.instrument, Some(InstrumentType::Dl));
        assert_eq!(c.paragraph, Some(1));
        assert_eq!(c.date.as_deref(), Some("2009-07-01"));
    }

    #[test]
    fn full_name_without_date() {
        let c = parse_citation("Articolo 1, Decreto Legislativo n. 196/2003");
        assert!(c.valid, "{:?}", c.error);
        assert_eq!(c.form, Some(CitationForm::FullNumbered));
        assert_eq!(c.instrument, Some(InstrumentType::Dlgs));
        assert_eq!(c.act_id().as_deref(), Some("dlgs-196-2003"));

        let c = parse_citation("art. 4, comma 3, del decreto-legge n. 18/2020");
        assert!(c.valid, "{:?}", c.error);
        assert_eq!(c.instrument, Some(InstrumentType::Dl));
        assert_eq!(c.paragraph, Some(3));
    }

    #[test]
    fn short_variants() {
        let c = parse_citation("art. 2 L. n. 241/1990");
        assert_eq!(c.instrument, Some(InstrumentType::Legge));
        assert_eq!(c.number, Some(241));

        let c = parse_citation("Art. 7 del D.P.R. 445/2000");
        assert_eq!(c.instrument, Some(InstrumentType::Dpr));

        let c = parse_citation("Art. 4 D.L. 18/2020");
        assert_eq!(c.instrument, Some(InstrumentType::Dl));
    }

    #[test]
    fn whitespace_is_collapsed() {
        let c = parse_citation("  Art.   1 ,   D.Lgs.  196 / 2003 ");
        assert!(c.valid);
        assert_eq!(c.number, Some(196));
    }

    #[test]
    fn unrecognised_input_is_invalid_not_panicking() {
        let c = parse_citation("la legge sulla privacy");
        assert!(!c.valid);
        assert!(c.error.as_deref().unwrap().contains("la legge sulla privacy"));
        assert!(c.instrument.is_none());

        assert!(!parse_citation("   ").valid);
        assert!(!parse_citation("Art. 99999999999, D.Lgs. 1/2000").valid);
    }
}
