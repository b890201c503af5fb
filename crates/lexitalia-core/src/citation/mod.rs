//! Citation grammar: parse free-text Italian legal citations, render them back,
//! and validate them against the ingested corpus.

mod format;
mod grammar;
mod validate;

use serde::{Deserialize, Serialize};

use crate::model::{InstrumentType, act_id};

pub use format::{CitationStyle, format_citation};
pub use grammar::{GRAMMARS, Grammar, parse_citation};
pub use validate::{ActSummary, Corpus, MatchKind, ValidationResult, validate_citation};

/// Which surface grammar produced a citation, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationForm {
    /// `Art. 5, comma 2, D.Lgs. 196/2003`
    ParagraphShort,
    /// `dlgs-196-2003 art. 5`
    Identifier,
    /// `Art. 615-ter, Codice Penale`
    Code,
    /// `Art. 3, Decreto Legislativo 30 giugno 2003, n. 196`
    FullDate,
    /// `Art. 1, D.Lgs. 196/2003`
    Short,
    /// `Articolo 1, Decreto Legislativo n. 196/2003`
    FullNumbered,
}

/// Result of parsing a citation string. Never an error: failures come back
/// with `valid == false` and a diagnostic in `error`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedCitation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<CitationForm>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub instrument: Option<InstrumentType>,
    /// Numeric core of the article number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// ISO date, only when the citation spelled one out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Code title for identifier-less citations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ParsedCitation {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// A valid citation of `article` in a numbered Act.
    pub fn for_act(instrument: InstrumentType, number: u32, year: i32, article: &str) -> Self {
        Self {
            valid: true,
            instrument: Some(instrument),
            article: Some(article.to_string()),
            number: Some(number),
            year: Some(year),
            ..Default::default()
        }
    }

    /// Identifier of the cited Act, when the citation carries number and year.
    pub fn act_id(&self) -> Option<String> {
        match (self.instrument?, self.number, self.year) {
            (InstrumentType::Codice, _, _) => None,
            (instrument, Some(number), Some(year)) => Some(act_id(instrument, number, year)),
            _ => None,
        }
    }

    /// Article token including suffix, e.g. `615-ter`.
    pub fn article_token(&self) -> Option<String> {
        let article = self.article.as_deref()?;
        Some(match self.suffix.as_deref() {
            Some(suffix) => format!("{article}-{suffix}"),
            None => article.to_string(),
        })
    }
}
