//! Shared corpus types: Acts, provisions, and foreign-instrument cross-references.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Latin ordinal suffixes marking articles inserted after the original numbering.
///
/// Order matters: it is the insertion order (`2`, `2-bis`, `2-ter`, ...) and
/// drives [`crate::sort_key::normalize_article`]. Long insertion runs
/// (`2-terdecies`, `2-septiesdecies`) are ordinary article numbers, so every
/// pattern built from this list accepts the whole vocabulary.
pub const ORDINAL_SUFFIXES: &[&str] = &[
    "bis",
    "ter",
    "quater",
    "quinquies",
    "sexies",
    "septies",
    "octies",
    "novies",
    "decies",
    "undecies",
    "duodecies",
    "terdecies",
    "quaterdecies",
    "quinquiesdecies",
    "sexiesdecies",
    "septiesdecies",
    "octiesdecies",
    "noviesdecies",
    "vicies",
];

/// Spelling variants folded onto their canonical vocabulary entry.
const SUFFIX_ALIASES: &[(&str, &str)] = &[("nonies", "novies"), ("quindecies", "quinquiesdecies")];

/// Canonicalise a suffix; `None` if it is not part of the vocabulary.
pub fn canonical_suffix(raw: &str) -> Option<&'static str> {
    let lower = raw.trim().to_ascii_lowercase();
    if let Some(&(_, canon)) = SUFFIX_ALIASES.iter().find(|(alias, _)| *alias == lower) {
        return Some(canon);
    }
    ORDINAL_SUFFIXES.iter().copied().find(|s| *s == lower)
}

/// 1-based position of a suffix in [`ORDINAL_SUFFIXES`].
pub fn suffix_rank(suffix: &str) -> Option<usize> {
    let canon = canonical_suffix(suffix)?;
    ORDINAL_SUFFIXES
        .iter()
        .position(|s| *s == canon)
        .map(|i| i + 1)
}

/// Regex alternation over the suffix vocabulary, longest spellings first so
/// that `ter` never shadows `terdecies`.
pub fn suffix_alternation() -> String {
    let mut words: Vec<&str> = ORDINAL_SUFFIXES.to_vec();
    words.extend(SUFFIX_ALIASES.iter().map(|(alias, _)| *alias));
    words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    words.join("|")
}

// ── Instruments ──

/// Domestic instrument types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    /// Legge ordinaria.
    Legge,
    /// Decreto legislativo (delegated decree).
    Dlgs,
    /// Decreto-legge.
    Dl,
    /// Decreto del Presidente della Repubblica.
    Dpr,
    /// Regio decreto.
    Rd,
    /// Decreto del Presidente del Consiglio dei Ministri.
    Dpcm,
    /// Decreto ministeriale.
    Dm,
    /// A named code, cited by title only.
    Codice,
}

impl InstrumentType {
    pub const ALL: [InstrumentType; 8] = [
        Self::Legge,
        Self::Dlgs,
        Self::Dl,
        Self::Dpr,
        Self::Rd,
        Self::Dpcm,
        Self::Dm,
        Self::Codice,
    ];

    /// Identifier prefix, e.g. `dlgs` in `dlgs-196-2003`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Legge => "legge",
            Self::Dlgs => "dlgs",
            Self::Dl => "dl",
            Self::Dpr => "dpr",
            Self::Rd => "rd",
            Self::Dpcm => "dpcm",
            Self::Dm => "dm",
            Self::Codice => "codice",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let lower = code.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.code() == lower)
    }

    /// Spelled-out name as used in the Gazzetta Ufficiale headings.
    pub fn full_name(&self) -> &'static str {
        match self {
            Self::Legge => "Legge",
            Self::Dlgs => "Decreto Legislativo",
            Self::Dl => "Decreto-Legge",
            Self::Dpr => "Decreto del Presidente della Repubblica",
            Self::Rd => "Regio Decreto",
            Self::Dpcm => "Decreto del Presidente del Consiglio dei Ministri",
            Self::Dm => "Decreto Ministeriale",
            Self::Codice => "Codice",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Self::Legge => "L.",
            Self::Dlgs => "D.Lgs.",
            Self::Dl => "D.L.",
            Self::Dpr => "D.P.R.",
            Self::Rd => "R.D.",
            Self::Dpcm => "D.P.C.M.",
            Self::Dm => "D.M.",
            Self::Codice => "Cod.",
        }
    }

    /// Classify an abbreviation such as `D.Lgs.`, `d. lgs`, `DPR` or `L.`.
    pub fn from_abbreviation(raw: &str) -> Option<Self> {
        let squashed: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();
        match squashed.as_str() {
            "l" | "legge" => Some(Self::Legge),
            "dlgs" | "dlg" | "dleg" => Some(Self::Dlgs),
            "dl" => Some(Self::Dl),
            "dpr" => Some(Self::Dpr),
            "rd" => Some(Self::Rd),
            "dpcm" => Some(Self::Dpcm),
            "dm" => Some(Self::Dm),
            _ => None,
        }
    }

    /// Classify a spelled-out type name (case and hyphenation insensitive).
    pub fn from_full_name(raw: &str) -> Option<Self> {
        let norm = raw
            .to_lowercase()
            .replace('-', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match norm.as_str() {
            "legge" => Some(Self::Legge),
            "decreto legislativo" => Some(Self::Dlgs),
            "decreto legge" => Some(Self::Dl),
            "decreto del presidente della repubblica" => Some(Self::Dpr),
            "regio decreto" => Some(Self::Rd),
            "decreto del presidente del consiglio dei ministri" => Some(Self::Dpcm),
            "decreto ministeriale" => Some(Self::Dm),
            _ => None,
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Build the stable Act identifier `<type>-<number>-<year>`.
pub fn act_id(instrument: InstrumentType, number: u32, year: i32) -> String {
    format!("{}-{}-{}", instrument.code(), number, year)
}

/// Lifecycle status of an Act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActStatus {
    NotYetInForce,
    #[default]
    InForce,
    Amended,
    Repealed,
}

impl ActStatus {
    fn rank(self) -> u8 {
        match self {
            Self::NotYetInForce => 0,
            Self::InForce => 1,
            Self::Amended => 2,
            Self::Repealed => 3,
        }
    }

    /// Move toward `observed` without ever stepping back from repeal.
    pub fn advance(self, observed: ActStatus) -> ActStatus {
        if observed.rank() >= self.rank() {
            observed
        } else {
            self
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotYetInForce => "not_yet_in_force",
            Self::InForce => "in_force",
            Self::Amended => "amended",
            Self::Repealed => "repealed",
        }
    }
}

/// A top-level legal instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Act {
    pub id: String,
    #[serde(rename = "type")]
    pub instrument: InstrumentType,
    pub title: String,
    pub short_name: Option<String>,
    pub status: ActStatus,
    /// ISO 8601 date (`YYYY-MM-DD`).
    pub issued_date: Option<String>,
    pub url: String,
}

// ── Provisions ──

/// An article reference token: numeric core plus optional ordinal suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArticleRef {
    pub number: u32,
    /// Canonical lowercase suffix from [`ORDINAL_SUFFIXES`].
    pub suffix: Option<String>,
}

impl ArticleRef {
    pub fn new(number: u32, suffix: Option<&str>) -> Self {
        Self {
            number,
            suffix: suffix.and_then(canonical_suffix).map(str::to_string),
        }
    }

    /// Parse `615`, `615-ter`, `615 ter` or `615ter`.
    ///
    /// An unknown suffix makes the whole token invalid.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let digit_end = token
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(token.len());
        if digit_end == 0 {
            return None;
        }
        let number: u32 = token[..digit_end].parse().ok()?;
        let rest = token[digit_end..].trim_start_matches(['-', ' ', '.']);
        let rest = rest.trim_end_matches('.');
        if rest.is_empty() {
            return Some(Self::new(number, None));
        }
        let suffix = canonical_suffix(rest)?;
        Some(Self::new(number, Some(suffix)))
    }

    /// Bare token, e.g. `615-ter`.
    pub fn token(&self) -> String {
        match &self.suffix {
            Some(s) => format!("{}-{}", self.number, s),
            None => self.number.to_string(),
        }
    }
}

impl fmt::Display for ArticleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

/// One numbered article of an Act.
#[derive(Debug, Clone, PartialEq)]
pub struct Provision {
    pub article: ArticleRef,
    pub heading: Option<String>,
    pub body: String,
}

impl Provision {
    /// Lookup key stored as `provision_ref`, e.g. `art615-ter`.
    pub fn provision_ref(&self) -> String {
        format!("art{}", self.article.token()).to_lowercase()
    }

    /// Alternate lookup key stored as `section`: the bare token.
    pub fn section(&self) -> String {
        self.article.token()
    }
}

/// Collapse duplicate article tokens.
///
/// The longer body wins; on equal length the incumbent keeps its body. A
/// missing heading is filled from the other side. First-seen order is kept.
pub fn dedup_provisions(provisions: Vec<Provision>) -> Vec<Provision> {
    let mut out: Vec<Provision> = Vec::with_capacity(provisions.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for candidate in provisions {
        let key = candidate.article.token();
        let Some(&slot) = index.get(&key) else {
            index.insert(key, out.len());
            out.push(candidate);
            continue;
        };

        let incumbent = &mut out[slot];
        if candidate.body.chars().count() > incumbent.body.chars().count() {
            let heading = candidate.heading.or_else(|| incumbent.heading.take());
            incumbent.body = candidate.body;
            incumbent.heading = heading;
        } else if incumbent.heading.is_none() {
            incumbent.heading = candidate.heading;
        }
    }

    out
}

// ── Cross-references ──

/// Foreign instrument kinds detected in provision text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForeignInstrumentType {
    Regulation,
    Directive,
}

impl ForeignInstrumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regulation => "regulation",
            Self::Directive => "directive",
        }
    }
}

/// Originating community body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommunityBody {
    #[serde(rename = "EU")]
    Eu,
    #[serde(rename = "EC")]
    Ec,
    #[serde(rename = "EEC")]
    Eec,
    #[serde(rename = "Euratom")]
    Euratom,
}

impl CommunityBody {
    /// Map English or Italian initials (`UE`, `CE`, `CEE`, ...).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "EU" | "UE" => Some(Self::Eu),
            "EC" | "CE" => Some(Self::Ec),
            "EEC" | "CEE" => Some(Self::Eec),
            "EURATOM" => Some(Self::Euratom),
            _ => None,
        }
    }

    /// Body that was issuing instruments in `year`, for citations that omit it.
    pub fn for_year(year: i32) -> Self {
        if year >= 2010 {
            Self::Eu
        } else if year >= 1993 {
            Self::Ec
        } else {
            Self::Eec
        }
    }
}

/// How the citing provision relates to the foreign instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Implements,
    References,
}

/// A citation of a foreign instrument found inside a provision body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReference {
    pub instrument: ForeignInstrumentType,
    pub body: CommunityBody,
    pub year: i32,
    pub number: u32,
    pub article: Option<String>,
    pub context: String,
    pub relation: Relation,
    pub matched_text: String,
    #[serde(default)]
    pub primary: bool,
}

impl CrossReference {
    /// `"<type>:<year>/<number>"`, e.g. `regulation:2016/679`.
    pub fn foreign_id(&self) -> String {
        format!("{}:{}/{}", self.instrument.as_str(), self.year, self.number)
    }
}

/// Flag the first `implements` reference per foreign instrument as primary.
///
/// Applied across all provisions of one Act, in document order.
pub fn mark_primary<'a>(refs: impl IntoIterator<Item = &'a mut CrossReference>) {
    let mut seen = std::collections::HashSet::new();
    for r in refs {
        r.primary = false;
        if r.relation == Relation::Implements && seen.insert(r.foreign_id()) {
            r.primary = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prov(token: &str, heading: Option<&str>, body: &str) -> Provision {
        Provision {
            article: ArticleRef::parse(token).unwrap(),
            heading: heading.map(str::to_string),
            body: body.to_string(),
        }
    }

    #[test]
    fn article_ref_parses_suffix_spellings() {
        for raw in ["615-ter", "615 ter", "615ter", "615-TER"] {
            let r = ArticleRef::parse(raw).unwrap();
            assert_eq!(r.number, 615);
            assert_eq!(r.suffix.as_deref(), Some("ter"));
            assert_eq!(r.token(), "615-ter");
        }
        assert_eq!(ArticleRef::parse("12").unwrap().token(), "12");
        assert!(ArticleRef::parse("12-foo").is_none());
        assert!(ArticleRef::parse("bis").is_none());
    }

    #[test]
    fn nonies_folds_onto_novies() {
        assert_eq!(ArticleRef::parse("3-nonies").unwrap().token(), "3-novies");
    }

    #[test]
    fn provision_keys() {
        let p = prov("2-bis", None, "testo");
        assert_eq!(p.provision_ref(), "art2-bis");
        assert_eq!(p.section(), "2-bis");
    }

    #[test]
    fn suffix_alternation_prefers_longer_words() {
        let alt = suffix_alternation();
        let words: Vec<&str> = alt.split('|').collect();
        let pos = |w: &str| words.iter().position(|x| *x == w).unwrap();
        assert!(pos("terdecies") < pos("ter"));
        assert!(pos("quaterdecies") < pos("quater"));
        assert!(words.contains(&"septiesdecies"));
        assert!(words.contains(&"nonies"));
    }

    #[test]
    fn dedup_keeps_longer_body() {
        let merged = dedup_provisions(vec![
            prov("1", Some("Oggetto"), "breve testo"),
            prov("2", None, "secondo articolo"),
            prov("1", None, "testo decisamente più lungo"),
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].body, "testo decisamente più lungo");
        assert_eq!(merged[0].heading.as_deref(), Some("Oggetto"));
        assert_eq!(merged[1].section(), "2");
    }

    #[test]
    fn dedup_equal_length_fills_missing_heading() {
        let merged = dedup_provisions(vec![
            prov("4", None, "abcdefgh"),
            prov("4", Some("Definizioni"), "ijklmnop"),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].body, "abcdefgh");
        assert_eq!(merged[0].heading.as_deref(), Some("Definizioni"));
    }

    #[test]
    fn dedup_equal_length_keeps_incumbent_heading() {
        let merged = dedup_provisions(vec![
            prov("4", Some("Prima"), "abcdefgh"),
            prov("4", Some("Seconda"), "ijklmnop"),
        ]);
        assert_eq!(merged[0].heading.as_deref(), Some("Prima"));
    }

    #[test]
    fn status_never_steps_back_from_repeal() {
        assert_eq!(ActStatus::InForce.advance(ActStatus::Amended), ActStatus::Amended);
        assert_eq!(ActStatus::Repealed.advance(ActStatus::InForce), ActStatus::Repealed);
    }

    #[test]
    fn instrument_abbreviations() {
        assert_eq!(InstrumentType::from_abbreviation("D.Lgs."), Some(InstrumentType::Dlgs));
        assert_eq!(InstrumentType::from_abbreviation("d. lgs"), Some(InstrumentType::Dlgs));
        assert_eq!(InstrumentType::from_abbreviation("D.L."), Some(InstrumentType::Dl));
        assert_eq!(InstrumentType::from_abbreviation("DPR"), Some(InstrumentType::Dpr));
        assert_eq!(InstrumentType::from_abbreviation("L."), Some(InstrumentType::Legge));
        assert_eq!(
            InstrumentType::from_full_name("Decreto-Legge"),
            Some(InstrumentType::Dl)
        );
        assert_eq!(act_id(InstrumentType::Dlgs, 196, 2003), "dlgs-196-2003");
    }

    #[test]
    fn primary_is_first_implements_per_instrument() {
        let make = |relation, article: Option<&str>| CrossReference {
            instrument: ForeignInstrumentType::Regulation,
            body: CommunityBody::Eu,
            year: 2016,
            number: 679,
            article: article.map(str::to_string),
            context: String::new(),
            relation,
            matched_text: "Regolamento (UE) 2016/679".into(),
            primary: false,
        };
        let mut refs = vec![
            make(Relation::References, None),
            make(Relation::Implements, Some("6")),
            make(Relation::Implements, Some("9")),
        ];
        mark_primary(refs.iter_mut());
        assert_eq!(
            refs.iter().map(|r| r.primary).collect::<Vec<_>>(),
            vec![false, true, false]
        );
        assert_eq!(refs[0].foreign_id(), "regulation:2016/679");
    }

    #[test]
    fn community_body_labels() {
        assert_eq!(CommunityBody::from_label("UE"), Some(CommunityBody::Eu));
        assert_eq!(CommunityBody::from_label("cee"), Some(CommunityBody::Eec));
        assert_eq!(CommunityBody::for_year(1995), CommunityBody::Ec);
        assert_eq!(CommunityBody::for_year(2016), CommunityBody::Eu);
    }
}
