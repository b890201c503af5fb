//! Resolve parsed citations against the corpus.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ParsedCitation;
use crate::model::ActStatus;

/// The fields of an Act the validator needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActSummary {
    pub id: String,
    pub title: String,
    pub short_name: Option<String>,
    pub status: ActStatus,
}

/// Read access to the ingested corpus.
pub trait Corpus {
    fn acts(&self) -> &[ActSummary];

    fn find_act(&self, id: &str) -> Option<&ActSummary> {
        self.acts().iter().find(|a| a.id == id)
    }

    /// Whether `key` matches either the stored `provision_ref` or `section`
    /// of some provision of `act_id`.
    fn provision_exists(&self, act_id: &str, key: &str) -> bool;
}

/// How the target Act was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    ExactId,
    NormalizedId,
    ExactTitle,
    TitleSubstring,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The target Act resolved.
    pub valid: bool,
    pub act_id: Option<String>,
    pub act_title: Option<String>,
    pub matched_by: Option<MatchKind>,
    /// `None` when the citation names no provision.
    pub provision_found: Option<bool>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

/// Validate `citation` against `corpus`.
///
/// Missing provisions and repealed Acts produce warnings; only an
/// unresolvable Act makes the result invalid.
pub fn validate_citation(citation: &ParsedCitation, corpus: &dyn Corpus) -> ValidationResult {
    if !citation.valid {
        return ValidationResult {
            error: Some(
                citation
                    .error
                    .clone()
                    .unwrap_or_else(|| "citation could not be parsed".into()),
            ),
            ..Default::default()
        };
    }

    let Some((act, matched_by)) = resolve_act(citation, corpus) else {
        let target = citation
            .act_id()
            .or_else(|| citation.title.clone())
            .unwrap_or_default();
        return ValidationResult {
            error: Some(format!("document not found: {target}")),
            ..Default::default()
        };
    };
    debug!(act_id = %act.id, ?matched_by, "citation resolved");

    let mut result = ValidationResult {
        valid: true,
        act_id: Some(act.id.clone()),
        act_title: Some(act.title.clone()),
        matched_by: Some(matched_by),
        ..Default::default()
    };

    if let Some(token) = citation.article_token() {
        let prefixed = format!("art{token}").to_lowercase();
        let found = [token.as_str(), prefixed.as_str()]
            .iter()
            .any(|key| corpus.provision_exists(&act.id, key));
        result.provision_found = Some(found);
        if !found {
            result
                .warnings
                .push(format!("article {token} not found in {}", act.id));
        }
    }

    if act.status == ActStatus::Repealed {
        result
            .warnings
            .push(format!("{} has been repealed", act.id));
    }

    result
}

fn resolve_act<'a>(
    citation: &ParsedCitation,
    corpus: &'a dyn Corpus,
) -> Option<(&'a ActSummary, MatchKind)> {
    if let Some(id) = citation.act_id() {
        if let Some(act) = corpus.find_act(&id) {
            return Some((act, MatchKind::ExactId));
        }
        let wanted = normalize_id(&id);
        if let Some(act) = corpus.acts().iter().find(|a| normalize_id(&a.id) == wanted) {
            return Some((act, MatchKind::NormalizedId));
        }
    }

    let title = citation.title.as_deref()?.trim().to_lowercase();
    if title.is_empty() {
        return None;
    }

    let exact = corpus.acts().iter().find(|a| {
        a.title.to_lowercase() == title
            || a
                .short_name
                .as_deref()
                .is_some_and(|s| s.to_lowercase() == title)
    });
    if let Some(act) = exact {
        return Some((act, MatchKind::ExactTitle));
    }

    corpus
        .acts()
        .iter()
        .filter(|a| a.title.to_lowercase().contains(&title))
        .min_by(|a, b| {
            a.title
                .chars()
                .count()
                .cmp(&b.title.chars().count())
                .then((a.status == ActStatus::Repealed).cmp(&(b.status == ActStatus::Repealed)))
                .then(a.id.cmp(&b.id))
        })
        .map(|act| (act, MatchKind::TitleSubstring))
}

/// Fold identifier spellings together: `D.Lgs. 196/2003`, `dlgs_196_2003`
/// and `DLGS-196-2003` all become `dlgs-196-2003`.
pub fn normalize_id(raw: &str) -> String {
    let mut groups: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_alpha = false;

    for c in raw.chars().flat_map(char::to_lowercase) {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
            continue;
        }
        let alpha = c.is_alphabetic();
        if !current.is_empty() && alpha != current_alpha {
            groups.push(std::mem::take(&mut current));
        }
        current_alpha = alpha;
        current.push(c);
    }
    if !current.is_empty() {
        groups.push(current);
    }

    // Letter groups split by punctuation ("d", "lgs") belong together.
    let mut merged: Vec<String> = Vec::new();
    for group in groups {
        let is_alpha = group.chars().all(char::is_alphabetic);
        match merged.last_mut() {
            Some(prev) if is_alpha && prev.chars().all(char::is_alphabetic) => prev.push_str(&group),
            _ => merged.push(group),
        }
    }
    merged.join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::parse_citation;
    use std::collections::HashSet;

    struct MemCorpus {
        acts: Vec<ActSummary>,
        provisions: HashSet<(String, String)>,
    }

    impl Corpus for MemCorpus {
        fn acts(&self) -> &[ActSummary] {
            &self.acts
        }

        fn provision_exists(&self, act_id: &str, key: &str) -> bool {
            self.provisions
                .contains(&(act_id.to_string(), key.to_string()))
        }
    }

    fn act(id: &str, title: &str, status: ActStatus) -> ActSummary {
        ActSummary {
            id: id.into(),
            title: title.into(),
            short_name: None,
            status,
        }
    }

    fn corpus() -> MemCorpus {
        let mut provisions = HashSet::new();
        for (act, key) in [
            ("dlgs-196-2003", "art1"),
            ("dlgs-196-2003", "1"),
            ("codice-penale", "art615-ter"),
            ("codice-penale", "615-ter"),
        ] {
            provisions.insert((act.to_string(), key.to_string()));
        }
        let mut privacy = act(
            "dlgs-196-2003",
            "Codice in materia di protezione dei dati personali",
            ActStatus::Amended,
        );
        privacy.short_name = Some("Codice Privacy".into());
        MemCorpus {
            acts: vec![
                privacy,
                act("codice-penale", "Codice Penale", ActStatus::InForce),
                act(
                    "rd-1398-1930",
                    "Approvazione del testo definitivo del Codice Penale",
                    ActStatus::InForce,
                ),
                act("legge-675-1996", "Tutela delle persone", ActStatus::Repealed),
            ],
            provisions,
        }
    }

    #[test]
    fn exact_id_with_existing_article() {
        let r = validate_citation(&parse_citation("Art. 1, D.Lgs. 196/2003"), &corpus());
        assert!(r.valid);
        assert_eq!(r.matched_by, Some(MatchKind::ExactId));
        assert_eq!(r.provision_found, Some(true));
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn missing_article_is_a_warning() {
        let r = validate_citation(&parse_citation("Art. 999, D.Lgs. 196/2003"), &corpus());
        assert!(r.valid);
        assert_eq!(r.provision_found, Some(false));
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn unknown_document_stops_early() {
        let r = validate_citation(&parse_citation("Art. 1, L. 1/1901"), &corpus());
        assert!(!r.valid);
        assert_eq!(r.error.as_deref(), Some("document not found: legge-1-1901"));
        assert!(r.provision_found.is_none());
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn repealed_act_always_warns() {
        let r = validate_citation(&parse_citation("Art. 1, L. 675/1996"), &corpus());
        assert!(r.valid);
        assert_eq!(r.warnings.len(), 2);
        assert!(r.warnings[1].contains("repealed"));
    }

    #[test]
    fn code_resolves_by_exact_title_before_substring() {
        let r = validate_citation(&parse_citation("Art. 615-ter, Codice Penale"), &corpus());
        assert_eq!(r.act_id.as_deref(), Some("codice-penale"));
        assert_eq!(r.matched_by, Some(MatchKind::ExactTitle));
        assert_eq!(r.provision_found, Some(true));
    }

    #[test]
    fn short_name_counts_as_exact_title() {
        let c = ParsedCitation {
            valid: true,
            instrument: Some(crate::model::InstrumentType::Codice),
            article: Some("1".into()),
            title: Some("codice privacy".into()),
            ..Default::default()
        };
        let r = validate_citation(&c, &corpus());
        assert_eq!(r.act_id.as_deref(), Some("dlgs-196-2003"));
        assert_eq!(r.matched_by, Some(MatchKind::ExactTitle));
    }

    #[test]
    fn substring_prefers_shortest_title() {
        let mut corpus = corpus();
        corpus.acts.retain(|a| a.id != "codice-penale");
        corpus.acts.push(act("rd-1-1931", "Codice Penale militare", ActStatus::InForce));
        let c = ParsedCitation {
            valid: true,
            instrument: Some(crate::model::InstrumentType::Codice),
            article: Some("1".into()),
            title: Some("Codice Penale".into()),
            ..Default::default()
        };
        let r = validate_citation(&c, &corpus);
        assert_eq!(r.act_id.as_deref(), Some("rd-1-1931"));
        assert_eq!(r.matched_by, Some(MatchKind::TitleSubstring));
    }

    #[test]
    fn invalid_citation_passes_diagnostic_through() {
        let r = validate_citation(&parse_citation("boh"), &corpus());
        assert!(!r.valid);
        assert!(r.error.unwrap().contains("boh"));
    }

    #[test]
    fn normalize_id_folds_spellings() {
        assert_eq!(normalize_id("D.Lgs. 196/2003"), "dlgs-196-2003");
        assert_eq!(normalize_id("dlgs_196_2003"), "dlgs-196-2003");
        assert_eq!(normalize_id("DLGS-196-2003"), "dlgs-196-2003");
        assert_eq!(normalize_id("legge 241 1990"), "legge-241-1990");
    }
}
