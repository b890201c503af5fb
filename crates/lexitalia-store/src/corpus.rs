//! In-memory [`Corpus`] over the seed directory, for citation validation.

use std::collections::{HashMap, HashSet};

use lexitalia_core::{ActSummary, Corpus};

use crate::StoreError;
use crate::seed::{SeedRecord, SeedStore};

#[derive(Debug, Default)]
pub struct CorpusIndex {
    acts: Vec<ActSummary>,
    /// Act id → lowercase `provision_ref` and `section` keys.
    provisions: HashMap<String, HashSet<String>>,
}

impl CorpusIndex {
    pub fn from_records(records: impl IntoIterator<Item = SeedRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            let keys = record
                .provisions
                .iter()
                .flat_map(|p| [p.provision_ref.to_lowercase(), p.section.to_lowercase()])
                .collect();
            index.provisions.insert(record.id.clone(), keys);
            index.acts.push(ActSummary {
                id: record.id,
                title: record.title,
                short_name: record.short_name,
                status: record.status,
            });
        }
        index
    }

    pub fn load(store: &SeedStore) -> Result<Self, StoreError> {
        Ok(Self::from_records(store.load_all()?))
    }

    pub fn len(&self) -> usize {
        self.acts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acts.is_empty()
    }
}

impl Corpus for CorpusIndex {
    fn acts(&self) -> &[ActSummary] {
        &self.acts
    }

    fn provision_exists(&self, act_id: &str, key: &str) -> bool {
        self.provisions
            .get(act_id)
            .is_some_and(|keys| keys.contains(&key.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use lexitalia_core::{
        Act, ActStatus, ArticleRef, InstrumentType, Provision, parse_citation, validate_citation,
    };

    use super::*;

    fn seed(id: &str, instrument: InstrumentType, title: &str, tokens: &[&str]) -> SeedRecord {
        let provisions: Vec<Provision> = tokens
            .iter()
            .map(|t| Provision {
                article: ArticleRef::parse(t).unwrap(),
                heading: None,
                body: format!("Testo dell'articolo {t}"),
            })
            .collect();
        SeedRecord::new(
            Act {
                id: id.into(),
                instrument,
                title: title.into(),
                short_name: None,
                status: ActStatus::InForce,
                issued_date: None,
                url: String::new(),
            },
            &provisions,
            Vec::new(),
        )
    }

    #[test]
    fn validates_against_written_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeedStore::new(dir.path());
        store
            .write(&seed(
                "dlgs-196-2003",
                InstrumentType::Dlgs,
                "Codice in materia di protezione dei dati personali",
                &["1", "2", "2-bis"],
            ))
            .unwrap();
        store
            .write(&seed("codice-penale", InstrumentType::Codice, "Codice Penale", &["615-ter"]))
            .unwrap();

        let index = CorpusIndex::load(&store).unwrap();
        assert_eq!(index.len(), 2);

        let result = validate_citation(&parse_citation("Art. 2, D.Lgs. 196/2003"), &index);
        assert!(result.valid);
        assert_eq!(result.provision_found, Some(true));

        let result = validate_citation(&parse_citation("Art. 615-ter c.p."), &index);
        assert!(result.valid);
        assert_eq!(result.act_id.as_deref(), Some("codice-penale"));
        assert_eq!(result.provision_found, Some(true));

        let result = validate_citation(&parse_citation("Art. 99, D.Lgs. 196/2003"), &index);
        assert!(result.valid);
        assert_eq!(result.provision_found, Some(false));
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn malformed_seed_does_not_block_validation() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeedStore::new(dir.path());
        store
            .write(&seed("legge-241-1990", InstrumentType::Legge, "Procedimento amministrativo", &["21-octies"]))
            .unwrap();
        std::fs::write(store.path_for("dlgs-1-2000"), "non è json").unwrap();

        let index = CorpusIndex::load(&store).unwrap();
        assert_eq!(index.len(), 1);
        let result = validate_citation(&parse_citation("Art. 21-octies, L. 241/1990"), &index);
        assert!(result.valid);
        assert_eq!(result.provision_found, Some(true));
    }

    #[test]
    fn keys_are_case_insensitive() {
        let index = CorpusIndex::from_records([seed("legge-1-2020", InstrumentType::Legge, "T", &["3-bis"])]);
        assert!(index.provision_exists("legge-1-2020", "ART3-BIS"));
        assert!(index.provision_exists("legge-1-2020", "3-bis"));
        assert!(!index.provision_exists("legge-1-2020", "3"));
        assert!(!index.provision_exists("legge-2-2020", "3-bis"));
    }
}
