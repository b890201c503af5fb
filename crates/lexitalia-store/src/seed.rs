//! Per-Act seed files: `<seeds_dir>/<act id>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use lexitalia_core::{Act, ActStatus, CrossReference, InstrumentType, Provision};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::StoreError;
use crate::json::{read_json, write_json_atomic};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedProvision {
    /// `art` + token, lowercase.
    pub provision_ref: String,
    /// Bare token.
    pub section: String,
    pub title: Option<String>,
    pub content: String,
}

impl From<&Provision> for SeedProvision {
    fn from(p: &Provision) -> Self {
        Self {
            provision_ref: p.provision_ref(),
            section: p.section(),
            title: p.heading.clone(),
            content: p.body.clone(),
        }
    }
}

/// A cross-reference tagged with the provision it was found in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedCrossReference {
    pub provision_ref: String,
    #[serde(flatten)]
    pub reference: CrossReference,
}

/// Everything known about one Act after ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub instrument: InstrumentType,
    pub title: String,
    pub short_name: Option<String>,
    pub status: ActStatus,
    pub issued_date: Option<String>,
    pub url: String,
    pub provisions: Vec<SeedProvision>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cross_references: Vec<SeedCrossReference>,
}

impl SeedRecord {
    pub fn new(act: Act, provisions: &[Provision], cross_references: Vec<SeedCrossReference>) -> Self {
        Self {
            id: act.id,
            instrument: act.instrument,
            title: act.title,
            short_name: act.short_name,
            status: act.status,
            issued_date: act.issued_date,
            url: act.url,
            provisions: provisions.iter().map(SeedProvision::from).collect(),
            cross_references,
        }
    }

    /// The explicit record written when an Act yields nothing.
    pub fn empty(act: Act) -> Self {
        Self::new(act, &[], Vec::new())
    }

    pub fn act(&self) -> Act {
        Act {
            id: self.id.clone(),
            instrument: self.instrument,
            title: self.title.clone(),
            short_name: self.short_name.clone(),
            status: self.status,
            issued_date: self.issued_date.clone(),
            url: self.url.clone(),
        }
    }
}

/// Directory of seed files.
#[derive(Debug, Clone)]
pub struct SeedStore {
    dir: PathBuf,
}

impl SeedStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    pub fn load(&self, id: &str) -> Result<SeedRecord, StoreError> {
        read_json(&self.path_for(id)).map_err(|e| match e {
            StoreError::NotFound(_) => StoreError::NotFound(format!("seed {id}")),
            other => other,
        })
    }

    /// Provision count of an existing seed, `None` if there is none.
    pub fn provision_count(&self, id: &str) -> Result<Option<usize>, StoreError> {
        match self.load(id) {
            Ok(seed) => Ok(Some(seed.provisions.len())),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replace the seed for `record.id` atomically.
    pub fn write(&self, record: &SeedRecord) -> Result<PathBuf, StoreError> {
        let path = self.path_for(&record.id);
        write_json_atomic(&path, record)?;
        debug!(id = %record.id, provisions = record.provisions.len(), path = %path.display(), "seed written");
        Ok(path)
    }

    /// Ids of every seed on disk, sorted. A missing directory is empty.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&self.dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Every readable seed. Malformed or vanished files are skipped with a
    /// warning; I/O failures still abort.
    pub fn load_all(&self) -> Result<Vec<SeedRecord>, StoreError> {
        let mut records = Vec::new();
        for id in self.list()? {
            match self.load(&id) {
                Ok(record) => records.push(record),
                Err(e @ (StoreError::Json { .. } | StoreError::NotFound(_))) => {
                    warn!(id = %id, error = %e, "skipping unreadable seed");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }
}
