//! The census: every Act known to exist, and how far ingestion got with it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use lexitalia_core::InstrumentType;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::StoreError;
use crate::json::{read_json, write_json_atomic};

/// Whether an Act is in scope for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Ingestable,
    Excluded,
    /// Issued before the Republic; ingested only on request.
    PreRepublic,
}

/// Result of the last ingestion attempt for an Act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Partial,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CensusEntry {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub instrument: InstrumentType,
    pub number: u32,
    pub year: i32,
    pub date: Option<String>,
    pub urn: Option<String>,
    pub url: Option<String>,
    pub classification: Classification,
    #[serde(default)]
    pub ingested: bool,
    #[serde(default)]
    pub provision_count: usize,
    #[serde(default)]
    pub ingestion_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl CensusEntry {
    /// Record a finished ingestion attempt.
    pub fn mark_ingested(&mut self, provision_count: usize, outcome: Outcome) {
        self.ingested = true;
        self.provision_count = provision_count;
        self.outcome = Some(outcome);
        self.ingestion_date = Some(now_utc_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CensusSummary {
    pub total: usize,
    pub ingested: usize,
    pub provisions: usize,
    pub by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Census {
    pub entries: Vec<CensusEntry>,
    #[serde(default)]
    pub summary: CensusSummary,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Census {
    pub fn new(entries: Vec<CensusEntry>) -> Self {
        let mut census = Self {
            entries,
            ..Self::default()
        };
        census.recompute_summary();
        census
    }

    pub fn entry(&self, id: &str) -> Option<&CensusEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entry_mut(&mut self, id: &str) -> Option<&mut CensusEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn recompute_summary(&mut self) {
        let mut summary = CensusSummary {
            total: self.entries.len(),
            ..CensusSummary::default()
        };
        for entry in &self.entries {
            *summary
                .by_type
                .entry(entry.instrument.code().to_string())
                .or_default() += 1;
            if entry.ingested {
                summary.ingested += 1;
                summary.provisions += entry.provision_count;
            }
        }
        self.summary = summary;
    }
}

/// The census file on disk.
#[derive(Debug, Clone)]
pub struct CensusStore {
    path: PathBuf,
}

impl CensusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Census, StoreError> {
        read_json(&self.path)
    }

    /// Recompute the summary, stamp `updated_at`, and replace the file.
    pub fn save(&self, census: &mut Census) -> Result<(), StoreError> {
        census.recompute_summary();
        census.updated_at = Some(now_utc_string());
        write_json_atomic(&self.path, census)?;
        debug!(
            path = %self.path.display(),
            ingested = census.summary.ingested,
            total = census.summary.total,
            "census checkpoint"
        );
        Ok(())
    }
}

fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
