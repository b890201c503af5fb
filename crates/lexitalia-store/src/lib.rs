//! Storage layer: per-Act JSON seeds, the census file, and a read-only
//! corpus index over the seeds.

mod error;
mod json;

pub mod census;
pub mod corpus;
pub mod seed;

pub use census::{Census, CensusEntry, CensusStore, CensusSummary, Classification, Outcome};
pub use corpus::CorpusIndex;
pub use error::StoreError;
pub use json::{read_json, write_json_atomic};
pub use seed::{SeedCrossReference, SeedProvision, SeedRecord, SeedStore};
