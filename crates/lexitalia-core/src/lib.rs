//! Shared domain types for the Lexitalia workspace: Acts, provisions,
//! cross-references, article sort keys, and the citation grammar.

pub mod citation;
pub mod model;
pub mod sort_key;

pub use citation::{
    ActSummary, CitationForm, CitationStyle, Corpus, ParsedCitation, ValidationResult,
    format_citation, parse_citation, validate_citation,
};
pub use model::{
    Act, ActStatus, ArticleRef, CommunityBody, CrossReference, ForeignInstrumentType,
    InstrumentType, Provision, Relation, act_id, dedup_provisions, mark_primary,
};
pub use sort_key::normalize_article;
