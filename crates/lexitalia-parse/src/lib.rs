//! Pattern-based extraction from Normattiva markup: article fetch targets,
//! provisions, landing-page metadata, and EU cross-references.
//!
//! Nothing here builds a DOM. Every extractor is a pure function of its input
//! text and returns `None`/empty on markup it does not recognise.

pub mod article;
pub mod clean;
pub mod crossref;
pub mod landing;
pub mod markup;
pub mod urls;

pub use article::{
    AttachmentStrategy, FallbackStrategy, LegalTextParser, ParseStrategy, StructuredStrategy,
};
pub use crossref::{classify_relation, extract_cross_references, normalize_year};
pub use landing::{detect_status, page_title};
pub use urls::{ArticleTarget, extract_article_targets, extract_article_urls};
