//! External collaborator clients for the Argus scoring engine
//!
//! Each collaborator (image classifier, taxon detail service, nearby
//! occurrence service, ancestry bulk source) is an async trait port with a
//! reqwest reference implementation, plus the content-addressed cache that
//! memoizes their responses.

pub mod ancestry;
pub mod cache;
pub mod classifier;
pub mod occurrences;
pub mod taxa;

pub use ancestry::HttpAncestrySource;
pub use cache::ResultCache;
pub use classifier::{Classifier, HttpClassifier};
pub use occurrences::{HttpOccurrenceService, OccurrenceQuery, OccurrenceService};
pub use taxa::{HttpTaxonService, InactiveReplacement, TaxonDetailService};
