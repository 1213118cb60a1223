//! Core domain types used throughout Argus

pub mod hash;
pub mod score;
pub mod taxon;

pub use hash::ContentHash;
pub use score::{CommonAncestor, OccurrenceCount, ScoredTaxon, TaxonScore};
pub use taxon::{AncestryRecord, Rank, TaxonDetail, TaxonId};
