//! Taxon ancestry index for the Argus scoring engine
//!
//! Maintains the process-wide mapping from each known taxon to its ordered
//! ancestor chain and its descendant closure, loaded in bulk at startup and
//! extended lazily as requests reference new taxa.

pub mod ancestry;
pub mod model_taxa;

pub use ancestry::{AncestryIndex, AncestrySource, DEFAULT_LOAD_CHUNK_SIZE};
pub use model_taxa::read_model_taxon_ids;
