//! Core utilities and types shared across all Argus crates

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, save_config, Config, ScoringConfig};
pub use error::{ArgusError, ArgusResult};

// Re-export core types
pub use types::{
    AncestryRecord, CommonAncestor, ContentHash, OccurrenceCount, Rank, ScoredTaxon, TaxonDetail,
    TaxonId, TaxonScore,
};

/// Version information for the Argus project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
