//! Vision score aggregation for the Argus scoring engine
//!
//! Takes raw per-taxon classifier confidences through normalization, subtree
//! restriction, common-ancestor resolution, and frequency blending to a
//! ranked, taxonomically coherent identification list.

pub mod ancestor;
pub mod frequency;
pub mod normalize;
pub mod pipeline;
pub mod subtree;

pub use ancestor::{
    CommonAncestorResolver, RankedCandidate, DEFAULT_ANCESTOR_THRESHOLD, DEFAULT_ANCESTOR_WINDOW,
    DEFAULT_RANK_LEVEL_CUTOFF,
};
pub use frequency::{BlendedScore, FrequencyBlender, NEGLIGIBLE_FREQUENCY_SCORE};
pub use normalize::{normalize_scores, Scored};
pub use pipeline::{ScoreContext, ScoreInput, ScoreOutcome, ScoringPipeline};
pub use subtree::filter_to_subtree;
