//! Blending of vision scores with nearby occurrence frequencies
//!
//! Occurrence counts under the resolved common ancestor become frequency
//! shares that weight the vision scores; occurrences outside the ancestor's
//! subtree are kept but flagged with a negligible frequency score so callers
//! can still mark them "seen nearby".

use crate::normalize::{normalize_scores, Scored};
use argus_core::{CommonAncestor, OccurrenceCount, TaxonId, TaxonScore};
use argus_taxa::AncestryIndex;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Frequency score assigned to taxa seen nearby but outside the resolved
/// common ancestor: effectively zero, but distinguishable from "no
/// occurrence data at all"
pub const NEGLIGIBLE_FREQUENCY_SCORE: f64 = 1e-9;

/// One blended result row. `count` is the combined score (normalized to a
/// 0-100 scale across the result set); `vision_score` and `frequency_score`
/// are 0 where the respective signal is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendedScore {
    pub taxon_id: TaxonId,
    pub count: f64,
    pub vision_score: f64,
    pub frequency_score: f64,
}

impl Scored for BlendedScore {
    fn score(&self) -> f64 {
        self.count
    }

    fn set_score(&mut self, score: f64) {
        self.count = score;
    }
}

pub struct FrequencyBlender<'a> {
    ancestry: &'a AncestryIndex,
}

impl<'a> FrequencyBlender<'a> {
    pub fn new(ancestry: &'a AncestryIndex) -> Self {
        Self { ancestry }
    }

    /// Merge normalized vision scores with nearby occurrence counts into a
    /// single ranked result set, truncated to `page_size`. Without occurrence
    /// data the vision ranking passes through unchanged.
    pub fn blend(
        &self,
        scores: &[TaxonScore],
        occurrence_counts: &[OccurrenceCount],
        common_ancestor: Option<&CommonAncestor>,
        page_size: usize,
    ) -> Vec<BlendedScore> {
        if occurrence_counts.is_empty() {
            return vision_only(scores, page_size);
        }

        let mut in_ancestor: Vec<OccurrenceCount> = Vec::new();
        let mut unrelated: HashSet<TaxonId> = HashSet::new();
        for oc in occurrence_counts {
            let related = common_ancestor
                .map(|ca| self.ancestry.is_descendant(ca.taxon.id, oc.taxon_id))
                .unwrap_or(false);
            if related {
                in_ancestor.push(*oc);
            } else {
                unrelated.insert(oc.taxon_id);
            }
        }

        let freq_sum: u64 = in_ancestor.iter().map(|oc| oc.count).sum();
        let mut frequency_shares: HashMap<TaxonId, f64> = HashMap::new();
        let mut combined: IndexMap<TaxonId, f64> = IndexMap::new();
        if freq_sum > 0 {
            for oc in &in_ancestor {
                let share = oc.count as f64 / freq_sum as f64;
                frequency_shares.insert(oc.taxon_id, share);
                combined.insert(oc.taxon_id, share);
            }
        }

        // vision support without occurrence history still earns a small prior
        let no_share_prior = 1.0 / (in_ancestor.len().max(1) as f64 * 100.0);
        let mut vision: HashMap<TaxonId, f64> = HashMap::new();
        for score in scores {
            let v = score.count / 100.0;
            vision.insert(score.taxon_id, v);
            match combined.get_mut(&score.taxon_id) {
                Some(share) => *share *= v,
                None => {
                    combined.insert(score.taxon_id, v * no_share_prior);
                }
            }
        }

        let vision_len = scores.len().max(1) as f64;
        let mut blended: Vec<BlendedScore> = combined
            .iter()
            .map(|(&taxon_id, &value)| {
                let has_vision = vision.contains_key(&taxon_id);
                BlendedScore {
                    taxon_id,
                    // occurrence-only taxa get a vision-agnostic floor
                    count: if has_vision {
                        value
                    } else {
                        value * (1.0 / vision_len)
                    },
                    vision_score: vision.get(&taxon_id).copied().unwrap_or(0.0) * 100.0,
                    frequency_score: frequency_shares.get(&taxon_id).copied().unwrap_or(0.0)
                        * 100.0,
                }
            })
            .collect();

        blended.sort_by(|a, b| {
            b.count
                .partial_cmp(&a.count)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        normalize_scores(&mut blended);

        for row in &mut blended {
            if unrelated.contains(&row.taxon_id) {
                row.frequency_score = NEGLIGIBLE_FREQUENCY_SCORE;
            }
        }

        blended.truncate(page_size);
        blended
    }
}

fn vision_only(scores: &[TaxonScore], page_size: usize) -> Vec<BlendedScore> {
    scores
        .iter()
        .take(page_size)
        .map(|s| BlendedScore {
            taxon_id: s.taxon_id,
            count: s.count,
            vision_score: s.count,
            frequency_score: 0.0,
        })
        .collect()
}
