//! Common ancestor resolution
//!
//! Finds the most specific taxon that explains the top slice of the vision
//! scores: every taxon on a candidate's ancestor chain (the candidate
//! included) accumulates that candidate's vision score, and the walk descends
//! from the root set toward the leaves while a child still carries at least
//! the threshold share of the window's score mass.

use argus_core::{CommonAncestor, Rank, TaxonDetail, TaxonId};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

/// Number of top vision results considered for the common ancestor
pub const DEFAULT_ANCESTOR_WINDOW: usize = 10;
/// Minimum share of the window's vision-score mass, in percent
pub const DEFAULT_ANCESTOR_THRESHOLD: f64 = 92.0;
/// Common ancestor can be no coarser than superfamily
pub const DEFAULT_RANK_LEVEL_CUTOFF: f64 = 33.0;

/// A vision candidate enriched with its taxon detail
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub taxon: TaxonDetail,
    pub vision_score: f64,
}

pub struct CommonAncestorResolver {
    pub window: usize,
    pub threshold: f64,
    pub rank_level_cutoff: f64,
}

impl Default for CommonAncestorResolver {
    fn default() -> Self {
        Self {
            window: DEFAULT_ANCESTOR_WINDOW,
            threshold: DEFAULT_ANCESTOR_THRESHOLD,
            rank_level_cutoff: DEFAULT_RANK_LEVEL_CUTOFF,
        }
    }
}

impl CommonAncestorResolver {
    pub fn new(window: usize, threshold: f64, rank_level_cutoff: f64) -> Self {
        Self {
            window,
            threshold,
            rank_level_cutoff,
        }
    }

    /// Resolve the common ancestor of the top-ranked candidates, or `None`
    /// when no taxon concentrates enough confidence at an acceptable rank.
    pub fn resolve(&self, candidates: &[RankedCandidate]) -> Option<CommonAncestor> {
        let window = &candidates[..candidates.len().min(self.window.max(1))];
        if window.is_empty() {
            return None;
        }

        // the threshold is a share of the window's mass, so scores are
        // re-normalized over the window alone
        let sum: f64 = window.iter().map(|c| c.vision_score).sum();
        let weights: Vec<f64> = if sum == 0.0 {
            window.iter().map(|c| c.vision_score).collect()
        } else {
            window
                .iter()
                .map(|c| c.vision_score * 100.0 / sum)
                .collect()
        };

        let arena = ScoreArena::build(window, &weights);
        let selected = arena.descend(self.threshold)?;
        let node = arena.node(selected)?;
        if node.rank_level > self.rank_level_cutoff {
            debug!(
                taxon = %selected,
                rank_level = node.rank_level,
                cutoff = self.rank_level_cutoff,
                "common ancestor too coarse, rejecting"
            );
            return None;
        }
        Some(CommonAncestor {
            taxon: node.clone(),
            score: arena.aggregated(selected),
        })
    }
}

/// Node-by-id arena over the window's ancestor chains. Roots and child lists
/// keep input encounter order so score ties resolve to the first-seen taxon.
struct ScoreArena {
    roots: Vec<TaxonId>,
    children: IndexMap<TaxonId, Vec<TaxonId>>,
    nodes: HashMap<TaxonId, TaxonDetail>,
    aggregated: HashMap<TaxonId, f64>,
}

impl ScoreArena {
    fn build(window: &[RankedCandidate], weights: &[f64]) -> Self {
        let mut arena = ScoreArena {
            roots: Vec::new(),
            children: IndexMap::new(),
            nodes: HashMap::new(),
            aggregated: HashMap::new(),
        };

        for (candidate, &weight) in window.iter().zip(weights) {
            // a candidate without ancestry information cannot vote
            if candidate.taxon.ancestors.is_empty() {
                continue;
            }
            let chain = candidate
                .taxon
                .ancestors
                .iter()
                .chain(std::iter::once(&candidate.taxon));

            let mut last: Option<TaxonId> = None;
            for taxon in chain {
                match last {
                    None => {
                        if !arena.roots.contains(&taxon.id) {
                            arena.roots.push(taxon.id);
                        }
                    }
                    Some(parent) => {
                        let kids = arena.children.entry(parent).or_default();
                        if !kids.contains(&taxon.id) {
                            kids.push(taxon.id);
                        }
                    }
                }
                arena
                    .nodes
                    .entry(taxon.id)
                    .or_insert_with(|| taxon.without_ancestors());
                *arena.aggregated.entry(taxon.id).or_insert(0.0) += weight;
                last = Some(taxon.id);
            }
        }
        arena
    }

    /// Walk down from the root set. At each level the single child with the
    /// highest aggregated score among those meeting the threshold is taken;
    /// the walk stops when no child qualifies or a genus is reached.
    fn descend(&self, threshold: f64) -> Option<TaxonId> {
        let mut current: Option<TaxonId> = None;
        loop {
            let pool: &[TaxonId] = match current {
                None => &self.roots,
                Some(id) => self
                    .children
                    .get(&id)
                    .map(|kids| kids.as_slice())
                    .unwrap_or(&[]),
            };

            let mut best: Option<(TaxonId, f64)> = None;
            for id in pool {
                let score = self.aggregated(*id);
                if score < threshold {
                    continue;
                }
                // strict > keeps the first-encountered taxon on a tie
                if best.map_or(true, |(_, top)| score > top) {
                    best = Some((*id, score));
                }
            }

            let Some((next, _)) = best else {
                return current;
            };
            current = Some(next);
            if self.nodes.get(&next).map(|n| n.rank) == Some(Rank::Genus) {
                return current;
            }
        }
    }

    fn aggregated(&self, id: TaxonId) -> f64 {
        self.aggregated.get(&id).copied().unwrap_or(0.0)
    }

    fn node(&self, id: TaxonId) -> Option<&TaxonDetail> {
        self.nodes.get(&id)
    }
}
