//! Restriction of a score set to a taxonomic subtree

use argus_core::{TaxonId, TaxonScore};
use argus_taxa::AncestryIndex;

/// Keep only scores whose taxon sits under `root`. A root unknown to the
/// ancestry index yields no candidates rather than an error.
pub fn filter_to_subtree(
    scores: &[TaxonScore],
    root: TaxonId,
    ancestry: &AncestryIndex,
) -> Vec<TaxonScore> {
    match ancestry.descendants_of(root) {
        None => Vec::new(),
        Some(descendants) => scores
            .iter()
            .filter(|s| descendants.contains(&s.taxon_id))
            .copied()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::AncestryRecord;

    fn index_with(records: &[(u32, &[u32])]) -> AncestryIndex {
        let index = AncestryIndex::new();
        for (id, ancestors) in records {
            index.merge(AncestryRecord::new(
                TaxonId(*id),
                ancestors.iter().copied().map(TaxonId).collect(),
            ));
        }
        index
    }

    #[test]
    fn test_filter_keeps_only_descendants() {
        let index = index_with(&[(10, &[1, 2]), (11, &[1, 2]), (20, &[1, 3])]);
        let scores = vec![
            TaxonScore::new(TaxonId(10), 50.0),
            TaxonScore::new(TaxonId(11), 30.0),
            TaxonScore::new(TaxonId(20), 20.0),
        ];

        let filtered = filter_to_subtree(&scores, TaxonId(2), &index);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|s| s.taxon_id != TaxonId(20)));

        // subset property: every kept entry came from the input
        for kept in &filtered {
            assert!(scores.contains(kept));
        }
    }

    #[test]
    fn test_filter_unknown_root_is_empty() {
        let index = index_with(&[(10, &[1, 2])]);
        let scores = vec![TaxonScore::new(TaxonId(10), 100.0)];
        let filtered = filter_to_subtree(&scores, TaxonId(777), &index);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_filter_root_is_own_descendant() {
        let index = index_with(&[(10, &[1, 2])]);
        let scores = vec![TaxonScore::new(TaxonId(10), 100.0)];
        let filtered = filter_to_subtree(&scores, TaxonId(10), &index);
        assert_eq!(filtered.len(), 1);
    }
}
