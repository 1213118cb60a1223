/// Score records flowing through the scoring pipeline
use super::taxon::{TaxonDetail, TaxonId};
use serde::{Deserialize, Serialize};

/// One classifier output: a taxon and its confidence.
///
/// `count` holds the raw confidence as returned by the classifier and the
/// normalized percentage after `normalize_scores` has run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxonScore {
    pub taxon_id: TaxonId,
    pub count: f64,
}

impl TaxonScore {
    pub fn new(taxon_id: TaxonId, count: f64) -> Self {
        Self { taxon_id, count }
    }
}

/// A fully scored candidate identification.
///
/// Components that did not contribute are zero: `frequency_score` is 0 for a
/// taxon with no occurrence history, `vision_score` is 0 for a taxon seen
/// only in nearby occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTaxon {
    pub taxon: TaxonDetail,
    pub combined_score: f64,
    pub vision_score: f64,
    pub frequency_score: f64,
}

/// The resolved common ancestor and the vision-score mass it aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonAncestor {
    pub taxon: TaxonDetail,
    pub score: f64,
}

/// Count of nearby recorded occurrences for one taxon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceCount {
    pub taxon_id: TaxonId,
    pub count: u64,
}

impl OccurrenceCount {
    pub fn new(taxon_id: TaxonId, count: u64) -> Self {
        Self { taxon_id, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxon_score_serde_roundtrip() {
        let score = TaxonScore::new(TaxonId(42), 87.5);
        let json = serde_json::to_string(&score).unwrap();
        let back: TaxonScore = serde_json::from_str(&json).unwrap();
        assert_eq!(score, back);
    }

    #[test]
    fn test_occurrence_count_list_roundtrip() {
        let counts = vec![
            OccurrenceCount::new(TaxonId(1), 3),
            OccurrenceCount::new(TaxonId(2), 1),
        ];
        let json = serde_json::to_vec(&counts).unwrap();
        let back: Vec<OccurrenceCount> = serde_json::from_slice(&json).unwrap();
        assert_eq!(counts, back);
    }
}
