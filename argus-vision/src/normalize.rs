//! Score normalization

use argus_core::TaxonScore;

/// Anything carrying a mutable score that can be rescaled
pub trait Scored {
    fn score(&self) -> f64;
    fn set_score(&mut self, score: f64);
}

impl Scored for TaxonScore {
    fn score(&self) -> f64 {
        self.count
    }

    fn set_score(&mut self, score: f64) {
        self.count = score;
    }
}

/// Rescale scores to percentages summing to 100. A zero-sum set is left
/// unchanged rather than divided by zero.
pub fn normalize_scores<T: Scored>(scores: &mut [T]) {
    let sum: f64 = scores.iter().map(Scored::score).sum();
    if sum == 0.0 {
        return;
    }
    for score in scores.iter_mut() {
        score.set_score(score.score() * 100.0 / sum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::TaxonId;

    fn scores(counts: &[f64]) -> Vec<TaxonScore> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &c)| TaxonScore::new(TaxonId(i as u32 + 1), c))
            .collect()
    }

    #[test]
    fn test_normalize_sums_to_100() {
        let mut set = scores(&[3.0, 1.0]);
        normalize_scores(&mut set);
        assert_eq!(set[0].count, 75.0);
        assert_eq!(set[1].count, 25.0);

        let mut set = scores(&[0.123, 4.56, 0.0004, 11.0]);
        normalize_scores(&mut set);
        let sum: f64 = set.iter().map(|s| s.count).sum();
        assert!((sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_sum_unchanged() {
        let mut set = scores(&[0.0, 0.0, 0.0]);
        normalize_scores(&mut set);
        assert!(set.iter().all(|s| s.count == 0.0));

        let mut empty: Vec<TaxonScore> = vec![];
        normalize_scores(&mut empty);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut set = scores(&[40.0, 30.0, 20.0, 10.0]);
        normalize_scores(&mut set);
        let first: Vec<f64> = set.iter().map(|s| s.count).collect();
        normalize_scores(&mut set);
        for (a, b) in set.iter().zip(first) {
            assert!((a.count - b).abs() < 1e-9);
        }
    }
}
