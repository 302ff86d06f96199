//! Monetary scorer

use super::MetricScorer;
use crate::score::ScoreDirection;
use custseg_data::columns::MONETARY;

/// Scores total spend
#[derive(Debug, Clone, Copy, Default)]
pub struct MonetaryScorer;

impl MetricScorer for MonetaryScorer {
    fn name(&self) -> &str {
        "monetary"
    }

    fn column(&self) -> &str {
        MONETARY
    }

    fn direction(&self) -> ScoreDirection {
        ScoreDirection::HigherIsBetter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoringError;
    use crate::score::Score;
    use polars::prelude::*;

    #[test]
    fn test_biggest_spender_scores_five() {
        let df = df!(MONETARY => [500.0, 20.0, 75.5, 310.0, 42.0, 99.0, 18.0, 1200.0, 64.0, 150.0]).unwrap();
        let scores = MonetaryScorer.score(&df, 5).unwrap();

        assert_eq!(scores[7], Score::Five);
        assert_eq!(scores[6], Score::One);
    }

    #[test]
    fn test_constant_spend_has_duplicate_edges() {
        let df = df!(MONETARY => [10.0; 8]).unwrap();
        let result = MonetaryScorer.score(&df, 5);
        assert!(matches!(
            result,
            Err(ScoringError::DuplicateBinEdges { ref metric, .. }) if metric == "monetary"
        ));
    }

    #[test]
    fn test_non_finite_spend() {
        let df = df!(MONETARY => [10.0, f64::NAN, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let result = MonetaryScorer.score(&df, 5);
        assert!(matches!(result, Err(ScoringError::NonFinite { index: 1, .. })));
    }
}
