//! Recency scorer
//!
//! Days since the last order. Fewer days is better, so the lowest bin scores 5.

use super::MetricScorer;
use crate::score::ScoreDirection;
use custseg_data::columns::RECENCY;

/// Scores days since the last order
#[derive(Debug, Clone, Copy, Default)]
pub struct RecencyScorer;

impl MetricScorer for RecencyScorer {
    fn name(&self) -> &str {
        "recency"
    }

    fn column(&self) -> &str {
        RECENCY
    }

    fn direction(&self) -> ScoreDirection {
        ScoreDirection::LowerIsBetter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::Score;
    use polars::prelude::*;

    #[test]
    fn test_most_recent_scores_five() {
        let df = df!(RECENCY => (1..=10).collect::<Vec<i64>>()).unwrap();
        let scores = RecencyScorer.score(&df, 5).unwrap();

        assert_eq!(scores[0], Score::Five);
        assert_eq!(scores[9], Score::One);
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
}
