//! Ordinal 1-5 scores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of score levels.
pub const SCORE_LEVELS: usize = 5;

/// A quantile score, 1 (worst) to 5 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Score {
    /// Lowest quintile
    One = 1,
    /// Second quintile
    Two = 2,
    /// Middle quintile
    Three = 3,
    /// Fourth quintile
    Four = 4,
    /// Highest quintile
    Five = 5,
}

/// How a metric's bins map onto scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreDirection {
    /// Larger values score higher (frequency, monetary).
    HigherIsBetter,
    /// Smaller values score higher (recency in days).
    LowerIsBetter,
}

impl Score {
    /// All scores, lowest first.
    pub const ALL: [Self; SCORE_LEVELS] = [Self::One, Self::Two, Self::Three, Self::Four, Self::Five];

    /// Numeric value, 1 to 5.
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Score of zero-based bin `bin` out of five.
    pub fn from_bin(bin: usize, direction: ScoreDirection) -> Option<Self> {
        let index = match direction {
            ScoreDirection::HigherIsBetter => bin,
            ScoreDirection::LowerIsBetter => SCORE_LEVELS.checked_sub(bin + 1)?,
        };
        Self::ALL.get(index).copied()
    }
}

/// Score outside 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidScore(pub u8);

impl fmt::Display for InvalidScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "score must be between 1 and 5, got {}", self.0)
    }
}

impl std::error::Error for InvalidScore {}

impl TryFrom<u8> for Score {
    type Error = InvalidScore;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            5 => Ok(Self::Five),
            other => Err(InvalidScore(other)),
        }
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.value()
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
