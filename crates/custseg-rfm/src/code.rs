//! Two-digit RFM codes.

use crate::score::Score;
use crate::segment::Segment;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Recency digit followed by frequency digit, e.g. `"54"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RfmCode {
    /// Recency score
    pub recency: Score,
    /// Frequency score
    pub frequency: Score,
}

impl RfmCode {
    /// Combine two scores.
    pub const fn new(recency: Score, frequency: Score) -> Self {
        Self { recency, frequency }
    }

    /// Segment this code belongs to.
    pub const fn segment(&self) -> Segment {
        Segment::from_scores(self.recency, self.frequency)
    }
}

impl fmt::Display for RfmCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.recency, self.frequency)
    }
}

/// Malformed code string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCode(pub String);

impl fmt::Display for InvalidCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid RFM code '{}': expected two digits 1-5", self.0)
    }
}

impl std::error::Error for InvalidCode {}

impl FromStr for RfmCode {
    type Err = InvalidCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidCode(s.to_string());
        let digit = |c: char| {
            c.to_digit(10)
                .and_then(|d| u8::try_from(d).ok())
                .and_then(|d| Score::try_from(d).ok())
        };

        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(r), Some(f), None) => Ok(Self::new(
                digit(r).ok_or_else(invalid)?,
                digit(f).ok_or_else(invalid)?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for RfmCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RfmCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
