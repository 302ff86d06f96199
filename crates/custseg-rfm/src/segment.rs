//! Named behavioural segments.
//!
//! A segment depends on the recency and frequency scores only. The mapping is
//! an exhaustive match over `(Score, Score)`; [`SEGMENT_RULES`] restates it
//! as a table so the partition can be checked independently.

use crate::score::Score;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Customer segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// Long gone, few orders
    Hibernating,
    /// Lapsing after a few orders
    #[serde(alias = "at_Risk")]
    AtRisk,
    /// Lapsing after many orders
    #[serde(alias = "cant_loose")]
    CantLose,
    /// Middling recency, few orders
    AboutToSleep,
    /// Middling recency and frequency
    NeedAttention,
    /// Frequent buyers who are not the most recent
    LoyalCustomers,
    /// Recent first-timers
    Promising,
    /// Most recent first-timers
    NewCustomers,
    /// Recent with a handful of orders
    PotentialLoyalists,
    /// Most recent and most frequent
    Champions,
}

impl Segment {
    /// Every segment.
    pub const ALL: [Self; 10] = [
        Self::Hibernating,
        Self::AtRisk,
        Self::CantLose,
        Self::AboutToSleep,
        Self::NeedAttention,
        Self::LoyalCustomers,
        Self::Promising,
        Self::NewCustomers,
        Self::PotentialLoyalists,
        Self::Champions,
    ];

    /// Segment of a recency/frequency score pair.
    pub const fn from_scores(recency: Score, frequency: Score) -> Self {
        use Score::{Five, Four, One, Three, Two};

        match (recency, frequency) {
            (One | Two, One | Two) => Self::Hibernating,
            (One | Two, Three | Four) => Self::AtRisk,
            (One | Two, Five) => Self::CantLose,
            (Three, One | Two) => Self::AboutToSleep,
            (Three, Three) => Self::NeedAttention,
            (Three | Four, Four | Five) => Self::LoyalCustomers,
            (Four, One) => Self::Promising,
            (Five, One) => Self::NewCustomers,
            (Four | Five, Two | Three) => Self::PotentialLoyalists,
            (Five, Four | Five) => Self::Champions,
        }
    }

    /// Label used in tables and exports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hibernating => "hibernating",
            Self::AtRisk => "at_risk",
            Self::CantLose => "cant_lose",
            Self::AboutToSleep => "about_to_sleep",
            Self::NeedAttention => "need_attention",
            Self::LoyalCustomers => "loyal_customers",
            Self::Promising => "promising",
            Self::NewCustomers => "new_customers",
            Self::PotentialLoyalists => "potential_loyalists",
            Self::Champions => "champions",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown segment label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown segment '{0}'")]
pub struct UnknownSegment(pub String);

impl FromStr for Segment {
    type Err = UnknownSegment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if normalized == "cant_loose" {
            return Ok(Self::CantLose);
        }
        Self::ALL
            .into_iter()
            .find(|segment| segment.as_str() == normalized)
            .ok_or_else(|| UnknownSegment(s.to_string()))
    }
}

/// One row of the segment table: every listed recency score combined with
/// every listed frequency score maps to `segment`.
#[derive(Debug, Clone, Copy)]
pub struct SegmentRule {
    /// Recency scores covered
    pub recency: &'static [Score],
    /// Frequency scores covered
    pub frequency: &'static [Score],
    /// Resulting segment
    pub segment: Segment,
}

impl SegmentRule {
    /// Whether the rule covers a score pair.
    pub fn matches(&self, recency: Score, frequency: Score) -> bool {
        self.recency.contains(&recency) && self.frequency.contains(&frequency)
    }
}

/// Declarative segment table.
pub const SEGMENT_RULES: [SegmentRule; 10] = [
    SegmentRule {
        recency: &[Score::One, Score::Two],
        frequency: &[Score::One, Score::Two],
        segment: Segment::Hibernating,
    },
    SegmentRule {
        recency: &[Score::One, Score::Two],
        frequency: &[Score::Three, Score::Four],
        segment: Segment::AtRisk,
    },
    SegmentRule {
        recency: &[Score::One, Score::Two],
        frequency: &[Score::Five],
        segment: Segment::CantLose,
    },
    SegmentRule {
        recency: &[Score::Three],
        frequency: &[Score::One, Score::Two],
        segment: Segment::AboutToSleep,
    },
    SegmentRule {
        recency: &[Score::Three],
        frequency: &[Score::Three],
        segment: Segment::NeedAttention,
    },
    SegmentRule {
        recency: &[Score::Three, Score::Four],
        frequency: &[Score::Four, Score::Five],
        segment: Segment::LoyalCustomers,
    },
    SegmentRule {
        recency: &[Score::Four],
        frequency: &[Score::One],
        segment: Segment::Promising,
    },
    SegmentRule {
        recency: &[Score::Five],
        frequency: &[Score::One],
        segment: Segment::NewCustomers,
    },
    SegmentRule {
        recency: &[Score::Four, Score::Five],
        frequency: &[Score::Two, Score::Three],
        segment: Segment::PotentialLoyalists,
    },
    SegmentRule {
        recency: &[Score::Five],
        frequency: &[Score::Four, Score::Five],
        segment: Segment::Champions,
    },
];
