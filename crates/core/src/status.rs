//! # Status Module
//!
//! Status enums for matches and screenings. Both are closed sets; every
//! transition and aggregation rule is an exhaustive match over them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Review status of a single watch-list match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// No status signal available (provider degraded)
    Unknown,
    /// Awaiting human review (initial state for normal matches)
    Pending,
    /// Reviewer confirmed a true positive
    ConfirmedHit,
    /// Reviewer confirmed a false positive
    NoHit,
    /// Resolved without review (reviewer choice or cascade)
    Skipped,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Unknown => "unknown",
            MatchStatus::Pending => "pending",
            MatchStatus::ConfirmedHit => "confirmed_hit",
            MatchStatus::NoHit => "no_hit",
            MatchStatus::Skipped => "skipped",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "unknown" => Some(MatchStatus::Unknown),
            "pending" => Some(MatchStatus::Pending),
            "confirmed_hit" => Some(MatchStatus::ConfirmedHit),
            "no_hit" => Some(MatchStatus::NoHit),
            "skipped" => Some(MatchStatus::Skipped),
            _ => None,
        }
    }

    /// Terminal statuses are immutable except for appended comments.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MatchStatus::ConfirmedHit | MatchStatus::NoHit | MatchStatus::Skipped
        )
    }

    /// Statuses a human transition may originate from.
    pub fn is_reviewable(&self) -> bool {
        matches!(self, MatchStatus::Unknown | MatchStatus::Pending)
    }

    /// Sort tier for listings: reviewable matches come before resolved ones.
    pub fn review_tier(&self) -> u8 {
        if self.is_reviewable() {
            0
        } else {
            1
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate status of a screening, derived from its match statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningStatus {
    /// At least one match still awaits review
    InReview,
    /// At least one match was confirmed as a true positive
    ConfirmedHit,
    /// Every match resolved negative (or there were none to review)
    NoHit,
}

impl ScreeningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreeningStatus::InReview => "in_review",
            ScreeningStatus::ConfirmedHit => "confirmed_hit",
            ScreeningStatus::NoHit => "no_hit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in_review" => Some(ScreeningStatus::InReview),
            "confirmed_hit" => Some(ScreeningStatus::ConfirmedHit),
            "no_hit" => Some(ScreeningStatus::NoHit),
            _ => None,
        }
    }

    /// A confirmed screening rejects further reviews; re-opening requires
    /// a fresh screening run.
    pub fn is_final(&self) -> bool {
        matches!(self, ScreeningStatus::ConfirmedHit)
    }
}

impl fmt::Display for ScreeningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
