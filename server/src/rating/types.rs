//! Rating types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/rating`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRequest {
    pub rating_is_good: bool,
}

/// Human-readable form of a rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingLabel {
    Good,
    Bad,
}

impl RatingLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
        }
    }

    /// Numeric form stored next to the label (good = 1, bad = 0)
    pub fn value(self) -> u8 {
        match self {
            Self::Good => 1,
            Self::Bad => 0,
        }
    }
}

/// A persisted thumbs-up/down on a segmentation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub rating: RatingLabel,
    pub rating_value: u8,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    /// Build a rating from the user's verdict at the given instant.
    ///
    /// Label and value are both derived from `is_good`, so they always agree.
    pub fn from_verdict(is_good: bool, created_at: DateTime<Utc>) -> Self {
        let rating = if is_good {
            RatingLabel::Good
        } else {
            RatingLabel::Bad
        };
        Self {
            rating,
            rating_value: rating.value(),
            created_at,
        }
    }

    /// Build a rating timestamped now
    pub fn now(is_good: bool) -> Self {
        Self::from_verdict(is_good, Utc::now())
    }

    pub fn is_good(&self) -> bool {
        self.rating == RatingLabel::Good
    }
}

impl From<RatingRequest> for Rating {
    fn from(request: RatingRequest) -> Self {
        Self::now(request.rating_is_good)
    }
}
