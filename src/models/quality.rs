//! Recall quality on the SM-2 scale.
//!
//! - 0-2: the learner failed to recall the answer
//! - 3-5: recalled, with decreasing effort
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quality(u8);

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("quality must be between 0 and 5, got {0}")]
pub struct InvalidQuality(pub u8);

impl Quality {
    pub const MAX: u8 = 5;

    pub const ALL: [Quality; 6] = [
        Quality(0),
        Quality(1),
        Quality(2),
        Quality(3),
        Quality(4),
        Quality(5),
    ];

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            0 => "Blackout",
            1 => "Wrong",
            2 => "Wrong (familiar)",
            3 => "Difficult",
            4 => "Correct",
            _ => "Perfect",
        }
    }
}

impl TryFrom<u8> for Quality {
    type Error = InvalidQuality;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= Self::MAX {
            Ok(Quality(value))
        } else {
            Err(InvalidQuality(value))
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.0, self.label())
    }
}
