//! Oud grade classification

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::GradingError;

/// Quality grade a batch's mass is split across, ordered from most to least
/// valuable
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GradeKind {
    Royal,
    Premium,
    Super,
    Regular,
    /// Whatever mass does not qualify for a priced grade
    Reject,
}

impl GradeKind {
    /// All grades, most valuable first
    pub const ALL: [GradeKind; 5] = [
        GradeKind::Royal,
        GradeKind::Premium,
        GradeKind::Super,
        GradeKind::Regular,
        GradeKind::Reject,
    ];

    /// Grades that carry a criteria entry and a price
    pub const PRICED: [GradeKind; 4] = [
        GradeKind::Royal,
        GradeKind::Premium,
        GradeKind::Super,
        GradeKind::Regular,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GradeKind::Royal => "royal",
            GradeKind::Premium => "premium",
            GradeKind::Super => "super",
            GradeKind::Regular => "regular",
            GradeKind::Reject => "reject",
        }
    }

    pub fn is_priced(&self) -> bool {
        !matches!(self, GradeKind::Reject)
    }

    /// Numeric rank for grade comparison (higher is better)
    pub fn rank(&self) -> i32 {
        match self {
            GradeKind::Royal => 5,
            GradeKind::Premium => 4,
            GradeKind::Super => 3,
            GradeKind::Regular => 2,
            GradeKind::Reject => 1,
        }
    }
}

impl std::fmt::Display for GradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeKind::Royal => write!(f, "Royal"),
            GradeKind::Premium => write!(f, "Premium"),
            GradeKind::Super => write!(f, "Super"),
            GradeKind::Regular => write!(f, "Regular"),
            GradeKind::Reject => write!(f, "Reject"),
        }
    }
}

impl FromStr for GradeKind {
    type Err = GradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "royal" => Ok(GradeKind::Royal),
            "premium" => Ok(GradeKind::Premium),
            "super" => Ok(GradeKind::Super),
            "regular" => Ok(GradeKind::Regular),
            "reject" => Ok(GradeKind::Reject),
            _ => Err(GradingError::InvalidGradeKind(s.to_string())),
        }
    }
}
