//! Grading criteria reference table

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{GradingError, GradingResult};
use crate::models::GradeKind;
use crate::types::PriceRange;

/// Definition of a priced grade
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradingCriterion {
    pub grade: GradeKind,
    /// Minimum composite score (0-100) required to qualify
    pub min_score: Decimal,
    pub price_range: PriceRange,
    /// Advisory only, not checked against the inspection record
    #[serde(default)]
    pub characteristics: Vec<String>,
}

/// Ordered criteria for royal, premium, super and regular.
///
/// Reject has no entry: it is whatever mass does not qualify for a priced
/// grade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<GradingCriterion>", into = "Vec<GradingCriterion>")]
pub struct CriteriaTable {
    entries: Vec<GradingCriterion>,
}

impl CriteriaTable {
    /// Build a table, checking that every priced grade appears exactly once
    /// and that minimum scores strictly descend from royal to regular.
    pub fn new(mut entries: Vec<GradingCriterion>) -> GradingResult<Self> {
        entries.sort_by_key(|c| c.grade);

        let grades: Vec<GradeKind> = entries.iter().map(|c| c.grade).collect();
        if grades != GradeKind::PRICED {
            return Err(GradingError::InvalidCriteria(
                "criteria must define royal, premium, super and regular exactly once".to_string(),
            ));
        }

        for criterion in &entries {
            if criterion.min_score < Decimal::ZERO || criterion.min_score > Decimal::ONE_HUNDRED {
                return Err(GradingError::InvalidCriteria(format!(
                    "{} minimum score must be between 0 and 100",
                    criterion.grade.as_str()
                )));
            }
            let range = criterion.price_range;
            if range.min < Decimal::ZERO || range.min > range.max {
                return Err(GradingError::InvalidCriteria(format!(
                    "{} price range is invalid: {} - {}",
                    criterion.grade.as_str(),
                    range.min,
                    range.max
                )));
            }
        }

        for pair in entries.windows(2) {
            if pair[0].min_score <= pair[1].min_score {
                return Err(GradingError::InvalidCriteria(format!(
                    "{} minimum score must be above {}",
                    pair[0].grade.as_str(),
                    pair[1].grade.as_str()
                )));
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[GradingCriterion] {
        &self.entries
    }

    pub fn criterion(&self, grade: GradeKind) -> Option<&GradingCriterion> {
        self.entries.iter().find(|c| c.grade == grade)
    }

    /// Midpoint of the grade's price range; zero for reject
    pub fn price_for(&self, grade: GradeKind) -> Decimal {
        self.criterion(grade)
            .map(|c| c.price_range.midpoint())
            .unwrap_or(Decimal::ZERO)
    }

    /// Characteristics list for the grade; empty for reject
    pub fn characteristics_for(&self, grade: GradeKind) -> &[String] {
        self.criterion(grade)
            .map(|c| c.characteristics.as_slice())
            .unwrap_or(&[])
    }

    /// Minimum composite score for the grade; `None` for reject
    pub fn threshold_for(&self, grade: GradeKind) -> Option<Decimal> {
        self.criterion(grade).map(|c| c.min_score)
    }

    /// Highest grade whose threshold the score reaches, reject otherwise
    pub fn grade_for_score(&self, score: Decimal) -> GradeKind {
        self.entries
            .iter()
            .find(|c| score >= c.min_score)
            .map(|c| c.grade)
            .unwrap_or(GradeKind::Reject)
    }
}

impl Default for CriteriaTable {
    fn default() -> Self {
        let criterion = |grade, min_score: i64, min: i64, max: i64, characteristics: &[&str]| {
            GradingCriterion {
                grade,
                min_score: Decimal::from(min_score),
                price_range: PriceRange::new(Decimal::from(min), Decimal::from(max)),
                characteristics: characteristics.iter().map(|s| s.to_string()).collect(),
            }
        };

        Self {
            entries: vec![
                criterion(
                    GradeKind::Royal,
                    90,
                    150,
                    300,
                    &[
                        "Deep, complex and long-lasting aroma",
                        "Resin content above 40%",
                        "Dark, dense heartwood that sinks in water",
                        "Clean burn with thick, sweet smoke",
                    ],
                ),
                criterion(
                    GradeKind::Premium,
                    75,
                    80,
                    150,
                    &[
                        "Rich woody aroma with good projection",
                        "Resin content 25-40%",
                        "Dark brown with visible resin streaks",
                    ],
                ),
                criterion(
                    GradeKind::Super,
                    60,
                    40,
                    80,
                    &[
                        "Pleasant aroma of moderate intensity",
                        "Resin content 15-25%",
                        "Mixed light and dark wood",
                    ],
                ),
                criterion(
                    GradeKind::Regular,
                    40,
                    15,
                    40,
                    &[
                        "Mild aroma",
                        "Resin content below 15%",
                        "Mostly light wood, suitable for distillation",
                    ],
                ),
            ],
        }
    }
}

impl TryFrom<Vec<GradingCriterion>> for CriteriaTable {
    type Error = GradingError;

    fn try_from(entries: Vec<GradingCriterion>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<CriteriaTable> for Vec<GradingCriterion> {
    fn from(table: CriteriaTable) -> Self {
        table.entries
    }
}
