//! Segregation of a batch's mass into grade buckets

use std::borrow::Cow;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{GradingError, GradingResult};
use crate::models::{Batch, BatchStatus, CriteriaTable, GradeKind};
use crate::types::percent_of;
use crate::validation::parse_mass;

/// Operator-entered mass per grade, in grams. Unfilled buckets are zero.
///
/// Deserialization goes through the same non-negative check as [`set`].
///
/// [`set`]: ProposedAllocation::set
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(
    try_from = "BTreeMap<GradeKind, Decimal>",
    into = "BTreeMap<GradeKind, Decimal>"
)]
pub struct ProposedAllocation {
    masses: BTreeMap<GradeKind, Decimal>,
}

impl ProposedAllocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse operator text entries such as `("royal", "125.5")`.
    ///
    /// Blank masses are zero; anything else that is not a non-negative
    /// number is rejected, as is a grade named twice (`"royal"` and
    /// `"Royal"` count as the same grade).
    pub fn parse<'a, I>(entries: I) -> GradingResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut proposed = Self::new();
        for (grade, input) in entries {
            let grade: GradeKind = grade.parse()?;
            let mass = parse_mass(grade, input)?;
            if proposed.masses.insert(grade, mass).is_some() {
                return Err(GradingError::DuplicateGrade(grade.as_str().to_string()));
            }
        }
        Ok(proposed)
    }

    /// Put the whole batch into a single grade
    pub fn suggested(total_mass: Decimal, grade: GradeKind) -> Self {
        let mut proposed = Self::new();
        proposed.masses.insert(grade, total_mass);
        proposed
    }

    pub fn with(mut self, grade: GradeKind, mass: Decimal) -> GradingResult<Self> {
        self.set(grade, mass)?;
        Ok(self)
    }

    pub fn set(&mut self, grade: GradeKind, mass: Decimal) -> GradingResult<()> {
        check_non_negative(grade, mass)?;
        self.masses.insert(grade, mass);
        Ok(())
    }

    pub fn mass(&self, grade: GradeKind) -> Decimal {
        self.masses.get(&grade).copied().unwrap_or(Decimal::ZERO)
    }

    /// Sum of all bucket masses
    pub fn total(&self) -> GradingResult<Decimal> {
        self.masses.iter().try_fold(Decimal::ZERO, |sum, (grade, mass)| {
            sum.checked_add(*mass).ok_or_else(|| overflow(*grade))
        })
    }
}

impl TryFrom<BTreeMap<GradeKind, Decimal>> for ProposedAllocation {
    type Error = GradingError;

    fn try_from(masses: BTreeMap<GradeKind, Decimal>) -> GradingResult<Self> {
        for (grade, mass) in &masses {
            check_non_negative(*grade, *mass)?;
        }
        Ok(Self { masses })
    }
}

impl From<ProposedAllocation> for BTreeMap<GradeKind, Decimal> {
    fn from(proposed: ProposedAllocation) -> Self {
        proposed.masses
    }
}

/// A mass as it arrives in JSON: form text or a plain number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MassEntry {
    Number(serde_json::Number),
    Text(String),
}

impl MassEntry {
    /// Text form for [`ProposedAllocation::parse`]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            MassEntry::Number(n) => Cow::Owned(n.to_string()),
            MassEntry::Text(s) => Cow::Borrowed(s),
        }
    }
}

fn check_non_negative(grade: GradeKind, mass: Decimal) -> GradingResult<()> {
    if mass < Decimal::ZERO {
        return Err(GradingError::NegativeMass {
            grade: grade.as_str().to_string(),
            mass,
        });
    }
    Ok(())
}

fn overflow(grade: GradeKind) -> GradingError {
    GradingError::MassOverflow {
        grade: grade.as_str().to_string(),
    }
}

/// One grade's share of a segregated batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeBucket {
    pub grade: GradeKind,
    pub mass: Decimal,
    /// Share of the batch's raw mass
    pub percentage: Decimal,
    pub price_per_gram: Decimal,
    pub total_value: Decimal,
    pub characteristics: Vec<String>,
}

/// Validated, priced breakdown of a batch across the five grades.
///
/// All derived fields are computed once by [`allocate`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeAllocation {
    pub buckets: BTreeMap<GradeKind, GradeBucket>,
    pub total_raw_mass: Decimal,
    pub total_processed: Decimal,
    pub total_value: Decimal,
    pub efficiency: Decimal,
}

impl GradeAllocation {
    pub fn bucket(&self, grade: GradeKind) -> Option<&GradeBucket> {
        self.buckets.get(&grade)
    }

    pub fn mass(&self, grade: GradeKind) -> Decimal {
        self.bucket(grade).map(|b| b.mass).unwrap_or(Decimal::ZERO)
    }

    pub fn reject_mass(&self) -> Decimal {
        self.mass(GradeKind::Reject)
    }

    /// Whether every gram of the batch has been assigned to a bucket
    pub fn is_complete(&self) -> bool {
        self.total_processed == self.total_raw_mass
    }

    /// Raw mass not yet assigned to any bucket
    pub fn shortfall(&self) -> Decimal {
        self.total_raw_mass - self.total_processed
    }

    pub fn total_percentage(&self) -> Decimal {
        self.buckets.values().map(|b| b.percentage).sum()
    }

    /// Grades holding mass whose threshold is above the composite score
    pub fn grades_above_score(&self, score: Decimal, criteria: &CriteriaTable) -> Vec<GradeKind> {
        self.buckets
            .values()
            .filter(|b| b.mass > Decimal::ZERO)
            .filter(|b| {
                criteria
                    .threshold_for(b.grade)
                    .map(|threshold| threshold > score)
                    .unwrap_or(false)
            })
            .map(|b| b.grade)
            .collect()
    }
}

/// Result of a successful allocation attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", content = "allocation", rename_all = "snake_case")]
pub enum AllocationOutcome {
    /// Nothing entered yet
    Empty,
    /// Some raw mass is still unaccounted for
    Partial(GradeAllocation),
    /// Bucket masses sum to the batch's raw mass
    Complete(GradeAllocation),
}

impl AllocationOutcome {
    pub fn allocation(&self) -> Option<&GradeAllocation> {
        match self {
            AllocationOutcome::Empty => None,
            AllocationOutcome::Partial(a) | AllocationOutcome::Complete(a) => Some(a),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, AllocationOutcome::Complete(_))
    }
}

/// Validate and price a proposed allocation against the batch's raw mass.
///
/// Over-allocation is an error and is never clamped. A shortfall is not
/// assigned to reject; the caller must record reject mass explicitly.
pub fn allocate(
    total_raw_mass: Decimal,
    proposed: &ProposedAllocation,
    criteria: &CriteriaTable,
) -> GradingResult<AllocationOutcome> {
    if total_raw_mass <= Decimal::ZERO {
        return Err(GradingError::InvalidBatchMass(total_raw_mass));
    }

    for (grade, mass) in &proposed.masses {
        check_non_negative(*grade, *mass)?;
    }

    let total_processed = proposed.total()?;
    if total_processed.is_zero() {
        return Ok(AllocationOutcome::Empty);
    }
    if total_processed > total_raw_mass {
        return Err(GradingError::AllocationExceedsBatchMass {
            allocated: total_processed,
            total: total_raw_mass,
        });
    }

    let buckets = GradeKind::ALL
        .iter()
        .map(|&grade| -> GradingResult<(GradeKind, GradeBucket)> {
            let mass = proposed.mass(grade);
            let price_per_gram = if grade.is_priced() {
                criteria.price_for(grade)
            } else {
                Decimal::ZERO
            };
            let total_value = mass
                .checked_mul(price_per_gram)
                .ok_or_else(|| overflow(grade))?;
            let bucket = GradeBucket {
                grade,
                mass,
                percentage: percent_of(mass, total_raw_mass),
                price_per_gram,
                total_value,
                characteristics: criteria.characteristics_for(grade).to_vec(),
            };
            Ok((grade, bucket))
        })
        .collect::<GradingResult<BTreeMap<GradeKind, GradeBucket>>>()?;

    let total_value = buckets.values().try_fold(Decimal::ZERO, |sum, b| {
        sum.checked_add(b.total_value).ok_or_else(|| overflow(b.grade))
    })?;
    let reject_mass = proposed.mass(GradeKind::Reject);
    let efficiency = percent_of(total_processed - reject_mass, total_processed);

    let allocation = GradeAllocation {
        buckets,
        total_raw_mass,
        total_processed,
        total_value,
        efficiency,
    };

    if allocation.is_complete() {
        Ok(AllocationOutcome::Complete(allocation))
    } else {
        Ok(AllocationOutcome::Partial(allocation))
    }
}

/// Allocate a batch under inspection and, when complete, attach the result
/// and move it to `segregated`.
///
/// A segregated batch may be re-segregated until it is approved or
/// rejected. On error, or when the allocation is empty or partial, the batch
/// is left untouched.
pub fn segregate(
    batch: &mut Batch,
    proposed: &ProposedAllocation,
    criteria: &CriteriaTable,
) -> GradingResult<AllocationOutcome> {
    batch.ensure_transition(BatchStatus::Segregated)?;

    let outcome = allocate(batch.raw_material.total_mass_grams, proposed, criteria)?;
    if let AllocationOutcome::Complete(allocation) = &outcome {
        batch.attach_allocation(allocation.clone())?;
    }
    Ok(outcome)
}
