//! Batch and lifecycle models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{GradingError, GradingResult};
use crate::models::{GradeAllocation, InspectionRecord};
use crate::validation::{validate_batch_number, validate_total_mass};

/// A traceable unit of harvested raw agarwood
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Batch {
    /// Unique batch number (e.g., "OUD-2024-0001")
    pub batch_number: String,
    pub raw_material: RawMaterial,
    pub status: BatchStatus,
    pub inspection: Option<InspectionRecord>,
    pub allocation: Option<GradeAllocation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Harvest data recorded when the batch is created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawMaterial {
    pub origin: String,
    pub species: String,
    pub age_years: u32,
    pub harvester: String,
    pub harvest_date: NaiveDate,
    /// Authoritative mass; every allocation is measured against it
    pub total_mass_grams: Decimal,
    pub notes: Option<String>,
}

/// Lifecycle state of a batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Raw,
    Inspecting,
    Segregated,
    Approved,
    Rejected,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Raw => "raw",
            BatchStatus::Inspecting => "inspecting",
            BatchStatus::Segregated => "segregated",
            BatchStatus::Approved => "approved",
            BatchStatus::Rejected => "rejected",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, BatchStatus::Approved | BatchStatus::Rejected)
    }

    pub fn can_transition_to(&self, next: BatchStatus) -> bool {
        matches!(
            (self, next),
            (BatchStatus::Raw, BatchStatus::Inspecting)
                | (BatchStatus::Inspecting, BatchStatus::Segregated)
                | (BatchStatus::Segregated, BatchStatus::Segregated)
                | (BatchStatus::Segregated, BatchStatus::Approved)
                | (BatchStatus::Segregated, BatchStatus::Rejected)
        )
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::Raw => write!(f, "Raw"),
            BatchStatus::Inspecting => write!(f, "Inspecting"),
            BatchStatus::Segregated => write!(f, "Segregated"),
            BatchStatus::Approved => write!(f, "Approved"),
            BatchStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for BatchStatus {
    type Err = GradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(BatchStatus::Raw),
            "inspecting" => Ok(BatchStatus::Inspecting),
            "segregated" => Ok(BatchStatus::Segregated),
            "approved" => Ok(BatchStatus::Approved),
            "rejected" => Ok(BatchStatus::Rejected),
            _ => Err(GradingError::InvalidBatchStatus(s.to_string())),
        }
    }
}

impl Batch {
    /// Create a batch in `raw`
    pub fn new(batch_number: impl Into<String>, raw_material: RawMaterial) -> GradingResult<Self> {
        let batch_number = batch_number.into();
        validate_batch_number(&batch_number)?;
        validate_total_mass(raw_material.total_mass_grams)?;

        let now = Utc::now();
        Ok(Self {
            batch_number,
            raw_material,
            status: BatchStatus::Raw,
            inspection: None,
            allocation: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check that the batch may move to `next`
    pub fn ensure_transition(&self, next: BatchStatus) -> GradingResult<()> {
        if self.status.is_final() {
            return Err(GradingError::BatchFinalized(self.batch_number.clone()));
        }
        if !self.status.can_transition_to(next) {
            return Err(GradingError::InvalidStateTransition {
                from: self.status,
                to: next,
            });
        }
        Ok(())
    }

    /// Attach the inspection record and move to `inspecting`
    pub fn begin_inspection(&mut self, record: InspectionRecord) -> GradingResult<()> {
        self.ensure_transition(BatchStatus::Inspecting)?;
        self.inspection = Some(record);
        self.transition(BatchStatus::Inspecting);
        Ok(())
    }

    /// Replace the measurements of an inspection that is still in progress
    pub fn update_inspection(&mut self, record: InspectionRecord) -> GradingResult<()> {
        if self.status.is_final() {
            return Err(GradingError::BatchFinalized(self.batch_number.clone()));
        }
        if self.status != BatchStatus::Inspecting {
            return Err(GradingError::InvalidStateTransition {
                from: self.status,
                to: BatchStatus::Inspecting,
            });
        }
        self.inspection = Some(record);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Attach a complete allocation and move to `segregated`
    pub fn attach_allocation(&mut self, allocation: GradeAllocation) -> GradingResult<()> {
        self.ensure_transition(BatchStatus::Segregated)?;
        if !allocation.is_complete()
            || allocation.total_raw_mass != self.raw_material.total_mass_grams
        {
            return Err(GradingError::InvalidStateTransition {
                from: self.status,
                to: BatchStatus::Segregated,
            });
        }
        self.allocation = Some(allocation);
        self.transition(BatchStatus::Segregated);
        Ok(())
    }

    pub fn approve(&mut self) -> GradingResult<()> {
        self.ensure_transition(BatchStatus::Approved)?;
        self.transition(BatchStatus::Approved);
        Ok(())
    }

    pub fn reject(&mut self) -> GradingResult<()> {
        self.ensure_transition(BatchStatus::Rejected)?;
        self.transition(BatchStatus::Rejected);
        Ok(())
    }

    fn transition(&mut self, next: BatchStatus) {
        self.status = next;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{allocate, AllocationOutcome, CriteriaTable, GradeKind, ProposedAllocation};

    fn raw_material(mass: i64) -> RawMaterial {
        RawMaterial {
            origin: "Assam".to_string(),
            species: "Aquilaria malaccensis".to_string(),
            age_years: 15,
            harvester: "H-042".to_string(),
            harvest_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            total_mass_grams: Decimal::from(mass),
            notes: None,
        }
    }

    fn complete_allocation(mass: i64) -> GradeAllocation {
        let proposed = ProposedAllocation::suggested(Decimal::from(mass), GradeKind::Super);
        match allocate(Decimal::from(mass), &proposed, &CriteriaTable::default()).unwrap() {
            AllocationOutcome::Complete(a) => a,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_new_batch_starts_raw() {
        let batch = Batch::new("OUD-2024-0001", raw_material(2500)).unwrap();
        assert_eq!(batch.status, BatchStatus::Raw);
        assert!(batch.inspection.is_none());
        assert!(batch.allocation.is_none());
    }

    #[test]
    fn test_new_batch_validates_input() {
        assert!(matches!(
            Batch::new("BATCH-1", raw_material(2500)),
            Err(GradingError::InvalidBatchNumber(_))
        ));
        assert!(matches!(
            Batch::new("OUD-2024-0001", raw_material(0)),
            Err(GradingError::InvalidBatchMass(_))
        ));
    }

    #[test]
    fn test_full_lifecycle() {
        let mut batch = Batch::new("OUD-2024-0001", raw_material(2500)).unwrap();
        batch.begin_inspection(InspectionRecord::default()).unwrap();
        assert_eq!(batch.status, BatchStatus::Inspecting);

        batch.attach_allocation(complete_allocation(2500)).unwrap();
        assert_eq!(batch.status, BatchStatus::Segregated);

        // Revision before approval
        batch.attach_allocation(complete_allocation(2500)).unwrap();
        assert_eq!(batch.status, BatchStatus::Segregated);

        batch.approve().unwrap();
        assert_eq!(batch.status, BatchStatus::Approved);
    }

    #[test]
    fn test_finalized_batch_is_immutable() {
        let mut batch = Batch::new("OUD-2024-0001", raw_material(2500)).unwrap();
        batch.begin_inspection(InspectionRecord::default()).unwrap();
        batch.attach_allocation(complete_allocation(2500)).unwrap();
        batch.reject().unwrap();

        assert!(matches!(batch.approve(), Err(GradingError::BatchFinalized(_))));
        assert!(matches!(
            batch.attach_allocation(complete_allocation(2500)),
            Err(GradingError::BatchFinalized(_))
        ));
        assert!(matches!(
            batch.update_inspection(InspectionRecord::default()),
            Err(GradingError::BatchFinalized(_))
        ));
    }

    #[test]
    fn test_invalid_transitions() {
        let mut batch = Batch::new("OUD-2024-0001", raw_material(2500)).unwrap();
        assert!(matches!(
            batch.approve(),
            Err(GradingError::InvalidStateTransition { .. })
        ));
        assert!(batch.attach_allocation(complete_allocation(2500)).is_err());
        assert!(batch.update_inspection(InspectionRecord::default()).is_err());

        batch.begin_inspection(InspectionRecord::default()).unwrap();
        assert!(batch.begin_inspection(InspectionRecord::default()).is_err());
        assert!(batch.reject().is_err());
    }

    #[test]
    fn test_attach_rejects_mismatched_allocation() {
        let mut batch = Batch::new("OUD-2024-0001", raw_material(2500)).unwrap();
        batch.begin_inspection(InspectionRecord::default()).unwrap();
        assert!(batch.attach_allocation(complete_allocation(1000)).is_err());
        assert_eq!(batch.status, BatchStatus::Inspecting);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            BatchStatus::Raw,
            BatchStatus::Inspecting,
            BatchStatus::Segregated,
            BatchStatus::Approved,
            BatchStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<BatchStatus>(), Ok(status));
        }
        assert!("sold".parse::<BatchStatus>().is_err());
    }
}
