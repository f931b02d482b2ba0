//! Segregation workflow service
//!
//! Scores inspections, suggests allocations and submits operator allocations
//! against the live criteria table.

use std::sync::{Arc, RwLock};

use serde::Serialize;
use shared::{
    is_ideal_moisture, score_inspection, segregate, AllocationOutcome, BatchStatus, CriteriaTable,
    GradeKind, GradingCriterion, ProposedAllocation, QualityScore,
};

use crate::error::{AppError, AppResult};
use crate::services::batch::BatchService;

/// Segregation service for grading batches under inspection
#[derive(Clone)]
pub struct SegregationService {
    criteria: Arc<RwLock<CriteriaTable>>,
    batches: BatchService,
}

/// Composite score with the grade it qualifies for
#[derive(Debug, Clone, Serialize)]
pub struct QualityAssessment {
    pub batch_number: String,
    pub score: QualityScore,
    pub suggested_grade: GradeKind,
}

/// Result of submitting an allocation
#[derive(Debug, Clone, Serialize)]
pub struct SegregationSubmission {
    pub batch_number: String,
    pub revision: u64,
    pub status: BatchStatus,
    pub outcome: AllocationOutcome,
    /// Grades holding mass above what the composite score supports
    pub grades_above_score: Vec<GradeKind>,
}

impl SegregationService {
    /// Create a new SegregationService instance
    pub fn new(criteria: CriteriaTable, batches: BatchService) -> Self {
        Self {
            criteria: Arc::new(RwLock::new(criteria)),
            batches,
        }
    }

    /// Current criteria table
    pub fn criteria(&self) -> AppResult<CriteriaTable> {
        self.criteria
            .read()
            .map(|table| table.clone())
            .map_err(|_| AppError::Internal("criteria lock poisoned".to_string()))
    }

    /// Replace the criteria table. Later scores and allocations use it.
    pub fn update_criteria(&self, entries: Vec<GradingCriterion>) -> AppResult<CriteriaTable> {
        let table = CriteriaTable::new(entries)?;
        let mut current = self
            .criteria
            .write()
            .map_err(|_| AppError::Internal("criteria lock poisoned".to_string()))?;
        *current = table.clone();

        tracing::info!(
            royal_threshold = ?table.threshold_for(GradeKind::Royal),
            "Grading criteria updated"
        );
        Ok(table)
    }

    /// Score the batch's inspection and suggest a grade
    pub fn score(&self, batch_number: &str) -> AppResult<QualityAssessment> {
        let stored = self.batches.get(batch_number)?;
        let inspection = stored.batch.inspection.as_ref().ok_or_else(|| AppError::Validation {
            field: "inspection".to_string(),
            message: format!("Batch {} has no inspection record", batch_number),
        })?;

        let score = score_inspection(inspection);
        let suggested_grade = self.criteria()?.grade_for_score(score.composite);

        if !is_ideal_moisture(inspection.physical.moisture_percent) {
            tracing::debug!(
                batch_number,
                moisture = %inspection.physical.moisture_percent,
                "Moisture outside ideal range"
            );
        }
        tracing::debug!(
            batch_number,
            composite = %score.composite,
            grade = suggested_grade.as_str(),
            "Scored inspection"
        );

        Ok(QualityAssessment {
            batch_number: batch_number.to_string(),
            score,
            suggested_grade,
        })
    }

    /// Suggest putting the whole batch into the grade its score qualifies for
    pub fn suggest_allocation(&self, batch_number: &str) -> AppResult<ProposedAllocation> {
        let assessment = self.score(batch_number)?;
        let stored = self.batches.get(batch_number)?;
        Ok(ProposedAllocation::suggested(
            stored.batch.raw_material.total_mass_grams,
            assessment.suggested_grade,
        ))
    }

    /// Validate, price and (when complete) attach an allocation.
    ///
    /// A complete allocation moves the batch to `segregated`; partial and
    /// empty allocations are returned without touching the batch.
    pub fn submit_allocation(
        &self,
        batch_number: &str,
        expected_revision: Option<u64>,
        proposed: &ProposedAllocation,
    ) -> AppResult<SegregationSubmission> {
        let criteria = self.criteria()?;

        let (stored, outcome) = self
            .batches
            .update(batch_number, expected_revision, |batch| {
                segregate(batch, proposed, &criteria)
            })
            .map_err(|err| {
                tracing::warn!(batch_number, error = %err, "Allocation rejected");
                err
            })?;

        let grades_above_score = match (outcome.allocation(), stored.batch.inspection.as_ref()) {
            (Some(allocation), Some(inspection)) => {
                let composite = score_inspection(inspection).composite;
                allocation.grades_above_score(composite, &criteria)
            }
            _ => Vec::new(),
        };
        if !grades_above_score.is_empty() {
            tracing::warn!(
                batch_number,
                grades = ?grades_above_score,
                "Allocation assigns mass above the inspection score"
            );
        }

        match &outcome {
            AllocationOutcome::Complete(allocation) => tracing::info!(
                batch_number,
                efficiency = %allocation.efficiency,
                total_value = %allocation.total_value,
                "Batch segregated"
            ),
            AllocationOutcome::Partial(allocation) => tracing::debug!(
                batch_number,
                shortfall = %allocation.shortfall(),
                "Allocation incomplete"
            ),
            AllocationOutcome::Empty => tracing::debug!(batch_number, "Allocation empty"),
        }

        Ok(SegregationSubmission {
            batch_number: batch_number.to_string(),
            revision: stored.revision,
            status: stored.batch.status,
            outcome,
            grades_above_score,
        })
    }
}
