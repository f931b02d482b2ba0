//! Reporting service for segregation yield and valuation

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{percent_of, BatchStatus, GradeAllocation, GradeKind};

use crate::error::AppResult;
use crate::services::batch::BatchService;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    batches: BatchService,
}

/// Per-grade totals across batches
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct GradeTotals {
    pub mass: Decimal,
    pub value: Decimal,
    /// Share of all processed mass
    pub percentage: Decimal,
}

/// Aggregate yield across segregated and approved batches
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SegregationSummary {
    pub batch_count: usize,
    pub total_raw_mass: Decimal,
    pub total_processed: Decimal,
    pub total_value: Decimal,
    pub by_grade: BTreeMap<GradeKind, GradeTotals>,
    /// Mass-weighted: non-reject mass over all processed mass
    pub efficiency: Decimal,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(batches: BatchService) -> Self {
        Self { batches }
    }

    /// Summarize every batch whose allocation has been finalized or approved.
    /// Rejected batches are excluded.
    pub fn segregation_summary(&self) -> AppResult<SegregationSummary> {
        let mut allocations = Vec::new();
        for status in [BatchStatus::Segregated, BatchStatus::Approved] {
            for stored in self.batches.list(Some(status))? {
                if let Some(allocation) = stored.batch.allocation {
                    allocations.push(allocation);
                }
            }
        }
        Ok(summarize(&allocations))
    }
}

/// Aggregate a set of allocations
pub fn summarize(allocations: &[GradeAllocation]) -> SegregationSummary {
    let mut by_grade: BTreeMap<GradeKind, GradeTotals> = GradeKind::ALL
        .iter()
        .map(|&grade| (grade, GradeTotals::default()))
        .collect();

    let mut total_raw_mass = Decimal::ZERO;
    let mut total_processed = Decimal::ZERO;
    let mut total_value = Decimal::ZERO;

    for allocation in allocations {
        total_raw_mass += allocation.total_raw_mass;
        total_processed += allocation.total_processed;
        total_value += allocation.total_value;

        for bucket in allocation.buckets.values() {
            let totals = by_grade.entry(bucket.grade).or_default();
            totals.mass += bucket.mass;
            totals.value += bucket.total_value;
        }
    }

    for totals in by_grade.values_mut() {
        totals.percentage = percent_of(totals.mass, total_processed);
    }

    let reject_mass = by_grade
        .get(&GradeKind::Reject)
        .map(|t| t.mass)
        .unwrap_or(Decimal::ZERO);

    SegregationSummary {
        batch_count: allocations.len(),
        total_raw_mass,
        total_processed,
        total_value,
        by_grade,
        efficiency: percent_of(total_processed - reject_mass, total_processed),
    }
}
