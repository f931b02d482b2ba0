//! Business logic services for the Oud Grading Platform

pub mod batch;
pub mod reporting;
pub mod segregation;

pub use batch::{BatchService, StoredBatch};
pub use reporting::{ReportingService, SegregationSummary};
pub use segregation::{QualityAssessment, SegregationService, SegregationSubmission};
