//! Engine error types

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::BatchStatus;

/// Errors raised by the grading engine and batch lifecycle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradingError {
    /// Sum of proposed grade masses is larger than the batch's raw mass
    #[error("Allocated mass {allocated}g exceeds batch mass {total}g")]
    AllocationExceedsBatchMass { allocated: Decimal, total: Decimal },

    /// Grade name outside royal, premium, super, regular, reject
    #[error("Invalid grade kind: {0}")]
    InvalidGradeKind(String),

    #[error("Malformed mass for {grade}: {input:?}")]
    MalformedMass { grade: String, input: String },

    #[error("Mass for {grade} cannot be negative: {mass}")]
    NegativeMass { grade: String, mass: Decimal },

    /// Same grade entered twice in one allocation
    #[error("Mass for {0} entered more than once")]
    DuplicateGrade(String),

    /// Mass or value arithmetic exceeded the decimal range
    #[error("Mass for {grade} is too large to allocate")]
    MassOverflow { grade: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("Batch mass must be positive, got {0}g")]
    InvalidBatchMass(Decimal),

    #[error("Invalid batch number: {0}")]
    InvalidBatchNumber(String),

    #[error("Invalid batch status: {0}")]
    InvalidBatchStatus(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: BatchStatus, to: BatchStatus },

    /// Approved and rejected batches are immutable
    #[error("Batch {0} is finalized")]
    BatchFinalized(String),

    #[error("Invalid grading criteria: {0}")]
    InvalidCriteria(String),
}

/// Result type alias for engine operations
pub type GradingResult<T> = Result<T, GradingError>;
