//! Error handling for the Oud Grading Platform
//!
//! Provides consistent, serializable error responses for the CLI and any
//! host that embeds the services.

use serde::Serialize;
use shared::GradingError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Engine errors
    #[error(transparent)]
    Grading(#[from] GradingError),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Stale revision on an optimistic write
    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Grading(err) => match err {
                GradingError::AllocationExceedsBatchMass { .. } => "ALLOCATION_EXCEEDS_BATCH_MASS",
                GradingError::InvalidGradeKind(_) => "INVALID_GRADE_KIND",
                GradingError::MalformedMass { .. } => "MALFORMED_MASS",
                GradingError::NegativeMass { .. } => "NEGATIVE_MASS",
                GradingError::DuplicateGrade(_) => "DUPLICATE_GRADE",
                GradingError::MassOverflow { .. } => "MASS_OVERFLOW",
                GradingError::OutOfRange { .. } => "OUT_OF_RANGE",
                GradingError::InvalidBatchMass(_) => "INVALID_BATCH_MASS",
                GradingError::InvalidBatchNumber(_) => "INVALID_BATCH_NUMBER",
                GradingError::InvalidBatchStatus(_) => "INVALID_BATCH_STATUS",
                GradingError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
                GradingError::BatchFinalized(_) => "BATCH_FINALIZED",
                GradingError::InvalidCriteria(_) => "INVALID_CRITERIA",
            },
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the operator can fix the problem by correcting input
    pub fn is_operator_recoverable(&self) -> bool {
        match self {
            AppError::Grading(GradingError::InvalidGradeKind(_)) => false,
            AppError::Grading(_)
            | AppError::Validation { .. }
            | AppError::DuplicateEntry(_)
            | AppError::Conflict { .. }
            | AppError::NotFound(_) => true,
            AppError::Configuration(_) | AppError::Internal(_) => false,
        }
    }

    fn field(&self) -> Option<String> {
        match self {
            AppError::Grading(GradingError::OutOfRange { field, .. }) => Some(field.clone()),
            AppError::Grading(GradingError::MalformedMass { grade, .. })
            | AppError::Grading(GradingError::NegativeMass { grade, .. })
            | AppError::Grading(GradingError::MassOverflow { grade }) => Some(grade.clone()),
            AppError::Grading(GradingError::DuplicateGrade(grade)) => Some(grade.clone()),
            AppError::Validation { field, .. } => Some(field.clone()),
            AppError::DuplicateEntry(field) => Some(field.clone()),
            AppError::Conflict { resource, .. } => Some(resource.clone()),
            _ => None,
        }
    }

    /// Build the serializable response and log the error
    pub fn to_response(&self) -> ErrorResponse {
        if self.is_operator_recoverable() {
            tracing::warn!("Rejected request: {}", self);
        } else {
            tracing::error!("Error: {:?}", self);
        }

        ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
                field: self.field(),
            },
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias for services
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_over_allocation_response() {
        let err = AppError::from(GradingError::AllocationExceedsBatchMass {
            allocated: Decimal::from(2600),
            total: Decimal::from(2500),
        });
        let response = err.to_response();

        assert_eq!(response.error.code, "ALLOCATION_EXCEEDS_BATCH_MASS");
        assert!(response.error.message.contains("2600"));
        assert!(err.is_operator_recoverable());
    }

    #[test]
    fn test_invalid_grade_kind_is_not_recoverable() {
        let err = AppError::from(GradingError::InvalidGradeKind("gold".to_string()));
        assert!(!err.is_operator_recoverable());
        assert_eq!(err.code(), "INVALID_GRADE_KIND");
    }

    #[test]
    fn test_field_is_reported() {
        let err = AppError::from(GradingError::OutOfRange {
            field: "physical.hardness".to_string(),
            value: Decimal::from(11),
            min: Decimal::ZERO,
            max: Decimal::TEN,
        });
        let json = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(json["error"]["field"], "physical.hardness");

        let json = serde_json::to_value(AppError::NotFound("Batch".into()).to_response()).unwrap();
        assert!(json["error"].get("field").is_none());
    }

    #[test]
    fn test_duplicate_grade_response() {
        let err = AppError::from(GradingError::DuplicateGrade("royal".to_string()));
        let response = err.to_response();

        assert_eq!(response.error.code, "DUPLICATE_GRADE");
        assert_eq!(response.error.field.as_deref(), Some("royal"));
        assert!(err.is_operator_recoverable());
    }
}
