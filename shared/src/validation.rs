//! Validation utilities for the Oud Grading Platform
//!
//! Operator input is rejected rather than coerced: a mass that does not parse
//! is an error, never a silent zero.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{GradingError, GradingResult};
use crate::models::{GradeKind, InspectionRecord};

// ============================================================================
// Batch Validations
// ============================================================================

/// Generate a batch number (e.g., "OUD-2024-0007")
pub fn generate_batch_number(year: i32, sequence: u32) -> String {
    format!("OUD-{}-{:04}", year, sequence)
}

/// Validate batch number format: OUD-YYYY-NNNN (sequence at least 4 digits)
pub fn validate_batch_number(batch_number: &str) -> GradingResult<()> {
    let invalid = || GradingError::InvalidBatchNumber(batch_number.to_string());
    let parts: Vec<&str> = batch_number.split('-').collect();

    if parts.len() != 3 || parts[0] != "OUD" {
        return Err(invalid());
    }
    if parts[1].len() != 4 || !parts[1].chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if parts[2].len() < 4 || !parts[2].chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    Ok(())
}

/// Raw batch mass must be positive
pub fn validate_total_mass(mass: Decimal) -> GradingResult<()> {
    if mass <= Decimal::ZERO {
        return Err(GradingError::InvalidBatchMass(mass));
    }
    Ok(())
}

/// Parse an operator-entered mass in grams. Blank input is zero.
pub fn parse_mass(grade: GradeKind, input: &str) -> GradingResult<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let mass = Decimal::from_str(trimmed).map_err(|_| GradingError::MalformedMass {
        grade: grade.as_str().to_string(),
        input: input.to_string(),
    })?;

    if mass < Decimal::ZERO {
        return Err(GradingError::NegativeMass {
            grade: grade.as_str().to_string(),
            mass,
        });
    }
    Ok(mass)
}

// ============================================================================
// Inspection Validations
// ============================================================================

/// Validate a value lies within `[min, max]`
pub fn validate_range(field: &str, value: Decimal, min: Decimal, max: Decimal) -> GradingResult<()> {
    if value < min || value > max {
        return Err(GradingError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// 0-10 rating
pub fn validate_rating(field: &str, value: Decimal) -> GradingResult<()> {
    validate_range(field, value, Decimal::ZERO, Decimal::TEN)
}

/// 0-100 percentage
pub fn validate_percent(field: &str, value: Decimal) -> GradingResult<()> {
    validate_range(field, value, Decimal::ZERO, Decimal::ONE_HUNDRED)
}

fn validate_non_negative(field: &str, value: Decimal) -> GradingResult<()> {
    validate_range(field, value, Decimal::ZERO, Decimal::MAX)
}

/// Validate every bounded field of an inspection record
pub fn validate_inspection(record: &InspectionRecord) -> GradingResult<()> {
    let aroma = &record.aroma;
    for (field, value) in [
        ("aroma.intensity", aroma.intensity),
        ("aroma.complexity", aroma.complexity),
        ("aroma.sweetness", aroma.sweetness),
        ("aroma.woodiness", aroma.woodiness),
        ("aroma.smokiness", aroma.smokiness),
        ("aroma.animalic", aroma.animalic),
        ("aroma.floral", aroma.floral),
        ("aroma.spicy", aroma.spicy),
        ("visual.overall_appearance", record.visual.overall_appearance),
        ("physical.hardness", record.physical.hardness),
        ("physical.elasticity", record.physical.elasticity),
        (
            "physical.burn_test.smoke_quality",
            record.physical.burn_test.smoke_quality,
        ),
    ] {
        validate_rating(field, value)?;
    }

    for (field, value) in [
        ("visual.oil_content_percent", record.visual.oil_content_percent),
        ("visual.resin_content_percent", record.visual.resin_content_percent),
        ("physical.moisture_percent", record.physical.moisture_percent),
        ("environment.humidity_percent", record.environment.humidity_percent),
    ] {
        validate_percent(field, value)?;
    }

    for (field, value) in [
        ("physical.density", record.physical.density),
        (
            "physical.burn_test.ignition_time_seconds",
            record.physical.burn_test.ignition_time_seconds,
        ),
        (
            "physical.burn_test.burn_duration_minutes",
            record.physical.burn_test.burn_duration_minutes,
        ),
    ] {
        validate_non_negative(field, value)?;
    }

    Ok(())
}

/// Check if moisture content is in the ideal range for grading (8-12%)
pub fn is_ideal_moisture(moisture: Decimal) -> bool {
    moisture >= Decimal::from(8) && moisture <= Decimal::from(12)
}
