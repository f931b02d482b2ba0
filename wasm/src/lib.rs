//! WebAssembly module for the Oud Grading Platform
//!
//! Provides client-side computation for:
//! - Composite quality scoring
//! - Grade suggestion and pricing
//! - Batch segregation (validated, priced allocations)
//! - Batch number formatting
//!
//! The dashboard renders the allocation returned here as-is instead of
//! recomputing percentages or values.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Calculate the composite score of an inspection record
#[wasm_bindgen]
pub fn calculate_quality_score(inspection_json: &str) -> Result<String, JsValue> {
    quality_score_json(inspection_json).map_err(|e| JsValue::from_str(&e))
}

/// Suggest the grade a composite score qualifies for
#[wasm_bindgen]
pub fn suggest_grade(score: f64, criteria_json: Option<String>) -> Result<String, JsValue> {
    let criteria = load_criteria(criteria_json.as_deref()).map_err(|e| JsValue::from_str(&e))?;
    let score = Decimal::try_from(score).unwrap_or(Decimal::ZERO);
    Ok(criteria.grade_for_score(score).as_str().to_string())
}

/// Price per gram for a grade (midpoint of its range)
#[wasm_bindgen]
pub fn price_for_grade(grade: &str, criteria_json: Option<String>) -> Result<f64, JsValue> {
    let criteria = load_criteria(criteria_json.as_deref()).map_err(|e| JsValue::from_str(&e))?;
    let grade = GradeKind::from_str(grade).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(criteria.price_for(grade).to_f64().unwrap_or(0.0))
}

/// Built-in criteria table as JSON
#[wasm_bindgen]
pub fn default_criteria() -> String {
    serde_json::to_string(&CriteriaTable::default()).unwrap_or_default()
}

/// Validate and price an operator's mass entry for a batch.
///
/// `masses_json` maps grade names to mass text or numbers, e.g.
/// `{"royal": "125", "reject": 40}`.
/// When `composite_score` is given, grades holding mass above what the score
/// supports are reported and logged to the console.
#[wasm_bindgen]
pub fn segregate_batch(
    total_mass: &str,
    masses_json: &str,
    criteria_json: Option<String>,
    composite_score: Option<f64>,
) -> Result<String, JsValue> {
    let result = segregation_json(total_mass, masses_json, criteria_json.as_deref(), composite_score)
        .map_err(|e| JsValue::from_str(&e))?;

    if !result.grades_above_score.is_empty() {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "Mass allocated above inspection score: {:?}",
            result.grades_above_score
        )));
    }

    serde_json::to_string(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Format a batch number
#[wasm_bindgen]
pub fn batch_number(year: i32, sequence: u32) -> String {
    generate_batch_number(year, sequence)
}

/// Batch number for the current calendar year
#[wasm_bindgen]
pub fn next_batch_number(sequence: u32) -> String {
    let year = js_sys::Date::new_0().get_full_year() as i32;
    generate_batch_number(year, sequence)
}

/// Check batch number format
#[wasm_bindgen]
pub fn is_valid_batch_number(batch_number: &str) -> bool {
    validate_batch_number(batch_number).is_ok()
}

#[derive(Debug, Serialize)]
struct SegregationResult {
    outcome: AllocationOutcome,
    grades_above_score: Vec<GradeKind>,
}

fn load_criteria(criteria_json: Option<&str>) -> Result<CriteriaTable, String> {
    match criteria_json {
        Some(json) => {
            serde_json::from_str(json).map_err(|e| format!("Invalid criteria JSON: {}", e))
        }
        None => Ok(CriteriaTable::default()),
    }
}

fn quality_score_json(inspection_json: &str) -> Result<String, String> {
    let record: InspectionRecord = serde_json::from_str(inspection_json)
        .map_err(|e| format!("Invalid inspection JSON: {}", e))?;
    validate_inspection(&record).map_err(|e| e.to_string())?;

    let score = score_inspection(&record);
    serde_json::to_string(&score).map_err(|e| e.to_string())
}

fn segregation_json(
    total_mass: &str,
    masses_json: &str,
    criteria_json: Option<&str>,
    composite_score: Option<f64>,
) -> Result<SegregationResult, String> {
    let criteria = load_criteria(criteria_json)?;
    let total_mass = Decimal::from_str(total_mass.trim())
        .map_err(|_| format!("Invalid batch mass: {:?}", total_mass))?;

    let masses: BTreeMap<String, MassEntry> = serde_json::from_str(masses_json)
        .map_err(|e| format!("Invalid masses JSON: {}", e))?;
    let masses: Vec<(&str, Cow<'_, str>)> =
        masses.iter().map(|(g, m)| (g.as_str(), m.as_text())).collect();
    let proposed = ProposedAllocation::parse(masses.iter().map(|(g, m)| (*g, m.as_ref())))
        .map_err(|e| e.to_string())?;

    let outcome = allocate(total_mass, &proposed, &criteria).map_err(|e| e.to_string())?;

    let grades_above_score = match (outcome.allocation(), composite_score) {
        (Some(allocation), Some(score)) => {
            let score = Decimal::try_from(score).unwrap_or(Decimal::ZERO);
            allocation.grades_above_score(score, &criteria)
        }
        _ => Vec::new(),
    };

    Ok(SegregationResult {
        outcome,
        grades_above_score,
    })
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn suggest_grade_uses_default_criteria() {
        assert_eq!(suggest_grade(91.0, None).unwrap(), "royal");
        assert_eq!(suggest_grade(10.0, None).unwrap(), "reject");
    }

    #[wasm_bindgen_test]
    fn price_for_unknown_grade_fails() {
        assert!(price_for_grade("gold", None).is_err());
        assert_eq!(price_for_grade("royal", None).unwrap(), 225.0);
    }
}
