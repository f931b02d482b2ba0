//! Quality inspection models
//!
//! Every measurement defaults to zero when missing so that a partially
//! filled, in-progress inspection still deserializes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::LightingCondition;

/// Inspection attached to a batch when grading begins
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct InspectionRecord {
    pub id: Uuid,
    pub inspector: String,
    pub inspection_date: Option<NaiveDate>,
    pub environment: EnvironmentalConditions,
    pub aroma: AromaProfile,
    pub visual: VisualInspection,
    pub physical: PhysicalProperties,
}

impl InspectionRecord {
    pub fn new(inspector: impl Into<String>, inspection_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            inspector: inspector.into(),
            inspection_date: Some(inspection_date),
            ..Default::default()
        }
    }
}

/// Conditions at inspection time. Informational, not used in scoring.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EnvironmentalConditions {
    pub temperature_celsius: Decimal,
    pub humidity_percent: Decimal,
    pub lighting: LightingCondition,
}

/// Aroma ratings, each 0-10
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AromaProfile {
    pub intensity: Decimal,
    pub complexity: Decimal,
    pub sweetness: Decimal,
    pub woodiness: Decimal,
    pub smokiness: Decimal,
    pub animalic: Decimal,
    pub floral: Decimal,
    pub spicy: Decimal,
    pub notes: Option<String>,
}

/// Visual inspection results
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct VisualInspection {
    pub color: String,
    pub texture: String,
    /// 0-100
    pub oil_content_percent: Decimal,
    /// 0-100
    pub resin_content_percent: Decimal,
    pub inclusions: Vec<String>,
    pub defects: Vec<String>,
    /// 0-10
    pub overall_appearance: Decimal,
}

/// Physical measurements of the wood
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PhysicalProperties {
    /// g/cm³
    pub density: Decimal,
    pub moisture_percent: Decimal,
    /// 0-10
    pub hardness: Decimal,
    /// 0-10
    pub elasticity: Decimal,
    pub burn_test: BurnTest,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BurnTest {
    pub ignition_time_seconds: Decimal,
    pub burn_duration_minutes: Decimal,
    pub ash_color: String,
    /// 0-10
    pub smoke_quality: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_zero() {
        let json = r#"{
            "inspector": "Ahmed",
            "aroma": { "intensity": "8" },
            "physical": { "burn_test": { "smoke_quality": 7 } }
        }"#;
        let record: InspectionRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.inspector, "Ahmed");
        assert_eq!(record.aroma.intensity, Decimal::from(8));
        assert_eq!(record.aroma.complexity, Decimal::ZERO);
        assert_eq!(record.visual.oil_content_percent, Decimal::ZERO);
        assert_eq!(record.physical.burn_test.smoke_quality, Decimal::from(7));
        assert_eq!(record.environment.lighting, LightingCondition::Natural);
    }

    #[test]
    fn test_malformed_measurement_is_rejected() {
        let json = r#"{ "aroma": { "intensity": "strong" } }"#;
        assert!(serde_json::from_str::<InspectionRecord>(json).is_err());
    }

    #[test]
    fn test_new_assigns_identity() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let a = InspectionRecord::new("Fatima", date);
        let b = InspectionRecord::new("Fatima", date);
        assert_ne!(a.id, b.id);
        assert_eq!(a.inspection_date, Some(date));
    }
}
