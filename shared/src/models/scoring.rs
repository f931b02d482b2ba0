//! Composite quality scoring

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::InspectionRecord;
use crate::types::mean;

const RATING_MAX: Decimal = Decimal::TEN;
const PERCENT_MAX: Decimal = Decimal::ONE_HUNDRED;

/// Dimension sub-scores and composite score, all on a 0-100 scale
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityScore {
    pub aroma: Decimal,
    pub visual: Decimal,
    pub physical: Decimal,
    /// Rounded to one decimal place
    pub composite: Decimal,
}

/// Reduce an inspection to a composite score in [0, 100].
///
/// Only intensity, complexity and woodiness count toward aroma; the other
/// aroma axes are profile data. Out-of-range inputs are clamped, so this
/// never fails.
pub fn score_inspection(record: &InspectionRecord) -> QualityScore {
    let aroma = mean(&[
        rating(record.aroma.intensity),
        rating(record.aroma.complexity),
        rating(record.aroma.woodiness),
    ]) * Decimal::TEN;

    let visual = mean(&[
        rating(record.visual.overall_appearance) * Decimal::TEN,
        percent(record.visual.oil_content_percent),
    ]);

    let physical = mean(&[
        rating(record.physical.hardness),
        rating(record.physical.elasticity),
        rating(record.physical.burn_test.smoke_quality),
    ]) * Decimal::TEN;

    let composite = mean(&[aroma, visual, physical])
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

    QualityScore {
        aroma,
        visual,
        physical,
        composite,
    }
}

fn rating(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, RATING_MAX)
}

fn percent(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, PERCENT_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AromaProfile, BurnTest, PhysicalProperties, VisualInspection};

    fn inspection(rating: i64, percent: i64) -> InspectionRecord {
        let r = Decimal::from(rating);
        InspectionRecord {
            aroma: AromaProfile {
                intensity: r,
                complexity: r,
                sweetness: r,
                woodiness: r,
                smokiness: r,
                animalic: r,
                floral: r,
                spicy: r,
                notes: None,
            },
            visual: VisualInspection {
                oil_content_percent: Decimal::from(percent),
                resin_content_percent: Decimal::from(percent),
                overall_appearance: r,
                ..Default::default()
            },
            physical: PhysicalProperties {
                hardness: r,
                elasticity: r,
                burn_test: BurnTest {
                    smoke_quality: r,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_all_max_scores_100() {
        let score = score_inspection(&inspection(10, 100));
        assert_eq!(score.composite, Decimal::ONE_HUNDRED);
        assert_eq!(score.aroma, Decimal::ONE_HUNDRED);
        assert_eq!(score.visual, Decimal::ONE_HUNDRED);
        assert_eq!(score.physical, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_all_zero_scores_zero() {
        let score = score_inspection(&InspectionRecord::default());
        assert_eq!(score.composite, Decimal::ZERO);
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        let score = score_inspection(&inspection(25, 400));
        assert_eq!(score.composite, Decimal::ONE_HUNDRED);

        let score = score_inspection(&inspection(-5, -10));
        assert_eq!(score.composite, Decimal::ZERO);
    }

    #[test]
    fn test_non_scoring_aroma_axes_are_ignored() {
        let mut record = inspection(6, 60);
        let baseline = score_inspection(&record);

        record.aroma.floral = Decimal::TEN;
        record.aroma.spicy = Decimal::ZERO;
        record.aroma.sweetness = Decimal::ZERO;
        assert_eq!(score_inspection(&record), baseline);
    }

    #[test]
    fn test_composite_rounded_to_one_decimal() {
        let mut record = InspectionRecord::default();
        // aroma = 10/3 * 10 = 33.33..., composite = 11.11...
        record.aroma.intensity = Decimal::TEN;
        let score = score_inspection(&record);
        assert_eq!(score.composite, Decimal::new(111, 1));
        assert!(score.aroma > Decimal::new(3333, 2));
    }

    #[test]
    fn test_mixed_inspection() {
        let mut record = InspectionRecord::default();
        record.aroma.intensity = Decimal::from(9);
        record.aroma.complexity = Decimal::from(8);
        record.aroma.woodiness = Decimal::from(7);
        record.visual.overall_appearance = Decimal::from(8);
        record.visual.oil_content_percent = Decimal::from(60);
        record.physical.hardness = Decimal::from(7);
        record.physical.elasticity = Decimal::from(5);
        record.physical.burn_test.smoke_quality = Decimal::from(9);

        let score = score_inspection(&record);
        assert_eq!(score.aroma, Decimal::from(80));
        assert_eq!(score.visual, Decimal::from(70));
        assert_eq!(score.physical, Decimal::from(70));
        assert_eq!(score.composite, Decimal::new(733, 1));
    }
}
