//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price per gram range for a grade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Representative unit price used for valuation
    pub fn midpoint(&self) -> Decimal {
        (self.min + self.max) / Decimal::TWO
    }

    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Lighting under which an inspection was carried out
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LightingCondition {
    #[default]
    Natural,
    Artificial,
    Mixed,
}

impl std::fmt::Display for LightingCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LightingCondition::Natural => write!(f, "Natural"),
            LightingCondition::Artificial => write!(f, "Artificial"),
            LightingCondition::Mixed => write!(f, "Mixed"),
        }
    }
}

/// `part / whole × 100`, zero when `whole` is zero
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}

/// Arithmetic mean, zero for an empty slice
pub fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_range_midpoint() {
        let range = PriceRange::new(Decimal::from(150), Decimal::from(300));
        assert_eq!(range.midpoint(), Decimal::from(225));
        assert!(range.contains(Decimal::from(225)));
        assert!(!range.contains(Decimal::from(301)));
    }

    #[test]
    fn test_percent_of_zero_whole() {
        assert_eq!(percent_of(Decimal::from(5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(
            percent_of(Decimal::from(125), Decimal::from(2500)),
            Decimal::from(5)
        );
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), Decimal::ZERO);
        assert_eq!(
            mean(&[Decimal::from(2), Decimal::from(4)]),
            Decimal::from(3)
        );
    }
}
