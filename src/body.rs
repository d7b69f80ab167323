//! Body composition indices
//!
//! BMI, its category, and the weight band that keeps BMI inside the normal
//! range. Independent of the energy chain.

use crate::constants::{BMI_NORMAL_MIN, BMI_OBESE_MIN, BMI_OVERWEIGHT_MIN};
use crate::types::{BmiCategory, WeightRange};
use crate::units::round_dp;

fn height_m_squared(height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    height_m * height_m
}

/// Body Mass Index, rounded to 2 decimals
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    round_dp(weight_kg / height_m_squared(height_cm), 2)
}

/// Classify a BMI value
pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < BMI_NORMAL_MIN {
        BmiCategory::Underweight
    } else if bmi < BMI_OVERWEIGHT_MIN {
        BmiCategory::Normal
    } else if bmi < BMI_OBESE_MIN {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Weights giving BMI 18.5 and 25 at this height, 1 decimal
pub fn ideal_weight_range(height_cm: f64) -> WeightRange {
    let h2 = height_m_squared(height_cm);
    WeightRange {
        min: round_dp(BMI_NORMAL_MIN * h2, 1),
        max: round_dp(BMI_OVERWEIGHT_MIN * h2, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_overweight_example() {
        let value = bmi(90.0, 180.0);
        assert_eq!(value, 27.78);
        assert_eq!(bmi_category(value), BmiCategory::Overweight);
    }

    #[test]
    fn test_bmi_category_boundaries() {
        assert_eq!(bmi_category(18.49), BmiCategory::Underweight);
        assert_eq!(bmi_category(18.5), BmiCategory::Normal);
        assert_eq!(bmi_category(24.99), BmiCategory::Normal);
        assert_eq!(bmi_category(25.0), BmiCategory::Overweight);
        assert_eq!(bmi_category(29.99), BmiCategory::Overweight);
        assert_eq!(bmi_category(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_ideal_weight_range() {
        let range = ideal_weight_range(175.0);
        assert_eq!(range.min, 56.7);
        assert_eq!(range.max, 76.6);
    }

    #[test]
    fn test_ideal_weight_range_matches_bmi_band() {
        for height in (100..=250).step_by(5) {
            let height = f64::from(height);
            let h2 = (height / 100.0) * (height / 100.0);
            let range = ideal_weight_range(height);
            assert!((range.min - 18.5 * h2).abs() <= 0.05 + 1e-9, "{height}");
            assert!((range.max - 25.0 * h2).abs() <= 0.05 + 1e-9, "{height}");
        }
    }
}
