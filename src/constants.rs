//! Lookup tables and limits
//!
//! Every table is a `match` over a closed enum, so there is nothing to
//! initialise or mutate at runtime.

use crate::types::{ActivityLevel, GoalType};

/// Energy content of one gram of protein (kcal).
pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
/// Energy content of one gram of carbohydrate (kcal).
pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
/// Energy content of one gram of fat (kcal).
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Lowest daily calorie goal ever returned.
pub const MIN_DAILY_CALORIES: i64 = 1200;
/// Highest daily calorie goal ever returned.
pub const MAX_DAILY_CALORIES: i64 = 5000;

/// Accepted body weight range (kg).
pub const MIN_WEIGHT_KG: f64 = 30.0;
pub const MAX_WEIGHT_KG: f64 = 300.0;

/// Accepted height range (cm).
pub const MIN_HEIGHT_CM: f64 = 100.0;
pub const MAX_HEIGHT_CM: f64 = 250.0;

/// Accepted age range (years).
pub const MIN_AGE_YEARS: u32 = 13;
pub const MAX_AGE_YEARS: u32 = 120;

/// BMI band edges. Each edge belongs to the band above it.
pub const BMI_NORMAL_MIN: f64 = 18.5;
pub const BMI_OVERWEIGHT_MIN: f64 = 25.0;
pub const BMI_OBESE_MIN: f64 = 30.0;

/// Mifflin-St Jeor coefficients.
pub const MSJ_WEIGHT_COEF: f64 = 10.0;
pub const MSJ_HEIGHT_COEF: f64 = 6.25;
pub const MSJ_AGE_COEF: f64 = 5.0;
pub const MSJ_MALE_OFFSET: f64 = 5.0;
pub const MSJ_FEMALE_OFFSET: f64 = -161.0;
/// Midpoint of the male and female offsets.
pub const MSJ_OTHER_OFFSET: f64 = -78.0;

/// Share of daily calories assigned to each macronutrient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroRatios {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroRatios {
    /// Carbohydrate share of the non-protein calories.
    pub fn carb_share(&self) -> f64 {
        self.carbs / (self.carbs + self.fat)
    }
}

/// TDEE multiplier for an activity level.
pub const fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::LightlyActive => 1.375,
        ActivityLevel::ModeratelyActive => 1.55,
        ActivityLevel::VeryActive => 1.725,
        ActivityLevel::ExtraActive => 1.9,
    }
}

/// Fractional change applied to TDEE for a goal.
pub const fn calorie_adjustment(goal: GoalType) -> f64 {
    match goal {
        GoalType::WeightLoss => -0.20,
        GoalType::Maintenance => 0.0,
        GoalType::MuscleGain => 0.10,
    }
}

/// Macro distribution for a goal.
pub const fn macro_ratios(goal: GoalType) -> MacroRatios {
    match goal {
        GoalType::WeightLoss => MacroRatios {
            protein: 0.35,
            carbs: 0.30,
            fat: 0.35,
        },
        GoalType::Maintenance => MacroRatios {
            protein: 0.30,
            carbs: 0.40,
            fat: 0.30,
        },
        GoalType::MuscleGain => MacroRatios {
            protein: 0.30,
            carbs: 0.45,
            fat: 0.25,
        },
    }
}

/// Minimum protein per kg of body weight for a goal (g/kg).
pub const fn min_protein_per_kg(goal: GoalType) -> f64 {
    match goal {
        GoalType::WeightLoss => 2.0,
        GoalType::Maintenance => 1.6,
        GoalType::MuscleGain => 2.2,
    }
}

/// Safe weekly weight change for a goal (kg/week).
pub const fn weekly_weight_change(goal: GoalType) -> f64 {
    match goal {
        GoalType::WeightLoss => -0.5,
        GoalType::Maintenance => 0.0,
        GoalType::MuscleGain => 0.25,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOALS: [GoalType; 3] = [
        GoalType::WeightLoss,
        GoalType::Maintenance,
        GoalType::MuscleGain,
    ];

    #[test]
    fn test_macro_ratios_sum_to_one() {
        for goal in GOALS {
            let r = macro_ratios(goal);
            assert!((r.protein + r.carbs + r.fat - 1.0).abs() < 1e-9, "{goal:?}");
        }
    }

    #[test]
    fn test_carb_share_renormalizes() {
        let r = macro_ratios(GoalType::Maintenance);
        assert!((r.carb_share() - 0.4 / 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_activity_multipliers_are_ordered() {
        let levels = [
            ActivityLevel::Sedentary,
            ActivityLevel::LightlyActive,
            ActivityLevel::ModeratelyActive,
            ActivityLevel::VeryActive,
            ActivityLevel::ExtraActive,
        ];
        for pair in levels.windows(2) {
            assert!(activity_multiplier(pair[0]) < activity_multiplier(pair[1]));
        }
    }

    #[test]
    fn test_other_offset_is_midpoint() {
        assert_eq!((MSJ_MALE_OFFSET + MSJ_FEMALE_OFFSET) / 2.0, MSJ_OTHER_OFFSET);
    }
}
