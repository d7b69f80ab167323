//! Macronutrient splitting
//!
//! Protein comes first: the goal's calorie percentage, raised to a per-kg
//! floor when that is higher. Whatever energy is left goes to carbohydrate
//! and fat in the goal's carb:fat proportion.

use crate::constants::{
    macro_ratios, min_protein_per_kg, KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT,
    KCAL_PER_GRAM_PROTEIN,
};
use crate::types::{GoalType, MacroBreakdown, MacroSplit};
use crate::units::round_to_i64;
use serde::{Deserialize, Serialize};

/// What to do when the protein floor uses more energy than the calorie goal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Carbs and fat drop to zero grams
    #[default]
    ClampToZero,
    /// Split the negative remainder as-is (negative carb and fat grams)
    Unguarded,
}

impl RemainderPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemainderPolicy::ClampToZero => "clamp_to_zero",
            RemainderPolicy::Unguarded => "unguarded",
        }
    }
}

impl std::str::FromStr for RemainderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clamp_to_zero" => Ok(RemainderPolicy::ClampToZero),
            "unguarded" => Ok(RemainderPolicy::Unguarded),
            other => Err(format!("unknown remainder policy '{other}'")),
        }
    }
}

/// Protein floor for a body weight and goal (g)
pub fn protein_floor(weight_kg: f64, goal_type: GoalType) -> i64 {
    round_to_i64(weight_kg * min_protein_per_kg(goal_type))
}

/// Split `calories` into macros, reporting the intermediate values.
pub fn split_macros(
    calories: i64,
    goal_type: GoalType,
    weight_kg: f64,
    policy: RemainderPolicy,
) -> MacroBreakdown {
    let ratios = macro_ratios(goal_type);

    let protein_from_ratio_g =
        round_to_i64(calories as f64 * ratios.protein / KCAL_PER_GRAM_PROTEIN);
    let protein_floor_g = protein_floor(weight_kg, goal_type);
    let protein_g = protein_from_ratio_g.max(protein_floor_g);

    let remaining_kcal = calories - protein_g * KCAL_PER_GRAM_PROTEIN as i64;
    let remainder_exhausted = remaining_kcal < 0;

    let (carbs_g, fat_g) = if remainder_exhausted && policy == RemainderPolicy::ClampToZero {
        tracing::warn!(
            calories,
            protein_g,
            remaining_kcal,
            "protein floor exceeds calorie goal, carbs and fat set to zero"
        );
        (0, 0)
    } else {
        let carb_share = ratios.carb_share();
        let remaining = remaining_kcal as f64;
        (
            round_to_i64(remaining * carb_share / KCAL_PER_GRAM_CARBS),
            round_to_i64(remaining * (1.0 - carb_share) / KCAL_PER_GRAM_FAT),
        )
    };

    MacroBreakdown {
        split: MacroSplit {
            protein_g,
            carbs_g,
            fat_g,
        },
        protein_from_ratio_g,
        protein_floor_g,
        remaining_kcal,
        floor_applied: protein_floor_g > protein_from_ratio_g,
        remainder_exhausted,
    }
}

/// Macro split under the default [`RemainderPolicy`]
pub fn macros(calories: i64, goal_type: GoalType, weight_kg: f64) -> MacroSplit {
    split_macros(calories, goal_type, weight_kg, RemainderPolicy::default()).split
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GOALS: [GoalType; 3] = [
        GoalType::WeightLoss,
        GoalType::Maintenance,
        GoalType::MuscleGain,
    ];

    #[test]
    fn test_maintenance_split() {
        let split = macros(2556, GoalType::Maintenance, 70.0);
        assert_eq!(
            split,
            MacroSplit {
                protein_g: 192,
                carbs_g: 255,
                fat_g: 85,
            }
        );
        assert!((split.total_kcal() - 2556).abs() <= 3);
    }

    #[test]
    fn test_muscle_gain_floor_at_low_calories() {
        let breakdown = split_macros(1200, GoalType::MuscleGain, 60.0, RemainderPolicy::ClampToZero);

        assert_eq!(breakdown.protein_from_ratio_g, 90);
        assert_eq!(breakdown.protein_floor_g, 132);
        assert_eq!(breakdown.split.protein_g, 132);
        assert!(breakdown.floor_applied);
        assert_eq!(breakdown.remaining_kcal, 672);
        assert_eq!(breakdown.split.carbs_g, 108);
        assert_eq!(breakdown.split.fat_g, 27);
    }

    #[test]
    fn test_weight_loss_heavy_user_floor() {
        let split = macros(2381, GoalType::WeightLoss, 150.0);
        assert_eq!(split.protein_g, 300);
        assert_eq!(split.carbs_g, 136);
        assert_eq!(split.fat_g, 71);
    }

    #[test]
    fn test_protein_floor_dominance() {
        for goal in GOALS {
            for calories in (1200..=5000).step_by(190) {
                for weight in (30..=300).step_by(15) {
                    let weight = f64::from(weight);
                    let ratio = macro_ratios(goal).protein;
                    let split = macros(calories, goal, weight);
                    if weight * min_protein_per_kg(goal) * 4.0 > calories as f64 * ratio {
                        assert_eq!(split.protein_g, protein_floor(weight, goal));
                    }
                    assert!(split.protein_g >= protein_floor(weight, goal));
                }
            }
        }
    }

    #[test]
    fn test_macro_calorie_conservation() {
        // Rounding carbs and fat to whole grams can move the total by at most
        // 0.5*4 + 0.5*9 kcal.
        for goal in GOALS {
            for calories in (1200..=5000).step_by(37) {
                for weight in (30..=300).step_by(9) {
                    let breakdown =
                        split_macros(calories, goal, f64::from(weight), RemainderPolicy::ClampToZero);
                    if breakdown.remaining_kcal < 0 {
                        continue;
                    }
                    let drift = (breakdown.split.total_kcal() - calories).abs();
                    assert!(drift <= 6, "{goal:?} {calories} {weight}: drift {drift}");
                }
            }
        }
    }

    #[test]
    fn test_negative_remainder_clamped() {
        let breakdown = split_macros(1200, GoalType::MuscleGain, 300.0, RemainderPolicy::ClampToZero);

        assert_eq!(breakdown.split.protein_g, 660);
        assert_eq!(breakdown.remaining_kcal, -1440);
        assert!(breakdown.remainder_exhausted);
        assert_eq!(breakdown.split.carbs_g, 0);
        assert_eq!(breakdown.split.fat_g, 0);
    }

    #[test]
    fn test_negative_remainder_unguarded() {
        let breakdown = split_macros(1200, GoalType::MuscleGain, 300.0, RemainderPolicy::Unguarded);

        assert!(breakdown.remainder_exhausted);
        assert_eq!(breakdown.split.carbs_g, -231);
        assert_eq!(breakdown.split.fat_g, -57);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("unguarded".parse::<RemainderPolicy>(), Ok(RemainderPolicy::Unguarded));
        assert!("ignore".parse::<RemainderPolicy>().is_err());
    }
}
