//! Core types for the Nutri Goals engine
//!
//! This module defines the data structures that flow through each stage of the
//! calculation: the validated profile, intermediate energy and macro values,
//! the goal record, and the report envelope handed to callers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sex used for the BMR offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "cli", value(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    /// Uses the midpoint of the male and female offsets
    Other,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Other => "other",
        }
    }
}

/// Habitual activity level, mapped to a TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "cli", value(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little to no exercise
    Sedentary,
    /// Exercise 1-3 days/week
    LightlyActive,
    /// Exercise 3-5 days/week
    ModeratelyActive,
    /// Exercise 6-7 days/week
    VeryActive,
    /// Intense daily exercise or a physical job
    ExtraActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::ExtraActive => "extra_active",
        }
    }
}

/// Directional body-weight objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "cli", value(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    WeightLoss,
    Maintenance,
    MuscleGain,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::WeightLoss => "weight_loss",
            GoalType::Maintenance => "maintenance",
            GoalType::MuscleGain => "muscle_gain",
        }
    }
}

macro_rules! impl_enum_text {
    ($ty:ty, [$($variant:expr),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| format!("unknown value '{s}'"))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl_enum_text!(Sex, [Sex::Male, Sex::Female, Sex::Other]);
impl_enum_text!(
    ActivityLevel,
    [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ]
);
impl_enum_text!(
    GoalType,
    [GoalType::WeightLoss, GoalType::Maintenance, GoalType::MuscleGain]
);

/// BMI classification band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese => "obese",
        }
    }
}

/// Validated physical profile consumed by the engine.
///
/// Construct it through [`crate::validation::validate_profile`] unless the
/// values are already known to be in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInput {
    /// Body weight (kg), 30-300
    pub weight_kg: f64,
    /// Height (cm), 100-250
    pub height_cm: f64,
    /// Date of birth; derived age must be 13-120
    pub birth_date: NaiveDate,
    #[serde(alias = "gender")]
    pub sex: Sex,
    pub activity_level: ActivityLevel,
    pub goal_type: GoalType,
}

/// Protein, carbohydrate and fat targets in grams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroSplit {
    pub protein_g: i64,
    pub carbs_g: i64,
    pub fat_g: i64,
}

impl MacroSplit {
    /// Energy represented by the split (kcal)
    pub fn total_kcal(&self) -> i64 {
        self.protein_g * 4 + self.carbs_g * 4 + self.fat_g * 9
    }
}

/// Macro split plus the intermediate values that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroBreakdown {
    pub split: MacroSplit,
    /// Protein derived from the goal's calorie percentage
    pub protein_from_ratio_g: i64,
    /// Protein floor from body weight
    pub protein_floor_g: i64,
    /// Calories left for carbs and fat after protein
    pub remaining_kcal: i64,
    /// The floor overrode the percentage-derived protein
    pub floor_applied: bool,
    /// Protein consumed the whole calorie budget
    pub remainder_exhausted: bool,
}

/// Calorie goal before and after the safety clamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalorieTarget {
    pub unclamped: i64,
    pub goal: i64,
}

impl CalorieTarget {
    pub fn was_clamped(&self) -> bool {
        self.unclamped != self.goal
    }
}

/// Healthy weight band for a height (kg)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
}

/// Personalised daily nutrition goals.
///
/// Always produced whole by [`crate::pipeline::calculate_nutrition_goals`];
/// callers persist or discard it, never patch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionGoals {
    pub age: u32,
    pub bmr: i64,
    pub tdee: i64,
    /// Always within 1200-5000 kcal
    pub daily_calorie_goal: i64,
    pub daily_protein_goal: i64,
    pub daily_carbs_goal: i64,
    pub daily_fat_goal: i64,
    /// BMI, 2 decimals
    pub current_bmi: f64,
    pub bmi_category: BmiCategory,
    pub ideal_weight_range: WeightRange,
}

impl NutritionGoals {
    pub fn macros(&self) -> MacroSplit {
        MacroSplit {
            protein_g: self.daily_protein_goal,
            carbs_g: self.daily_carbs_goal,
            fat_g: self.daily_fat_goal,
        }
    }
}

/// Conditions worth surfacing alongside a goal record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalFlag {
    CalorieFloorApplied,
    CalorieCeilingApplied,
    ProteinFloorApplied,
    RemainderExhausted,
}

impl GoalFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalFlag::CalorieFloorApplied => "calorie_floor_applied",
            GoalFlag::CalorieCeilingApplied => "calorie_ceiling_applied",
            GoalFlag::ProteinFloorApplied => "protein_floor_applied",
            GoalFlag::RemainderExhausted => "remainder_exhausted",
        }
    }
}

/// Full result of one calculation: the goals plus the intermediate values
/// the report envelope needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalComputation {
    pub goals: NutritionGoals,
    pub calories: CalorieTarget,
    pub macros: MacroBreakdown,
    pub reference_date: NaiveDate,
}

impl GoalComputation {
    /// Flags raised by the clamp and the protein floor
    pub fn flags(&self) -> Vec<GoalFlag> {
        let mut flags = Vec::new();
        if self.calories.unclamped < self.calories.goal {
            flags.push(GoalFlag::CalorieFloorApplied);
        }
        if self.calories.unclamped > self.calories.goal {
            flags.push(GoalFlag::CalorieCeilingApplied);
        }
        if self.macros.floor_applied {
            flags.push(GoalFlag::ProteinFloorApplied);
        }
        if self.macros.remainder_exhausted {
            flags.push(GoalFlag::RemainderExhausted);
        }
        flags
    }
}

// ============================================================================
// Report envelope
// ============================================================================

/// Producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalsProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// When and for which date the goals were computed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalsProvenance {
    /// Date used as "today" for age derivation
    pub reference_date: String,
    pub computed_at_utc: String,
}

/// Intermediate values hidden by the goal record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalsDetails {
    pub unclamped_calorie_goal: i64,
    pub protein_from_ratio_g: i64,
    pub protein_floor_g: i64,
    pub remaining_kcal: i64,
}

/// Report envelope around a goal record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalsPayload {
    pub schema_version: String,
    pub producer: GoalsProducer,
    pub provenance: GoalsProvenance,
    pub goals: NutritionGoals,
    pub details: GoalsDetails,
    pub flags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_text_round_trip() {
        assert_eq!("lightly_active".parse::<ActivityLevel>(), Ok(ActivityLevel::LightlyActive));
        assert_eq!("muscle_gain".parse::<GoalType>(), Ok(GoalType::MuscleGain));
        assert_eq!(Sex::Other.to_string(), "other");
        assert!("athlete".parse::<ActivityLevel>().is_err());
    }

    #[test]
    fn test_profile_accepts_gender_alias() {
        let json = r#"{
            "weight_kg": 70.0,
            "height_cm": 175.0,
            "birth_date": "1990-04-12",
            "gender": "female",
            "activity_level": "very_active",
            "goal_type": "weight_loss"
        }"#;

        let profile: ProfileInput = serde_json::from_str(json).unwrap();
        assert_eq!(profile.sex, Sex::Female);
        assert_eq!(profile.birth_date, NaiveDate::from_ymd_opt(1990, 4, 12).unwrap());
    }

    #[test]
    fn test_macro_split_total_kcal() {
        let split = MacroSplit {
            protein_g: 192,
            carbs_g: 255,
            fat_g: 85,
        };
        assert_eq!(split.total_kcal(), 768 + 1020 + 765);
    }

    #[test]
    fn test_calorie_target_clamped() {
        let target = CalorieTarget {
            unclamped: 1166,
            goal: 1200,
        };
        assert!(target.was_clamped());
    }
}
