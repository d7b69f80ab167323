//! Pipeline orchestration
//!
//! This module provides the public API for Nutri Goals.
//! It runs a validated profile through every stage and returns the goal
//! record, optionally wrapped in a report payload.

use crate::body::{bmi, bmi_category, ideal_weight_range};
use crate::config::EngineConfig;
use crate::encoder::GoalsEncoder;
use crate::energy::{age, bmr, calorie_target, tdee};
use crate::error::ComputeError;
use crate::macros::{split_macros, RemainderPolicy};
use crate::types::{GoalComputation, GoalsPayload, NutritionGoals, ProfileInput};
use crate::validation::{
    validate_profile, OnboardingProfile, ProfileUpdate, RawProfileInput,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Run every stage for `profile` as of `today`.
///
/// Stages:
/// 1. Age from birth date
/// 2. BMR (Mifflin-St Jeor)
/// 3. TDEE (activity multiplier)
/// 4. Calorie goal (goal adjustment + safety clamp)
/// 5. Macro split (protein floor, carb:fat remainder)
/// 6. BMI, category and ideal weight range
pub fn compute(profile: &ProfileInput, today: NaiveDate, policy: RemainderPolicy) -> GoalComputation {
    let age = age(profile.birth_date, today);
    let bmr = bmr(profile.weight_kg, profile.height_cm, age, profile.sex);
    let tdee = tdee(bmr, profile.activity_level);
    tracing::debug!(age, bmr, tdee, "energy expenditure computed");

    let calories = calorie_target(tdee, profile.goal_type);
    let macros = split_macros(calories.goal, profile.goal_type, profile.weight_kg, policy);
    tracing::debug!(
        calorie_goal = calories.goal,
        protein_g = macros.split.protein_g,
        carbs_g = macros.split.carbs_g,
        fat_g = macros.split.fat_g,
        "macro split computed"
    );

    let current_bmi = bmi(profile.weight_kg, profile.height_cm);

    GoalComputation {
        goals: NutritionGoals {
            age,
            bmr,
            tdee,
            daily_calorie_goal: calories.goal,
            daily_protein_goal: macros.split.protein_g,
            daily_carbs_goal: macros.split.carbs_g,
            daily_fat_goal: macros.split.fat_g,
            current_bmi,
            bmi_category: bmi_category(current_bmi),
            ideal_weight_range: ideal_weight_range(profile.height_cm),
        },
        calories,
        macros,
        reference_date: today,
    }
}

/// Daily nutrition goals for a validated profile.
///
/// Pure and deterministic given `today`; uses the default remainder policy.
pub fn calculate_nutrition_goals(profile: &ProfileInput, today: NaiveDate) -> NutritionGoals {
    compute(profile, today, RemainderPolicy::default()).goals
}

/// Validate a raw profile JSON document and return the goals report JSON.
///
/// # Example
/// ```ignore
/// let report = profile_json_to_goals(r#"{"weight_kg": 70, ...}"#, today)?;
/// ```
pub fn profile_json_to_goals(json: &str, today: NaiveDate) -> Result<String, ComputeError> {
    GoalsCalculator::new().process_json(json, today)
}

/// Result of applying a [`ProfileUpdate`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub profile: OnboardingProfile,
    /// Fresh goals when a calculation input changed
    pub goals: Option<NutritionGoals>,
}

/// Calculator carrying configuration and a report encoder.
///
/// Use this instead of the free functions when the remainder policy or the
/// reference date come from configuration.
#[derive(Debug, Clone, Default)]
pub struct GoalsCalculator {
    config: EngineConfig,
    encoder: GoalsEncoder,
}

impl GoalsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            encoder: GoalsEncoder::new(),
        }
    }

    pub fn with_encoder(mut self, encoder: GoalsEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reference date from configuration, else the current UTC date
    pub fn today(&self) -> NaiveDate {
        self.config.today()
    }

    pub fn calculate(&self, profile: &ProfileInput, today: NaiveDate) -> GoalComputation {
        compute(profile, today, self.config.remainder_policy)
    }

    pub fn report(
        &self,
        profile: &ProfileInput,
        today: NaiveDate,
    ) -> Result<GoalsPayload, ComputeError> {
        self.encoder.encode(&self.calculate(profile, today))
    }

    /// Validate a raw profile and produce its report payload
    pub fn process_raw(
        &self,
        raw: &RawProfileInput,
        today: NaiveDate,
    ) -> Result<GoalsPayload, ComputeError> {
        let profile = validate_profile(raw, today)?;
        self.report(&profile, today)
    }

    /// JSON in, pretty JSON report out
    pub fn process_json(&self, json: &str, today: NaiveDate) -> Result<String, ComputeError> {
        let raw: RawProfileInput = serde_json::from_str(json)?;
        let profile = validate_profile(&raw, today)?;
        self.encoder.encode_to_json(&self.calculate(&profile, today))
    }

    /// Merge `update` over `current`, recalculating only when a calculation
    /// input changed.
    pub fn apply_update(
        &self,
        current: &OnboardingProfile,
        update: &ProfileUpdate,
        today: NaiveDate,
    ) -> Result<UpdateOutcome, ComputeError> {
        update.validate(today)?;
        let merged = update.apply_to(current);

        // The merged profile must still be valid as a whole
        validate_profile(&RawProfileInput::from(&merged.profile), today)?;

        let goals = if update.needs_recalculation() {
            tracing::debug!("profile update changes goal inputs, recalculating");
            Some(self.calculate(&merged.profile, today).goals)
        } else {
            None
        };

        Ok(UpdateOutcome {
            profile: merged,
            goals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MAX_DAILY_CALORIES, MIN_DAILY_CALORIES};
    use crate::types::{ActivityLevel, BmiCategory, GoalFlag, GoalType, Sex, WeightRange};
    use pretty_assertions::assert_eq;

    const SEXES: [Sex; 3] = [Sex::Male, Sex::Female, Sex::Other];
    const LEVELS: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];
    const GOALS: [GoalType; 3] = [
        GoalType::WeightLoss,
        GoalType::Maintenance,
        GoalType::MuscleGain,
    ];

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn profile(
        weight_kg: f64,
        height_cm: f64,
        birth_year: i32,
        sex: Sex,
        activity_level: ActivityLevel,
        goal_type: GoalType,
    ) -> ProfileInput {
        ProfileInput {
            weight_kg,
            height_cm,
            birth_date: NaiveDate::from_ymd_opt(birth_year, 1, 15).unwrap(),
            sex,
            activity_level,
            goal_type,
        }
    }

    #[test]
    fn test_maintenance_male_scenario() {
        let p = profile(
            70.0,
            175.0,
            1996,
            Sex::Male,
            ActivityLevel::ModeratelyActive,
            GoalType::Maintenance,
        );
        let goals = calculate_nutrition_goals(&p, today());

        assert_eq!(
            goals,
            NutritionGoals {
                age: 30,
                bmr: 1649,
                tdee: 2556,
                daily_calorie_goal: 2556,
                daily_protein_goal: 192,
                daily_carbs_goal: 255,
                daily_fat_goal: 85,
                current_bmi: 22.86,
                bmi_category: BmiCategory::Normal,
                ideal_weight_range: WeightRange {
                    min: 56.7,
                    max: 76.6,
                },
            }
        );
        assert!((goals.macros().total_kcal() - goals.daily_calorie_goal).abs() <= 3);
    }

    #[test]
    fn test_weight_loss_clamped_to_floor() {
        let p = profile(
            50.0,
            160.0,
            2001,
            Sex::Female,
            ActivityLevel::Sedentary,
            GoalType::WeightLoss,
        );
        let computation = compute(&p, today(), RemainderPolicy::ClampToZero);

        assert_eq!(computation.goals.age, 25);
        assert_eq!(computation.goals.tdee, 1457);
        assert_eq!(computation.calories.unclamped, 1166);
        assert_eq!(computation.goals.daily_calorie_goal, MIN_DAILY_CALORIES);
        assert!(computation.flags().contains(&GoalFlag::CalorieFloorApplied));
    }

    #[test]
    fn test_overweight_bmi() {
        let p = profile(
            90.0,
            180.0,
            1980,
            Sex::Male,
            ActivityLevel::LightlyActive,
            GoalType::WeightLoss,
        );
        let goals = calculate_nutrition_goals(&p, today());
        assert_eq!(goals.current_bmi, 27.78);
        assert_eq!(goals.bmi_category, BmiCategory::Overweight);
    }

    #[test]
    fn test_muscle_gain_protein_floor() {
        // bmr 1077, tdee 1292, goal 1421: ratio protein 107 < floor 132
        let p = profile(
            60.0,
            150.0,
            1966,
            Sex::Female,
            ActivityLevel::Sedentary,
            GoalType::MuscleGain,
        );
        let computation = compute(&p, today(), RemainderPolicy::ClampToZero);

        assert_eq!(computation.goals.daily_calorie_goal, 1421);
        assert_eq!(computation.macros.protein_from_ratio_g, 107);
        assert_eq!(computation.goals.daily_protein_goal, 132);
        assert!(computation.flags().contains(&GoalFlag::ProteinFloorApplied));
    }

    #[test]
    fn test_determinism() {
        let p = profile(
            82.5,
            181.0,
            1988,
            Sex::Other,
            ActivityLevel::VeryActive,
            GoalType::MuscleGain,
        );
        let first = calculate_nutrition_goals(&p, today());
        for _ in 0..10 {
            assert_eq!(calculate_nutrition_goals(&p, today()), first);
        }
    }

    #[test]
    fn test_calorie_goal_always_within_bounds() {
        for sex in SEXES {
            for level in LEVELS {
                for goal in GOALS {
                    for weight in [30.0, 55.0, 90.0, 180.0, 300.0] {
                        for height in [100.0, 160.0, 200.0, 250.0] {
                            for birth_year in [1906, 1960, 2013] {
                                let p = profile(weight, height, birth_year, sex, level, goal);
                                let goals = calculate_nutrition_goals(&p, today());
                                assert!(
                                    (MIN_DAILY_CALORIES..=MAX_DAILY_CALORIES)
                                        .contains(&goals.daily_calorie_goal),
                                    "{p:?}"
                                );
                                assert!(goals.daily_carbs_goal >= 0);
                                assert!(goals.daily_fat_goal >= 0);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_bmi_reproduces_weight() {
        for weight in [30.0, 61.3, 88.8, 140.0, 300.0] {
            for height in [100.0, 152.4, 175.0, 250.0] {
                let p = profile(
                    weight,
                    height,
                    1990,
                    Sex::Female,
                    ActivityLevel::Sedentary,
                    GoalType::Maintenance,
                );
                let goals = calculate_nutrition_goals(&p, today());
                let h2 = (height / 100.0) * (height / 100.0);
                assert!((goals.current_bmi * h2 - weight).abs() <= 0.005 * h2 + 1e-9);
            }
        }
    }

    #[test]
    fn test_profile_json_to_goals() {
        let json = r#"{
            "weight_kg": 70,
            "height_cm": 175,
            "birth_date": "1996-01-15",
            "gender": "male",
            "activity_level": "moderately_active",
            "goal_type": "maintenance"
        }"#;
        let report = profile_json_to_goals(json, today()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();

        assert_eq!(value["goals"]["daily_calorie_goal"], 2556);
        assert_eq!(value["goals"]["bmi_category"], "normal");
        assert_eq!(value["flags"], serde_json::json!([]));
    }

    #[test]
    fn test_profile_json_validation_error() {
        let err = profile_json_to_goals(r#"{"weight_kg": 20}"#, today()).unwrap_err();
        match err {
            ComputeError::Validation(errors) => {
                assert!(errors.contains("weight_kg"));
                assert!(errors.contains("goal_type"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = profile_json_to_goals("{not json", today()).unwrap_err();
        assert!(matches!(err, ComputeError::JsonError(_)));
    }

    #[test]
    fn test_unguarded_policy_from_config() {
        let calculator = GoalsCalculator::with_config(EngineConfig {
            remainder_policy: RemainderPolicy::Unguarded,
            ..Default::default()
        });
        // Outside validated ranges (age 226): goal clamps to 1200, floor is 330 g
        let p = profile(
            150.0,
            100.0,
            1800,
            Sex::Female,
            ActivityLevel::Sedentary,
            GoalType::MuscleGain,
        );
        let computation = calculator.calculate(&p, today());

        assert_eq!(computation.goals.daily_calorie_goal, 1200);
        assert_eq!(computation.macros.remaining_kcal, -120);
        assert!(computation.macros.remainder_exhausted);
        assert_eq!(computation.goals.daily_carbs_goal, -19);
        assert_eq!(computation.goals.daily_fat_goal, -5);

        let clamped = GoalsCalculator::new().calculate(&p, today());
        assert_eq!(clamped.goals.daily_carbs_goal, 0);
        assert_eq!(clamped.goals.daily_fat_goal, 0);
    }

    fn onboarding() -> OnboardingProfile {
        OnboardingProfile {
            profile: profile(
                70.0,
                175.0,
                1996,
                Sex::Male,
                ActivityLevel::ModeratelyActive,
                GoalType::Maintenance,
            ),
            target_weight_kg: None,
        }
    }

    #[test]
    fn test_update_recalculates_on_goal_change() {
        let update = ProfileUpdate {
            goal_type: Some(GoalType::WeightLoss),
            target_weight_kg: Some(Some(65.0)),
            ..Default::default()
        };
        let outcome = GoalsCalculator::new()
            .apply_update(&onboarding(), &update, today())
            .unwrap();

        assert_eq!(outcome.profile.target_weight_kg, Some(65.0));
        let goals = outcome.goals.unwrap();
        // 2556 * 0.8
        assert_eq!(goals.daily_calorie_goal, 2045);
    }

    #[test]
    fn test_update_target_only_skips_recalculation() {
        let update = ProfileUpdate {
            target_weight_kg: Some(Some(68.0)),
            ..Default::default()
        };
        let outcome = GoalsCalculator::new()
            .apply_update(&onboarding(), &update, today())
            .unwrap();
        assert_eq!(outcome.goals, None);
        assert_eq!(outcome.profile.profile, onboarding().profile);
    }

    #[test]
    fn test_update_clears_target_when_switching_to_maintenance() {
        let mut current = onboarding();
        current.profile.goal_type = GoalType::WeightLoss;
        current.target_weight_kg = Some(65.0);

        let update: ProfileUpdate = serde_json::from_str(
            r#"{"goal_type": "maintenance", "target_weight_kg": null}"#,
        )
        .unwrap();
        let outcome = GoalsCalculator::new()
            .apply_update(&current, &update, today())
            .unwrap();

        assert_eq!(outcome.profile.target_weight_kg, None);
        assert_eq!(outcome.goals.unwrap().daily_calorie_goal, 2556);
    }

    #[test]
    fn test_update_rejects_out_of_range() {
        let update = ProfileUpdate {
            weight_kg: Some(12.0),
            ..Default::default()
        };
        let err = GoalsCalculator::new()
            .apply_update(&onboarding(), &update, today())
            .unwrap_err();
        assert!(matches!(err, ComputeError::Validation(_)));
    }
}
