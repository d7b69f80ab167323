//! Energy expenditure stages
//!
//! Age derivation, Mifflin-St Jeor BMR, activity-scaled TDEE and the
//! goal-adjusted, safety-clamped calorie target. Every function is total over
//! validated input and performs no checks of its own.

use crate::constants::{
    activity_multiplier, calorie_adjustment, MAX_DAILY_CALORIES, MIN_DAILY_CALORIES,
    MSJ_AGE_COEF, MSJ_FEMALE_OFFSET, MSJ_HEIGHT_COEF, MSJ_MALE_OFFSET, MSJ_OTHER_OFFSET,
    MSJ_WEIGHT_COEF,
};
use crate::types::{ActivityLevel, CalorieTarget, GoalType, Sex};
use crate::units::round_to_i64;
use chrono::{Datelike, NaiveDate};

/// Whole years between `birth_date` and `today`.
///
/// One year is subtracted while this year's birthday is still ahead. A birth
/// date after `today` yields 0.
pub fn age(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Basal Metabolic Rate (kcal/day), Mifflin-St Jeor
///
/// `10·w + 6.25·h − 5·age` plus +5 (male), −161 (female) or −78 (other).
pub fn bmr(weight_kg: f64, height_cm: f64, age: u32, sex: Sex) -> i64 {
    let base =
        MSJ_WEIGHT_COEF * weight_kg + MSJ_HEIGHT_COEF * height_cm - MSJ_AGE_COEF * f64::from(age);

    let offset = match sex {
        Sex::Male => MSJ_MALE_OFFSET,
        Sex::Female => MSJ_FEMALE_OFFSET,
        Sex::Other => MSJ_OTHER_OFFSET,
    };

    round_to_i64(base + offset)
}

/// Total Daily Energy Expenditure (kcal/day)
pub fn tdee(bmr: i64, activity_level: ActivityLevel) -> i64 {
    round_to_i64(bmr as f64 * activity_multiplier(activity_level))
}

/// Goal-adjusted calorie target, before and after the 1200-5000 clamp
pub fn calorie_target(tdee: i64, goal_type: GoalType) -> CalorieTarget {
    let unclamped = round_to_i64(tdee as f64 * (1.0 + calorie_adjustment(goal_type)));
    let goal = unclamped.clamp(MIN_DAILY_CALORIES, MAX_DAILY_CALORIES);

    if goal != unclamped {
        tracing::warn!(unclamped, goal, "calorie goal clamped to safety bounds");
    }

    CalorieTarget { unclamped, goal }
}

/// Daily calorie goal, clamped to 1200-5000 kcal.
///
/// The clamp is silent; use [`calorie_target`] to see the unclamped value.
pub fn calorie_goal(tdee: i64, goal_type: GoalType) -> i64 {
    calorie_target(tdee, goal_type).goal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let birth = date(1996, 5, 20);
        assert_eq!(age(birth, date(2026, 5, 19)), 29);
        assert_eq!(age(birth, date(2026, 5, 20)), 30);
        assert_eq!(age(birth, date(2026, 12, 1)), 30);
        assert_eq!(age(birth, date(2026, 1, 31)), 29);
    }

    #[test]
    fn test_age_leap_day_birthday() {
        let birth = date(2000, 2, 29);
        assert_eq!(age(birth, date(2025, 2, 28)), 24);
        assert_eq!(age(birth, date(2025, 3, 1)), 25);
        assert_eq!(age(birth, date(2028, 2, 29)), 28);
    }

    #[test]
    fn test_age_future_birth_date_saturates() {
        assert_eq!(age(date(2030, 1, 1), date(2026, 1, 1)), 0);
    }

    #[test]
    fn test_bmr_male() {
        // 700 + 1093.75 - 150 + 5 = 1648.75
        assert_eq!(bmr(70.0, 175.0, 30, Sex::Male), 1649);
    }

    #[test]
    fn test_bmr_female() {
        // 600 + 1031.25 - 125 - 161 = 1345.25
        assert_eq!(bmr(60.0, 165.0, 25, Sex::Female), 1345);
    }

    #[test]
    fn test_bmr_other_is_midpoint() {
        for (w, h, a) in [(70.0, 175.0, 30), (55.5, 162.3, 41), (120.0, 190.0, 67)] {
            let male = bmr(w, h, a, Sex::Male);
            let female = bmr(w, h, a, Sex::Female);
            let other = bmr(w, h, a, Sex::Other);
            let midpoint = ((male + female) as f64 / 2.0).round() as i64;
            assert!((other - midpoint).abs() <= 1, "{w} {h} {a}");
        }
    }

    #[test]
    fn test_tdee_multipliers() {
        assert_eq!(tdee(1649, ActivityLevel::ModeratelyActive), 2556);
        assert_eq!(tdee(1000, ActivityLevel::Sedentary), 1200);
        assert_eq!(tdee(1000, ActivityLevel::LightlyActive), 1375);
        assert_eq!(tdee(1000, ActivityLevel::VeryActive), 1725);
        assert_eq!(tdee(1000, ActivityLevel::ExtraActive), 1900);
    }

    #[test]
    fn test_calorie_goal_adjustments() {
        assert_eq!(calorie_goal(2556, GoalType::Maintenance), 2556);
        assert_eq!(calorie_goal(2500, GoalType::WeightLoss), 2000);
        assert_eq!(calorie_goal(2500, GoalType::MuscleGain), 2750);
    }

    #[test]
    fn test_calorie_goal_clamps_floor() {
        // 50kg, 160cm, 25y female, sedentary: bmr 1214, tdee 1457, x0.8 = 1166
        let tdee = tdee(bmr(50.0, 160.0, 25, Sex::Female), ActivityLevel::Sedentary);
        assert_eq!(tdee, 1457);

        let target = calorie_target(tdee, GoalType::WeightLoss);
        assert_eq!(target.unclamped, 1166);
        assert_eq!(target.goal, MIN_DAILY_CALORIES);
        assert!(target.was_clamped());
    }

    #[test]
    fn test_calorie_goal_clamps_ceiling() {
        let target = calorie_target(4800, GoalType::MuscleGain);
        assert_eq!(target.unclamped, 5280);
        assert_eq!(target.goal, MAX_DAILY_CALORIES);
    }
}
