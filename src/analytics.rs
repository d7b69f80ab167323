//! Meal log analytics
//!
//! Aggregates caller-supplied meal logs into range summaries, per-day totals
//! and macro distributions, and compares a day's intake with its targets.
//! Days are UTC calendar dates.

use crate::error::ComputeError;
use crate::types::NutritionGoals;
use crate::units::{round_dp, round_to_i64};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Intake share at which a nutrient counts as approaching its target (%)
pub const APPROACHING_THRESHOLD_PCT: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// One logged meal; absent nutrient values count as zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealLog {
    pub logged_at: DateTime<Utc>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    pub meal_type: MealType,
}

impl MealLog {
    pub fn date(&self) -> NaiveDate {
        self.logged_at.date_naive()
    }
}

/// Summed nutrients (kcal and grams)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTotals {
    fn add(&mut self, meal: &MealLog) {
        self.calories += meal.calories.unwrap_or(0.0);
        self.protein += meal.protein.unwrap_or(0.0);
        self.carbs += meal.carbs.unwrap_or(0.0);
        self.fat += meal.fat.unwrap_or(0.0);
    }

    pub fn from_meals<'a>(meals: impl IntoIterator<Item = &'a MealLog>) -> Self {
        let mut totals = Self::default();
        for meal in meals {
            totals.add(meal);
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_meals: usize,
    /// kcal per day of the range
    pub avg_calories: i64,
    pub avg_protein: f64,
    pub avg_carbs: f64,
    pub avg_fat: f64,
    /// Inclusive number of days in the range
    pub days: i64,
    /// e.g. "Mar 1 - Mar 7, 2026"
    pub date_range: String,
}

/// Per-day averages over `[start, end]`.
///
/// Averages divide by the number of days in the range, not by the number of
/// days with meals.
pub fn summarize(
    meals: &[MealLog],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<AnalyticsSummary, ComputeError> {
    if end < start {
        return Err(ComputeError::InsufficientData(format!(
            "range end {end} precedes start {start}"
        )));
    }

    let in_range: Vec<&MealLog> = meals
        .iter()
        .filter(|m| (start..=end).contains(&m.date()))
        .collect();
    let totals = MacroTotals::from_meals(in_range.iter().copied());
    let days = (end - start).num_days() + 1;
    let per_day = |value: f64| round_dp(value / days as f64, 1);

    tracing::debug!(meals = in_range.len(), days, "summarised meal range");

    Ok(AnalyticsSummary {
        total_meals: in_range.len(),
        avg_calories: round_to_i64(totals.calories / days as f64),
        avg_protein: per_day(totals.protein),
        avg_carbs: per_day(totals.carbs),
        avg_fat: per_day(totals.fat),
        days,
        date_range: format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y")),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNutrition {
    pub date: NaiveDate,
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Totals per UTC date, oldest first
pub fn daily_nutrition(meals: &[MealLog]) -> Vec<DailyNutrition> {
    let mut by_day: BTreeMap<NaiveDate, MacroTotals> = BTreeMap::new();
    for meal in meals {
        by_day.entry(meal.date()).or_default().add(meal);
    }

    by_day
        .into_iter()
        .map(|(date, t)| DailyNutrition {
            date,
            calories: round_to_i64(t.calories),
            protein: round_dp(t.protein, 1),
            carbs: round_dp(t.carbs, 1),
            fat: round_dp(t.fat, 1),
        })
        .collect()
}

/// Grams of each macro across all meals, 1 decimal
pub fn macro_distribution(meals: &[MealLog]) -> MacroTotals {
    let totals = MacroTotals::from_meals(meals);
    MacroTotals {
        calories: round_dp(totals.calories, 1),
        protein: round_dp(totals.protein, 1),
        carbs: round_dp(totals.carbs, 1),
        fat: round_dp(totals.fat, 1),
    }
}

/// Daily targets used for adherence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTargets {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

/// Fallback for profiles without computed goals
impl Default for DailyTargets {
    fn default() -> Self {
        Self {
            calories: 2000,
            protein: 150,
            carbs: 250,
            fat: 67,
        }
    }
}

impl From<&NutritionGoals> for DailyTargets {
    fn from(goals: &NutritionGoals) -> Self {
        Self {
            calories: goals.daily_calorie_goal,
            protein: goals.daily_protein_goal,
            carbs: goals.daily_carbs_goal,
            fat: goals.daily_fat_goal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdherenceStatus {
    OnTrack,
    Approaching,
    Reached,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroAdherence {
    pub nutrient: Nutrient,
    pub consumed: f64,
    pub target: i64,
    /// Share of the target consumed, capped at 100, 1 decimal
    pub percentage: f64,
    pub status: AdherenceStatus,
}

fn adherence_for(nutrient: Nutrient, consumed: f64, target: i64) -> MacroAdherence {
    let percentage = if target > 0 {
        (consumed / target as f64 * 100.0).min(100.0)
    } else {
        0.0
    };

    let status = if percentage >= 100.0 {
        AdherenceStatus::Reached
    } else if percentage >= APPROACHING_THRESHOLD_PCT {
        AdherenceStatus::Approaching
    } else {
        AdherenceStatus::OnTrack
    };

    MacroAdherence {
        nutrient,
        consumed,
        target,
        percentage: round_dp(percentage, 1),
        status,
    }
}

/// Compare consumed totals with targets, in calories/protein/carbs/fat order
pub fn adherence(consumed: &MacroTotals, targets: &DailyTargets) -> Vec<MacroAdherence> {
    vec![
        adherence_for(Nutrient::Calories, consumed.calories, targets.calories),
        adherence_for(Nutrient::Protein, consumed.protein, targets.protein),
        adherence_for(Nutrient::Carbs, consumed.carbs, targets.carbs),
        adherence_for(Nutrient::Fat, consumed.fat, targets.fat),
    ]
}

/// Intake minus active energy burned
pub fn net_calories(consumed: f64, burned: f64) -> f64 {
    consumed - burned
}
