//! Weight progress tracking
//!
//! A bounded, time-ordered weight history plus the progress analytics built
//! on it: change between readings, progress toward a target, average weekly
//! change and goal date projections.

use crate::body::bmi;
use crate::constants::weekly_weight_change;
use crate::error::ComputeError;
use crate::types::GoalType;
use crate::units::{round_dp, round_half_up};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// Default number of weight entries kept
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Changes smaller than this (kg) count as stable
pub const STABLE_THRESHOLD_KG: f64 = 0.1;

const MILLIS_PER_WEEK: f64 = 7.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Where a weight reading came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    #[default]
    Manual,
    AppleHealth,
    GoogleFit,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Manual => "manual",
            DataSource::AppleHealth => "apple_health",
            DataSource::GoogleFit => "google_fit",
        }
    }
}

impl std::str::FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(DataSource::Manual),
            "apple_health" => Ok(DataSource::AppleHealth),
            "google_fit" => Ok(DataSource::GoogleFit),
            other => Err(format!("unknown data source '{other}'")),
        }
    }
}

/// One weight reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub weight_kg: f64,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub data_source: DataSource,
    /// BMI at the time of the reading, when the height was known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
}

impl WeightEntry {
    pub fn new(weight_kg: f64, recorded_at: DateTime<Utc>) -> Self {
        Self {
            weight_kg,
            recorded_at,
            data_source: DataSource::Manual,
            bmi: None,
        }
    }

    /// Attach the BMI for this reading at the given height
    pub fn with_height(mut self, height_cm: f64) -> Self {
        self.bmi = Some(bmi(self.weight_kg, height_cm));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Stable,
}

/// Difference between two readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightChange {
    /// kg, 1 decimal
    pub amount: f64,
    /// Absolute percentage of the previous reading, 1 decimal
    pub percentage: f64,
    pub direction: Direction,
}

pub fn weight_change(current: f64, previous: f64) -> WeightChange {
    let amount = current - previous;
    let percentage = if previous != 0.0 {
        (amount / previous * 100.0).abs()
    } else {
        0.0
    };

    let direction = if amount.abs() < STABLE_THRESHOLD_KG {
        Direction::Stable
    } else if amount > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    };

    WeightChange {
        amount: round_dp(amount, 1),
        percentage: round_dp(percentage, 1),
        direction,
    }
}

/// Progress from a starting weight toward a target
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    /// Whole percent, clamped to 0-100
    pub percentage: i64,
    /// kg still to go (signed, target minus current)
    pub remaining: f64,
    /// kg moved so far (signed, current minus start)
    pub achieved: f64,
}

/// Progress toward `target`; all zeros when `start == target`
pub fn goal_progress(current: f64, start: f64, target: f64) -> GoalProgress {
    if start == target {
        return GoalProgress::default();
    }

    let needed = target - start;
    let achieved = current - start;
    let percentage = round_half_up(achieved / needed * 100.0).clamp(0.0, 100.0) as i64;

    GoalProgress {
        percentage,
        remaining: round_dp(target - current, 1),
        achieved: round_dp(achieved, 1),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeToGoal {
    pub weeks: u32,
    pub estimated_date: NaiveDate,
}

/// Weeks to reach `target` at the observed weekly change, rounded up.
///
/// `None` when there is no change to extrapolate from.
pub fn estimate_time_to_goal(
    current: f64,
    target: f64,
    avg_weekly_change: f64,
    today: NaiveDate,
) -> Option<TimeToGoal> {
    if avg_weekly_change == 0.0 || !avg_weekly_change.is_finite() {
        return None;
    }

    let weeks = ((target - current).abs() / avg_weekly_change.abs()).ceil() as u32;
    let estimated_date = today.checked_add_days(Days::new(u64::from(weeks) * 7))?;

    Some(TimeToGoal {
        weeks,
        estimated_date,
    })
}

/// Date the target is reached at the goal's safe weekly rate.
///
/// `None` for maintenance, when already within 0.1 kg of the target, or when
/// the target lies in the opposite direction of the goal.
pub fn projected_goal_date(
    current: f64,
    target: f64,
    goal_type: GoalType,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let difference = target - current;
    let weekly = weekly_weight_change(goal_type);

    if weekly == 0.0 || difference.abs() < STABLE_THRESHOLD_KG {
        return None;
    }

    let mismatched = match goal_type {
        GoalType::WeightLoss => difference > 0.0,
        GoalType::MuscleGain => difference < 0.0,
        GoalType::Maintenance => true,
    };
    if mismatched {
        tracing::debug!(current, target, goal = goal_type.as_str(), "target opposes goal direction");
        return None;
    }

    let days = ((difference / weekly).abs() * 7.0).ceil() as u64;
    today.checked_add_days(Days::new(days))
}

/// Summary of a user's weight journey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightStats {
    pub current: Option<f64>,
    pub target: Option<f64>,
    /// First recorded weight, or the current weight with no history
    pub starting: Option<f64>,
    pub total_change: f64,
    pub progress_percentage: i64,
    pub remaining: f64,
    pub goal_type: Option<GoalType>,
}

/// Time-ordered weight readings, bounded to the most recent `limit`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredHistory")]
pub struct WeightHistory {
    entries: VecDeque<WeightEntry>,
    limit: usize,
}

/// Serialized form; re-sorted and re-bounded on the way in
#[derive(Deserialize)]
struct StoredHistory {
    #[serde(default)]
    entries: Vec<WeightEntry>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl From<StoredHistory> for WeightHistory {
    fn from(stored: StoredHistory) -> Self {
        Self::from_entries(stored.entries, stored.limit)
    }
}

impl Default for WeightHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl WeightHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            limit: limit.max(1),
        }
    }

    /// Build a history from readings in any order
    pub fn from_entries(entries: impl IntoIterator<Item = WeightEntry>, limit: usize) -> Self {
        let mut history = Self::new(limit);
        for entry in entries {
            history.record(entry);
        }
        history
    }

    /// Insert a reading at its time position, dropping the oldest beyond the limit
    pub fn record(&mut self, entry: WeightEntry) {
        let at = self
            .entries
            .partition_point(|e| e.recorded_at <= entry.recorded_at);
        self.entries.insert(at, entry);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &WeightEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the bound, dropping the oldest readings beyond it
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    pub fn first(&self) -> Option<&WeightEntry> {
        self.entries.front()
    }

    pub fn latest(&self) -> Option<&WeightEntry> {
        self.entries.back()
    }

    /// Change between the two most recent readings
    pub fn latest_change(&self) -> Option<WeightChange> {
        let n = self.entries.len();
        if n < 2 {
            return None;
        }
        Some(weight_change(
            self.entries[n - 1].weight_kg,
            self.entries[n - 2].weight_kg,
        ))
    }

    /// (last − first) per week between them, 2 decimals.
    ///
    /// 0 with fewer than two readings or when they share a timestamp.
    pub fn average_weekly_change(&self) -> f64 {
        let (Some(first), Some(last)) = (self.entries.front(), self.entries.back()) else {
            return 0.0;
        };
        if self.entries.len() < 2 {
            return 0.0;
        }

        let weeks =
            (last.recorded_at - first.recorded_at).num_milliseconds() as f64 / MILLIS_PER_WEEK;
        if weeks == 0.0 {
            return 0.0;
        }

        round_dp((last.weight_kg - first.weight_kg) / weeks, 2)
    }

    pub fn stats(
        &self,
        current: Option<f64>,
        target: Option<f64>,
        goal_type: Option<GoalType>,
    ) -> WeightStats {
        let starting = self.first().map(|e| e.weight_kg).or(current);

        let mut total_change = 0.0;
        let mut progress_percentage = 0;
        let mut remaining = 0.0;

        if let (Some(current), Some(starting)) = (current, starting) {
            total_change = round_dp(current - starting, 1);
            if let Some(target) = target {
                let progress = goal_progress(current, starting, target);
                progress_percentage = progress.percentage;
                remaining = progress.remaining;
            }
        }

        WeightStats {
            current,
            target,
            starting,
            total_change,
            progress_percentage,
            remaining,
            goal_type,
        }
    }

    /// Load from JSON, restoring time order and the stored limit
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn load(path: &Path) -> Result<Self, ComputeError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }

    /// Load the history at `path`, or start an empty one, bounded by `limit`
    /// rather than whatever limit the file was saved with
    pub fn open(path: &Path, limit: usize) -> Result<Self, ComputeError> {
        if !path.exists() {
            return Ok(Self::new(limit));
        }
        let mut history = Self::load(path)?;
        if history.limit != limit.max(1) {
            tracing::debug!(
                stored = history.limit,
                configured = limit,
                "weight history limit replaced by configuration"
            );
            history.set_limit(limit);
        }
        Ok(history)
    }

    pub fn save(&self, path: &Path) -> Result<(), ComputeError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
