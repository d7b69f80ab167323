//! Input validation boundary
//!
//! Raw profile data arrives loosely typed (absent numbers, date strings,
//! enum strings). Everything is checked here, all failures are collected per
//! field, and only a fully valid [`ProfileInput`] is handed to the engine.

use crate::constants::{
    MAX_AGE_YEARS, MAX_HEIGHT_CM, MAX_WEIGHT_KG, MIN_AGE_YEARS, MIN_HEIGHT_CM, MIN_WEIGHT_KG,
};
use crate::energy::age;
use crate::progress::{DataSource, WeightEntry};
use crate::types::{ActivityLevel, GoalType, ProfileInput, Sex};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

pub const MSG_BIRTH_DATE_REQUIRED: &str = "Date of birth is required";
pub const MSG_INVALID_DATE: &str = "Invalid date format";
pub const MSG_BIRTH_DATE_FUTURE: &str = "Date of birth cannot be in the future";
pub const MSG_AGE_RANGE: &str = "You must be between 13 and 120 years old";
pub const MSG_SEX_REQUIRED: &str = "Gender is required for nutrition calculations";
pub const MSG_ACTIVITY_REQUIRED: &str = "Activity level is required";
pub const MSG_GOAL_REQUIRED: &str = "Goal type is required";
pub const MSG_TARGET_REQUIRED: &str =
    "Target weight is required for weight loss or muscle gain goals";
pub const MSG_DATA_SOURCE: &str = "Data source must be manual, apple_health or google_fit";

/// Validation failures keyed by field name, in field-name order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one failure
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(value)` when nothing was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

// ============================================================================
// Field checks
// ============================================================================

fn check_bounds(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: f64,
    (min, max): (f64, f64),
    unit: &str,
) {
    if !value.is_finite() {
        errors.add(field, format!("{label} must be a number"));
    } else if value < min {
        errors.add(field, format!("{label} must be at least {min}{unit}"));
    } else if value > max {
        errors.add(field, format!("{label} must be less than {max}{unit}"));
    }
}

fn check_weight(errors: &mut FieldErrors, field: &str, label: &str, value: f64) {
    check_bounds(errors, field, label, value, (MIN_WEIGHT_KG, MAX_WEIGHT_KG), "kg");
}

fn check_height(errors: &mut FieldErrors, value: f64) {
    check_bounds(
        errors,
        "height_cm",
        "Height",
        value,
        (MIN_HEIGHT_CM, MAX_HEIGHT_CM),
        "cm",
    );
}

fn check_birth_date(errors: &mut FieldErrors, birth_date: NaiveDate, today: NaiveDate) {
    if birth_date > today {
        errors.add("birth_date", MSG_BIRTH_DATE_FUTURE);
        return;
    }
    let years = age(birth_date, today);
    if !(MIN_AGE_YEARS..=MAX_AGE_YEARS).contains(&years) {
        errors.add("birth_date", MSG_AGE_RANGE);
    }
}

/// Pull a number out of a loose JSON value, recording why it is unusable.
fn number_field(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: Option<&Value>,
) -> Option<f64> {
    match value {
        None | Some(Value::Null) => {
            errors.add(field, format!("{label} is required"));
            None
        }
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Some(v),
            _ => {
                errors.add(field, format!("{label} must be a number"));
                None
            }
        },
        Some(_) => {
            errors.add(field, format!("{label} must be a number"));
            None
        }
    }
}

fn enum_field<T: std::str::FromStr>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    message: &str,
) -> Option<T> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => match text.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.add(field, message);
                None
            }
        },
        None => {
            errors.add(field, message);
            None
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

fn date_field(errors: &mut FieldErrors, value: Option<&str>) -> Option<NaiveDate> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => {
            errors.add("birth_date", MSG_BIRTH_DATE_REQUIRED);
            None
        }
        Some(text) => {
            let parsed = parse_date(text);
            if parsed.is_none() {
                errors.add("birth_date", MSG_INVALID_DATE);
            }
            parsed
        }
    }
}

// ============================================================================
// Profile
// ============================================================================

/// Profile data as submitted, before any checks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProfileInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, alias = "gender", skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<Value>,
}

impl From<&ProfileInput> for RawProfileInput {
    fn from(profile: &ProfileInput) -> Self {
        Self {
            weight_kg: Some(Value::from(profile.weight_kg)),
            height_cm: Some(Value::from(profile.height_cm)),
            birth_date: Some(profile.birth_date.format("%Y-%m-%d").to_string()),
            sex: Some(profile.sex.as_str().to_string()),
            activity_level: Some(profile.activity_level.as_str().to_string()),
            goal_type: Some(profile.goal_type.as_str().to_string()),
            target_weight_kg: None,
        }
    }
}

/// Validated profile plus the optional target weight collected at onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingProfile {
    #[serde(flatten)]
    pub profile: ProfileInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
}

fn collect_profile(
    raw: &RawProfileInput,
    today: NaiveDate,
    errors: &mut FieldErrors,
) -> Option<ProfileInput> {
    let weight_kg = number_field(errors, "weight_kg", "Weight", raw.weight_kg.as_ref());
    if let Some(w) = weight_kg {
        check_weight(errors, "weight_kg", "Weight", w);
    }

    let height_cm = number_field(errors, "height_cm", "Height", raw.height_cm.as_ref());
    if let Some(h) = height_cm {
        check_height(errors, h);
    }

    let birth_date = date_field(errors, raw.birth_date.as_deref());
    if let Some(date) = birth_date {
        check_birth_date(errors, date, today);
    }

    let sex = enum_field::<Sex>(errors, "sex", raw.sex.as_deref(), MSG_SEX_REQUIRED);
    let activity_level = enum_field::<ActivityLevel>(
        errors,
        "activity_level",
        raw.activity_level.as_deref(),
        MSG_ACTIVITY_REQUIRED,
    );
    let goal_type =
        enum_field::<GoalType>(errors, "goal_type", raw.goal_type.as_deref(), MSG_GOAL_REQUIRED);

    Some(ProfileInput {
        weight_kg: weight_kg?,
        height_cm: height_cm?,
        birth_date: birth_date?,
        sex: sex?,
        activity_level: activity_level?,
        goal_type: goal_type?,
    })
}

/// Validate the physical profile the engine needs.
///
/// Every field is checked; the error map holds all failures, not just the
/// first one.
pub fn validate_profile(
    raw: &RawProfileInput,
    today: NaiveDate,
) -> Result<ProfileInput, FieldErrors> {
    let mut errors = FieldErrors::new();
    let profile = collect_profile(raw, today, &mut errors);
    match profile {
        Some(profile) => errors.into_result(profile),
        None => Err(errors),
    }
}

/// Validate an onboarding submission.
///
/// Same checks as [`validate_profile`], plus the target weight: optional and
/// range-checked, but required unless the goal is maintenance.
pub fn validate_onboarding(
    raw: &RawProfileInput,
    today: NaiveDate,
) -> Result<OnboardingProfile, FieldErrors> {
    let mut errors = FieldErrors::new();
    let profile = collect_profile(raw, today, &mut errors);

    let target_weight_kg = match raw.target_weight_kg.as_ref() {
        None | Some(Value::Null) => None,
        value => {
            let target = number_field(&mut errors, "target_weight_kg", "Target weight", value);
            if let Some(t) = target {
                check_weight(&mut errors, "target_weight_kg", "Target weight", t);
            }
            target
        }
    };

    let needs_target = raw
        .goal_type
        .as_deref()
        .and_then(|g| g.trim().parse::<GoalType>().ok())
        .is_some_and(|goal| goal != GoalType::Maintenance);
    if needs_target && raw.target_weight_kg.as_ref().map_or(true, Value::is_null) {
        errors.add("target_weight_kg", MSG_TARGET_REQUIRED);
    }

    match profile {
        Some(profile) => errors.into_result(OnboardingProfile {
            profile,
            target_weight_kg,
        }),
        None => Err(errors),
    }
}

/// Failure report for one profile of a batch
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub index: usize,
    pub errors: FieldErrors,
}

/// Validate a batch, returning reports for the failing entries only
pub fn validate_profiles(raws: &[RawProfileInput], today: NaiveDate) -> Vec<ValidationReport> {
    raws.iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            validate_profile(raw, today)
                .err()
                .map(|errors| ValidationReport { index, errors })
        })
        .collect()
}

// ============================================================================
// Profile update
// ============================================================================

/// Partial profile change; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, alias = "gender", skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<GoalType>,
    /// `None` keeps the current target, `Some(None)` (JSON `null`) clears it
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_weight_kg: Option<Option<f64>>,
}

/// Maps a present field to `Some`, so an explicit `null` survives as `Some(None)`
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

impl ProfileUpdate {
    /// Range-check the fields that are present
    pub fn validate(&self, today: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(w) = self.weight_kg {
            check_weight(&mut errors, "weight_kg", "Weight", w);
        }
        if let Some(h) = self.height_cm {
            check_height(&mut errors, h);
        }
        if let Some(date) = self.birth_date {
            check_birth_date(&mut errors, date, today);
        }
        if let Some(Some(t)) = self.target_weight_kg {
            check_weight(&mut errors, "target_weight_kg", "Target weight", t);
        }
        errors.into_result(())
    }

    /// Whether the update touches any input of the goal calculation
    pub fn needs_recalculation(&self) -> bool {
        self.weight_kg.is_some()
            || self.height_cm.is_some()
            || self.birth_date.is_some()
            || self.sex.is_some()
            || self.activity_level.is_some()
            || self.goal_type.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.needs_recalculation() && self.target_weight_kg.is_none()
    }

    /// Overlay the present fields on `current`
    pub fn apply_to(&self, current: &OnboardingProfile) -> OnboardingProfile {
        let base = &current.profile;
        OnboardingProfile {
            profile: ProfileInput {
                weight_kg: self.weight_kg.unwrap_or(base.weight_kg),
                height_cm: self.height_cm.unwrap_or(base.height_cm),
                birth_date: self.birth_date.unwrap_or(base.birth_date),
                sex: self.sex.unwrap_or(base.sex),
                activity_level: self.activity_level.unwrap_or(base.activity_level),
                goal_type: self.goal_type.unwrap_or(base.goal_type),
            },
            target_weight_kg: self.target_weight_kg.unwrap_or(current.target_weight_kg),
        }
    }
}

// ============================================================================
// Weight entry
// ============================================================================

/// Weight log submission as received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightEntryInput {
    #[serde(default)]
    pub weight: Option<Value>,
    /// RFC 3339 timestamp; the current time when absent
    #[serde(default)]
    pub recorded_at: Option<String>,
    #[serde(default)]
    pub data_source: Option<String>,
}

impl WeightEntryInput {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<WeightEntry, FieldErrors> {
        let mut errors = FieldErrors::new();

        let weight_kg = number_field(&mut errors, "weight", "Weight", self.weight.as_ref());
        if let Some(w) = weight_kg {
            check_weight(&mut errors, "weight", "Weight", w);
        }

        let recorded_at = match self.recorded_at.as_deref().map(str::trim) {
            None | Some("") => Some(now),
            Some(text) => match DateTime::parse_from_rfc3339(text) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(_) => {
                    errors.add("recorded_at", MSG_INVALID_DATE);
                    None
                }
            },
        };

        let data_source = match self.data_source.as_deref().map(str::trim) {
            None | Some("") => Some(DataSource::default()),
            Some(text) => match text.parse::<DataSource>() {
                Ok(source) => Some(source),
                Err(_) => {
                    errors.add("data_source", MSG_DATA_SOURCE);
                    None
                }
            },
        };

        match (weight_kg, recorded_at, data_source) {
            (Some(weight_kg), Some(recorded_at), Some(data_source)) => {
                errors.into_result(WeightEntry {
                    weight_kg,
                    recorded_at,
                    data_source,
                    bmi: None,
                })
            }
            _ => Err(errors),
        }
    }
}
