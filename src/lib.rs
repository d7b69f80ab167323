//! Nutri Goals - Deterministic engine for personalised daily nutrition goals
//!
//! Turns a validated physical profile into a daily calorie budget and macro
//! split through a fixed pipeline: age → BMR (Mifflin-St Jeor) → TDEE →
//! goal-adjusted, clamped calorie goal → macro split with a protein floor.
//! BMI, its category and the ideal weight range are computed alongside.
//!
//! ## Modules
//!
//! - **Engine**: `energy`, `macros`, `body`, composed by `pipeline`
//! - **Boundary**: `validation` for raw input, `encoder` for report payloads
//! - **Tracking**: `progress` for weight history, `analytics` for meal logs

pub mod analytics;
pub mod body;
pub mod config;
pub mod constants;
pub mod encoder;
pub mod energy;
pub mod error;
pub mod macros;
pub mod pipeline;
pub mod progress;
pub mod types;
pub mod units;
pub mod validation;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::EngineConfig;
pub use error::ComputeError;
pub use macros::RemainderPolicy;
pub use pipeline::{calculate_nutrition_goals, profile_json_to_goals, GoalsCalculator};
pub use types::{
    ActivityLevel, BmiCategory, GoalType, NutritionGoals, ProfileInput, Sex, WeightRange,
};
pub use validation::{validate_profile, FieldErrors, RawProfileInput};

/// Engine version embedded in all report payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "nutri-goals";
