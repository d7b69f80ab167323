//! Goals report encoding
//!
//! Wraps a [`GoalComputation`] in a [`GoalsPayload`]: producer and provenance
//! metadata, the goal record, the intermediate values the record hides, and
//! the clamp/floor flags.

use crate::error::ComputeError;
use crate::types::{
    GoalComputation, GoalsDetails, GoalsPayload, GoalsProducer, GoalsProvenance,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const SCHEMA_VERSION: &str = "nutri.goals.v1";

/// Encoder for goal report payloads
#[derive(Debug, Clone)]
pub struct GoalsEncoder {
    instance_id: String,
}

impl Default for GoalsEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl GoalsEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn encode(&self, computation: &GoalComputation) -> Result<GoalsPayload, ComputeError> {
        let goals = &computation.goals;
        if !goals.current_bmi.is_finite() {
            return Err(ComputeError::EncodingError(format!(
                "non-finite BMI {}",
                goals.current_bmi
            )));
        }

        let producer = GoalsProducer {
            name: PRODUCER_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = GoalsProvenance {
            reference_date: computation.reference_date.format("%Y-%m-%d").to_string(),
            computed_at_utc: Utc::now().to_rfc3339(),
        };

        let details = GoalsDetails {
            unclamped_calorie_goal: computation.calories.unclamped,
            protein_from_ratio_g: computation.macros.protein_from_ratio_g,
            protein_floor_g: computation.macros.protein_floor_g,
            remaining_kcal: computation.macros.remaining_kcal,
        };

        let flags = computation
            .flags()
            .iter()
            .map(|f| f.as_str().to_string())
            .collect();

        Ok(GoalsPayload {
            schema_version: SCHEMA_VERSION.to_string(),
            producer,
            provenance,
            goals: goals.clone(),
            details,
            flags,
        })
    }

    /// Encode to pretty-printed JSON
    pub fn encode_to_json(&self, computation: &GoalComputation) -> Result<String, ComputeError> {
        let payload = self.encode(computation)?;
        serde_json::to_string_pretty(&payload).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}
