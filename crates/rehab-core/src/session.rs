//! Exercise sessions: the recorded motion from one sitting.
//!
//! A session is an append-only clinical record: once written it is never
//! updated or deleted through the service layer.

use serde::{Deserialize, Serialize};

use crate::exercise::JointAngles;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  pub id:                 String,
  pub patient_id:         String,
  pub doctor_id:          String,
  /// ISO-8601 timestamp. Sessions sort on this string.
  pub date:               String,
  pub angles:             JointAngles,
  #[serde(default)]
  pub exercise_preset_id: Option<String>,
}

/// Input to `SessionService::create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
  pub patient_id:         String,
  pub doctor_id:          String,
  pub date:               String,
  pub angles:             JointAngles,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub exercise_preset_id: Option<String>,
}

impl NewSession {
  pub fn new(
    patient_id: impl Into<String>,
    doctor_id: impl Into<String>,
    date: impl Into<String>,
    angles: JointAngles,
  ) -> Self {
    Self {
      patient_id: patient_id.into(),
      doctor_id: doctor_id.into(),
      date: date.into(),
      angles,
      exercise_preset_id: None,
    }
  }
}
