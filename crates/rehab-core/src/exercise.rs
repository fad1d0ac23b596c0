//! Joint-angle series and exercise presets.

use serde::{Deserialize, Serialize};

use crate::service::Resource;

/// Four independent series of joint angles, in degrees, one sample per
/// capture tick. The series need not be the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointAngles {
  pub left_elbow:  Vec<f64>,
  pub right_elbow: Vec<f64>,
  pub left_knee:   Vec<f64>,
  pub right_knee:  Vec<f64>,
}

/// A named exercise with the reference motion a patient is measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePreset {
  pub id:             String,
  pub name:           String,
  pub description:    String,
  /// Seconds.
  pub duration:       u32,
  pub benchmark_data: JointAngles,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExercisePreset {
  pub name:           String,
  pub description:    String,
  pub duration:       u32,
  pub benchmark_data: JointAngles,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePresetUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub duration:       Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub benchmark_data: Option<JointAngles>,
}

impl Resource for ExercisePreset {
  type Create = NewExercisePreset;
  type Update = ExercisePresetUpdate;

  const COLLECTION: &'static str = "exercisePresets";
  const KIND: &'static str = "exercise preset";
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn joint_angles_use_camel_case_keys() {
    let angles = JointAngles {
      left_elbow: vec![10.5],
      ..Default::default()
    };
    assert_eq!(
      serde_json::to_value(angles).unwrap(),
      json!({
        "leftElbow": [10.5],
        "rightElbow": [],
        "leftKnee": [],
        "rightKnee": [],
      })
    );
  }

  #[test]
  fn negative_duration_is_rejected() {
    let result = serde_json::from_value::<NewExercisePreset>(json!({
      "name": "Squats",
      "description": "Perform squats.",
      "duration": -5,
      "benchmarkData": {
        "leftElbow": [], "rightElbow": [], "leftKnee": [], "rightKnee": []
      },
    }));
    assert!(result.is_err());
  }
}
