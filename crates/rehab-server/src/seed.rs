//! Development seeding: wipe the collections and load a small fixture set of
//! doctors, patients, exercise presets and synthetic sessions.
//!
//! Fixtures are written at fixed ids so a second run overwrites rather than
//! duplicates them. Never run this against data you want to keep.

use std::f64::consts::TAU;

use chrono::{SecondsFormat, TimeDelta, Utc};
use rand_core::RngCore;
use rehab_core::{
  exercise::{ExercisePreset, JointAngles},
  service::{DEFAULT_RESET_BATCH, Resource, reset_collection, session::SESSIONS},
  session::Session,
  store::{DocumentStore, Fields},
  user::{Doctor, Email, Patient, Role},
};
use serde::Serialize;
use serde_json::Value;

/// How many documents of each kind a seed run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
  pub doctors:  usize,
  pub patients: usize,
  pub presets:  usize,
  pub sessions: usize,
}

/// A cosine sweep from `max` down to `min` and back over `len` samples, with
/// uniform noise of up to `noise` degrees, rounded to two decimals.
pub fn generate_angles(
  rng: &mut impl RngCore,
  len: usize,
  min: f64,
  max: f64,
  noise: f64,
) -> Vec<f64> {
  (0..len)
    .map(|i| {
      let progress = i as f64 / len as f64;
      let base = min + (max - min) * (0.5 + 0.5 * (progress * TAU).cos());
      let jitter = (unit(rng) * 2.0 - 1.0) * noise;
      ((base + jitter) * 100.0).round() / 100.0
    })
    .collect()
}

/// Uniform in `[0, 1]`.
fn unit(rng: &mut impl RngCore) -> f64 { f64::from(rng.next_u32()) / f64::from(u32::MAX) }

fn email(address: &str) -> anyhow::Result<Email> { Ok(Email::try_from(address)?) }

fn doctors() -> anyhow::Result<Vec<Doctor>> {
  Ok(vec![
    Doctor {
      id:    "doc1".into(),
      name:  "Dr. Evelyn Reed".into(),
      email: email("e.reed@clinic.com")?,
      role:  Role::Doctor,
    },
    Doctor {
      id:    "doc2".into(),
      name:  "Dr. Samuel Chen".into(),
      email: email("s.chen@clinic.com")?,
      role:  Role::Doctor,
    },
  ])
}

fn patients() -> anyhow::Result<Vec<Patient>> {
  let patient = |id: &str, name: &str, address: &str, doctor: &str| {
    Ok(Patient {
      id:        id.into(),
      name:      name.into(),
      email:     email(address)?,
      role:      Role::Patient,
      doctor_id: doctor.into(),
    })
  };
  [
    ("pat1", "John Doe", "j.doe@email.com", "doc1"),
    ("pat2", "Jane Smith", "j.smith@email.com", "doc1"),
    ("pat3", "Peter Jones", "p.jones@email.com", "doc2"),
  ]
  .into_iter()
  .map(|(id, name, address, doctor)| patient(id, name, address, doctor))
  .collect()
}

fn presets(rng: &mut impl RngCore) -> Vec<ExercisePreset> {
  vec![
    ExercisePreset {
      id:             "ex1".into(),
      name:           "Bicep Curls".into(),
      description:    "Perform bicep curls with dumbbells.".into(),
      duration:       30,
      benchmark_data: JointAngles {
        left_elbow:  generate_angles(rng, 30, 0.0, 90.0, 10.0),
        right_elbow: generate_angles(rng, 30, 0.0, 90.0, 10.0),
        left_knee:   generate_angles(rng, 30, 0.0, 10.0, 5.0),
        right_knee:  generate_angles(rng, 30, 0.0, 10.0, 5.0),
      },
    },
    ExercisePreset {
      id:             "ex2".into(),
      name:           "Squats".into(),
      description:    "Perform squats.".into(),
      duration:       45,
      benchmark_data: JointAngles {
        left_elbow:  generate_angles(rng, 45, 0.0, 10.0, 5.0),
        right_elbow: generate_angles(rng, 45, 0.0, 10.0, 5.0),
        left_knee:   generate_angles(rng, 45, 90.0, 140.0, 5.0),
        right_knee:  generate_angles(rng, 45, 90.0, 140.0, 5.0),
      },
    },
  ]
}

/// One session per patient and preset, a day apart, starting ten days ago.
fn sessions(
  rng: &mut impl RngCore,
  patients: &[Patient],
  presets: &[ExercisePreset],
) -> Vec<Session> {
  let start = Utc::now() - TimeDelta::days(10);
  let mut out = Vec::with_capacity(patients.len() * presets.len());

  for (i, patient) in (1..).zip(patients) {
    for (j, preset) in (1..).zip(presets) {
      let len = preset.duration as usize;
      out.push(Session {
        id:                 format!("ses{i}{j}"),
        patient_id:         patient.id.clone(),
        doctor_id:          patient.doctor_id.clone(),
        date:               (start + TimeDelta::days(i + j))
          .to_rfc3339_opts(SecondsFormat::Secs, true),
        angles:             JointAngles {
          left_elbow:  generate_angles(rng, len, 0.0, 90.0, 15.0),
          right_elbow: generate_angles(rng, len, 0.0, 90.0, 15.0),
          left_knee:   generate_angles(rng, len, 80.0, 140.0, 10.0),
          right_knee:  generate_angles(rng, len, 80.0, 140.0, 10.0),
        },
        exercise_preset_id: Some(preset.id.clone()),
      });
    }
  }
  out
}

fn fields_of<T: Serialize>(record: &T) -> anyhow::Result<Fields> {
  match serde_json::to_value(record)? {
    Value::Object(fields) => Ok(fields),
    other => anyhow::bail!("fixture did not serialise to an object: {other}"),
  }
}

/// Write `records` at their own ids, replacing whatever is there.
async fn insert_all<S, T>(
  store: &S,
  collection: &str,
  records: &[T],
  id_of: impl Fn(&T) -> &str,
) -> anyhow::Result<usize>
where
  S: DocumentStore,
  T: Serialize,
{
  for record in records {
    store.set(collection, id_of(record), fields_of(record)?, false).await?;
  }
  tracing::info!(collection, count = records.len(), "inserted fixtures");
  Ok(records.len())
}

/// Seed `store`. With `reset`, the four collections are emptied first;
/// otherwise fixtures are written alongside existing documents.
pub async fn seed<S: DocumentStore>(
  store: &S,
  reset: bool,
  rng: &mut impl RngCore,
) -> anyhow::Result<SeedSummary> {
  if reset {
    tracing::warn!("wiping collections before seeding");
    for collection in [
      Doctor::COLLECTION,
      Patient::COLLECTION,
      ExercisePreset::COLLECTION,
      SESSIONS,
    ] {
      reset_collection(store, collection, DEFAULT_RESET_BATCH).await?;
    }
  } else {
    tracing::info!("keeping existing documents");
  }

  let doctors = doctors()?;
  let patients = patients()?;
  let presets = presets(rng);
  let sessions = sessions(rng, &patients, &presets);

  let summary = SeedSummary {
    doctors:  insert_all(store, Doctor::COLLECTION, &doctors, |d| d.id.as_str()).await?,
    patients: insert_all(store, Patient::COLLECTION, &patients, |p| p.id.as_str()).await?,
    presets:  insert_all(store, ExercisePreset::COLLECTION, &presets, |p| p.id.as_str())
      .await?,
    sessions: insert_all(store, SESSIONS, &sessions, |s| s.id.as_str()).await?,
  };

  tracing::info!(?summary, "seeding complete");
  Ok(summary)
}
