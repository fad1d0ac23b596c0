//! Doctor and patient records.
//!
//! Both are users: a name, an email address and a [`Role`]. Rather than share a
//! base type, each record carries the role as an ordinary field that is fixed
//! by the record type. A payload naming a different role is rejected, so a
//! patient update can never turn the record into a doctor.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, service::Resource};

// ─── Role ────────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Patient,
  Doctor,
  Admin,
}

/// Accept `supplied` only if it agrees with the role fixed by the record type.
fn check_role(expected: Role, supplied: Option<Role>) -> Result<()> {
  match supplied {
    Some(role) if role != expected => Err(Error::Validation(format!(
      "role must be '{expected}', got '{role}'"
    ))),
    _ => Ok(()),
  }
}

// ─── Email ───────────────────────────────────────────────────────────────────

/// A syntactically valid email address.
///
/// Only the shape is checked: one `@`, a dot-atom local part, and a dotted
/// domain of letters, digits and hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for Email {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> {
    if is_valid_email(&value) {
      Ok(Self(value))
    } else {
      Err(Error::Validation(format!("{value:?} is not a valid email address")))
    }
  }
}

impl TryFrom<&str> for Email {
  type Error = Error;

  fn try_from(value: &str) -> Result<Self> { Self::try_from(value.to_owned()) }
}

impl From<Email> for String {
  fn from(email: Email) -> Self { email.0 }
}

impl std::fmt::Display for Email {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

const LOCAL_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~";

fn is_valid_email(s: &str) -> bool {
  let Some((local, domain)) = s.split_once('@') else {
    return false;
  };
  if local.is_empty() || local.len() > 64 || domain.len() > 255 {
    return false;
  }

  let local_ok = local.split('.').all(|atom| {
    !atom.is_empty()
      && atom
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || LOCAL_SPECIALS.contains(c))
  });

  let labels: Vec<&str> = domain.split('.').collect();
  let domain_ok = labels.len() >= 2
    && labels.iter().all(|label| {
      !label.is_empty()
        && label.len() <= 63
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

  local_ok && domain_ok
}

// ─── Doctor ──────────────────────────────────────────────────────────────────

fn doctor_role() -> Role { Role::Doctor }

fn patient_role() -> Role { Role::Patient }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
  pub id:    String,
  pub name:  String,
  pub email: Email,
  #[serde(default = "doctor_role")]
  pub role:  Role,
}

/// Input to `DoctorService::create`. The role may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDoctor {
  pub name:  String,
  pub email: Email,
  #[serde(default = "doctor_role")]
  pub role:  Role,
}

impl NewDoctor {
  pub fn new(name: impl Into<String>, email: Email) -> Self {
    Self {
      name: name.into(),
      email,
      role: Role::Doctor,
    }
  }
}

/// Partial doctor for merge updates; only present fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<Email>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:  Option<Role>,
}

impl Resource for Doctor {
  type Create = NewDoctor;
  type Update = DoctorUpdate;

  const COLLECTION: &'static str = "doctors";
  const KIND: &'static str = "doctor";

  fn check_create(payload: &NewDoctor) -> Result<()> {
    check_role(Role::Doctor, Some(payload.role))
  }

  fn check_update(payload: &DoctorUpdate) -> Result<()> {
    check_role(Role::Doctor, payload.role)
  }
}

// ─── Patient ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
  pub id:        String,
  pub name:      String,
  pub email:     Email,
  #[serde(default = "patient_role")]
  pub role:      Role,
  /// The treating doctor. Not checked against the doctors collection.
  #[serde(rename = "doctorId")]
  pub doctor_id: String,
}

/// Input to `PatientService::create`. The role may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
  pub name:      String,
  pub email:     Email,
  #[serde(default = "patient_role")]
  pub role:      Role,
  #[serde(rename = "doctorId")]
  pub doctor_id: String,
}

impl NewPatient {
  pub fn new(
    name: impl Into<String>,
    email: Email,
    doctor_id: impl Into<String>,
  ) -> Self {
    Self {
      name: name.into(),
      email,
      role: Role::Patient,
      doctor_id: doctor_id.into(),
    }
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:     Option<Email>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:      Option<Role>,
  #[serde(
    default,
    rename = "doctorId",
    skip_serializing_if = "Option::is_none"
  )]
  pub doctor_id: Option<String>,
}

impl Resource for Patient {
  type Create = NewPatient;
  type Update = PatientUpdate;

  const COLLECTION: &'static str = "patients";
  const KIND: &'static str = "patient";

  fn check_create(payload: &NewPatient) -> Result<()> {
    check_role(Role::Patient, Some(payload.role))
  }

  fn check_update(payload: &PatientUpdate) -> Result<()> {
    check_role(Role::Patient, payload.role)
  }
}
