//! User: identity plus profile fields.
//!
//! Secrets (password hash, verification and reset codes) live in
//! [`Account`](crate::store::Account) and are never serialised.

use serde::{Deserialize, Serialize};

/// Server-assigned row id for every entity.
pub type Id = i64;

/// A registered member as seen by other members and by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:              Id,
  pub email:           String,
  #[serde(default)]
  pub email_verified:  bool,
  pub first_name:      Option<String>,
  pub last_name:       Option<String>,
  pub company:         Option<String>,
  pub position:        Option<String>,
  pub location:        Option<String>,
  pub profile_picture: Option<String>,
  #[serde(default)]
  pub profile_complete: bool,
}

impl User {
  /// A fresh, unverified user with an empty profile.
  pub fn new(id: Id, email: impl Into<String>) -> Self {
    Self {
      id,
      email: email.into(),
      email_verified: false,
      first_name: None,
      last_name: None,
      company: None,
      position: None,
      location: None,
      profile_picture: None,
      profile_complete: false,
    }
  }

  /// Whether every field counted towards profile completion is set.
  pub fn compute_profile_complete(&self) -> bool {
    [
      &self.first_name,
      &self.last_name,
      &self.company,
      &self.position,
      &self.location,
    ]
    .iter()
    .all(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
  }

  /// `"First Last"`, falling back to the email address.
  pub fn display_name(&self) -> String {
    match (self.first_name.as_deref(), self.last_name.as_deref()) {
      (Some(first), Some(last)) => format!("{first} {last}"),
      (Some(name), None) | (None, Some(name)) => name.to_owned(),
      (None, None) => self.email.clone(),
    }
  }

  /// `"Position at Company"` when both are known.
  pub fn headline(&self) -> Option<String> {
    match (self.position.as_deref(), self.company.as_deref()) {
      (Some(position), Some(company)) => Some(format!("{position} at {company}")),
      (Some(only), None) | (None, Some(only)) => Some(only.to_owned()),
      (None, None) => None,
    }
  }
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
  pub first_name:      Option<String>,
  pub last_name:       Option<String>,
  pub company:         Option<String>,
  pub position:        Option<String>,
  pub location:        Option<String>,
  pub profile_picture: Option<String>,
}

impl ProfileUpdate {
  /// Apply the set fields to `user` and recompute completion.
  pub fn apply(self, user: &mut User) {
    if let Some(v) = self.first_name {
      user.first_name = Some(v);
    }
    if let Some(v) = self.last_name {
      user.last_name = Some(v);
    }
    if let Some(v) = self.company {
      user.company = Some(v);
    }
    if let Some(v) = self.position {
      user.position = Some(v);
    }
    if let Some(v) = self.location {
      user.location = Some(v);
    }
    if let Some(v) = self.profile_picture {
      user.profile_picture = Some(v);
    }
    user.profile_complete = user.compute_profile_complete();
  }
}
