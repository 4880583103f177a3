use serde::{Deserialize, Serialize};

use crate::models::User;

/// Form fields posted to `/login`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginUser {
  pub email: String,
  pub password: String,
}

impl LoginUser {
  pub fn to_form(&self) -> Vec<(String, String)> {
    vec![
      ("email".to_string(), self.email.clone()),
      ("password".to_string(), self.password.clone()),
    ]
  }
}

/// Raw reply of `/login`; it is not wrapped in an envelope.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
  #[serde(default)]
  pub success: bool,
  pub message: Option<String>,
  pub token: Option<String>,
  pub token_type: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterUser {
  pub username: String,
  pub email: String,
  pub password: String,
}

impl RegisterUser {
  pub fn login(&self) -> LoginUser {
    LoginUser {
      email: self.email.clone(),
      password: self.password.clone(),
    }
  }
}

/// Partial update of the current user; only set fields are sent.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateUser {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub username: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub password: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bio: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
}

impl UpdateUser {
  /// Keep only the fields that differ from `current`.  A password is always
  /// kept when present.
  pub fn changes_from(self, current: &User) -> UpdateUser {
    fn changed(new: Option<String>, old: Option<&str>) -> Option<String> {
      new.filter(|new| Some(new.as_str()) != old)
    }
    UpdateUser {
      username: changed(self.username, Some(&current.username)),
      email: changed(self.email, Some(&current.email)),
      password: self.password.filter(|p| !p.is_empty()),
      bio: changed(self.bio, Some(current.bio.as_deref().unwrap_or(""))),
      image: changed(self.image, Some(current.image.as_deref().unwrap_or(""))),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.username.is_none() && self.email.is_none() && self.password.is_none()
      && self.bio.is_none() && self.image.is_none()
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileOut {
  pub profile: User,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn update_keeps_only_changed_fields() {
    let current = User {
      id: 1,
      username: "jake".to_string(),
      email: "jake@jake.jake".to_string(),
      bio: None,
      ..Default::default()
    };
    let update = UpdateUser {
      username: Some("jake".to_string()),
      email: Some("jacob@jake.jake".to_string()),
      bio: Some(String::new()),
      password: Some(String::new()),
      ..Default::default()
    }.changes_from(&current);

    assert_eq!(update, UpdateUser {
      email: Some("jacob@jake.jake".to_string()),
      ..Default::default()
    });
    assert_eq!(serde_json::to_value(&update).unwrap(), serde_json::json!({
      "email": "jacob@jake.jake",
    }));
  }

  #[test]
  fn unchanged_update_is_empty() {
    let current = User {
      username: "jake".to_string(),
      ..Default::default()
    };
    let update = UpdateUser {
      username: Some("jake".to_string()),
      ..Default::default()
    }.changes_from(&current);
    assert!(update.is_empty());
  }
}
