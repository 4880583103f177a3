use serde::{Deserialize, Serialize};

/// A platform user, as returned by the current-user and profile endpoints.
///
/// Whichever cache fetched a `User` owns that copy; the session's identity and
/// the profile cache's entry for the same username may disagree until the next
/// fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: i64,
  pub username: String,
  pub email: String,
  pub bio: Option<String>,
  pub image: Option<String>,
  /// Follow relationship relative to the viewer.
  pub following: Option<bool>,
  pub followers_count: Option<i64>,
  pub following_count: Option<i64>,
}

impl User {
  pub fn is_followed(&self) -> bool {
    self.following.unwrap_or(false)
  }

  /// Author snapshot of this user.
  pub fn to_profile(&self) -> Profile {
    Profile {
      username: self.username.clone(),
      bio: self.bio.clone(),
      image: self.image.clone(),
      following: self.following,
    }
  }
}

/// Denormalized author snapshot embedded in articles and comments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Profile {
  pub username: String,
  pub bio: Option<String>,
  pub image: Option<String>,
  pub following: Option<bool>,
}
