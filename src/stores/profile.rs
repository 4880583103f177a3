use log::*;

use std::collections::HashMap;

use crate::error::*;
use crate::forms::ProfileOut;
use crate::http::ApiClient;
use crate::models::User;

use super::StateCell;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileState {
  pub profiles: HashMap<String, User>,
  pub is_loading: bool,
  pub error: Option<String>,
}

/// Profiles by username, including follow state.  Entries always hold the
/// last server response for that username.
#[derive(Clone)]
pub struct ProfileStore {
  client: ApiClient,
  state: StateCell<ProfileState>,
}

impl ProfileStore {
  pub fn new(client: ApiClient) -> Self {
    Self {
      client,
      state: StateCell::new(ProfileState::default()),
    }
  }

  pub fn snapshot(&self) -> ProfileState {
    self.state.snapshot()
  }

  pub fn profile(&self, username: &str) -> Option<User> {
    self.state.read(|s| s.profiles.get(username).cloned())
  }

  pub fn is_loading(&self) -> bool {
    self.state.read(|s| s.is_loading)
  }

  pub fn error(&self) -> Option<String> {
    self.state.read(|s| s.error.clone())
  }

  pub fn clear_error(&self) {
    self.state.update(|s| s.error = None);
  }

  pub async fn get_profile(&self, username: &str) -> Result<User> {
    self.begin();
    let res = self.client.get::<User>(&["api", "users", username], Vec::new()).await;
    self.settle(username, res, "Failed to fetch user profile")
  }

  pub async fn follow(&self, username: &str) -> Result<User> {
    self.begin();
    let res = self.client.post_empty::<ProfileOut>(&["api", "users", username, "follow"]).await
      .map(|out| out.profile);
    self.settle(username, res, "Failed to follow user")
  }

  pub async fn unfollow(&self, username: &str) -> Result<User> {
    self.begin();
    let res = self.client.delete::<ProfileOut>(&["api", "users", username, "follow"]).await
      .map(|out| out.profile);
    self.settle(username, res, "Failed to unfollow user")
  }

  fn begin(&self) {
    self.state.update(|s| {
      s.is_loading = true;
      s.error = None;
    });
  }

  /// Upsert the server's profile, or record the failure.
  fn settle(&self, username: &str, res: Result<User>, fallback: &str) -> Result<User> {
    match res {
      Ok(user) => {
        debug!("profile {:?}: following={:?}", username, user.following);
        self.state.update(|s| {
          s.profiles.insert(username.to_string(), user.clone());
          s.is_loading = false;
        });
        Ok(user)
      },
      Err(err) => {
        warn!("{}: {}", fallback, err);
        let message = err.display_message(fallback);
        self.state.update(|s| {
          s.is_loading = false;
          s.error = Some(message);
        });
        Err(err)
      },
    }
  }
}
