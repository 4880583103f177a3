#![allow(dead_code)]

use std::sync::Arc;

use fast_realworld_client::app::AppContext;
use fast_realworld_client::http::{ApiClient, MemoryStorage, TokenStorage};
use fast_realworld_client::mock::MockConduit;

pub const PASSWORD: &str = "correct horse";

pub struct Harness {
  pub ctx: AppContext,
  pub server: Arc<MockConduit>,
  pub storage: Arc<MemoryStorage>,
}

impl Harness {
  pub fn new() -> Self {
    let server = Arc::new(MockConduit::new());
    let storage = Arc::new(MemoryStorage::new());
    let client = ApiClient::new(server.clone(), storage.clone());
    Self {
      ctx: AppContext::new(client),
      server,
      storage,
    }
  }

  /// Harness with users jake and anna, jake logged in.
  pub async fn logged_in() -> Self {
    let harness = Self::new();
    harness.server.seed_user("jake", "jake@jake.jake", PASSWORD);
    harness.server.seed_user("anna", "anna@example.com", PASSWORD);
    harness.ctx.session.login("jake@jake.jake", PASSWORD).await.unwrap();
    harness
  }

  pub fn stored_token(&self) -> Option<String> {
    self.storage.get_item("token").unwrap()
  }
}
