use crate::error::*;
use crate::http::ApiClient;
use crate::stores::{ContentStore, ProfileStore, SessionStore};

use super::AppConfig;

/// The stores of one application instance, built once and handed to
/// whatever presents them.  All three share one [`ApiClient`].
#[derive(Clone)]
pub struct AppContext {
  pub client: ApiClient,
  pub session: SessionStore,
  pub content: ContentStore,
  pub profiles: ProfileStore,
}

impl AppContext {
  pub fn new(client: ApiClient) -> Self {
    Self {
      session: SessionStore::new(client.clone()),
      content: ContentStore::new(client.clone()),
      profiles: ProfileStore::new(client.clone()),
      client,
    }
  }

  pub fn from_config(config: &AppConfig) -> Result<Self> {
    Ok(Self::new(ApiClient::from_config(config)?))
  }
}
