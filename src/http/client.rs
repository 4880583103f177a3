use log::*;

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::app::AppConfig;
use crate::error::*;
use crate::forms::{ApiError, Envelope};
use crate::util::body_preview;

use super::{
  ApiRequest, FileStorage, HttpTransport, Method, RawResponse, RequestBody, TokenStorage,
  Transport, TOKEN_KEY,
};

/// Default API base when none is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8080";

/// Default location of the durable token storage.
pub const DEFAULT_STORAGE_PATH: &str = ".conduit/storage.json";

/// Client shared by all stores.
///
/// The bearer token is read from storage on every request, so a token written
/// by `login` is picked up by the very next call from any store.
#[derive(Clone)]
pub struct ApiClient {
  transport: Arc<dyn Transport>,
  storage: Arc<dyn TokenStorage>,
}

impl ApiClient {
  pub fn new(transport: Arc<dyn Transport>, storage: Arc<dyn TokenStorage>) -> Self {
    Self {
      transport,
      storage,
    }
  }

  /// Build a reqwest backed client with file storage from `api.*` and
  /// `storage.*` config keys.
  pub fn from_config(config: &AppConfig) -> Result<Self> {
    let base_url = config.get_str("api.base_url")?
      .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    let timeout = config.get_int("api.timeout_ms")?
      .filter(|ms| *ms > 0)
      .map(|ms| Duration::from_millis(ms as u64));
    let storage_path = config.get_path("storage.path")?
      .unwrap_or_else(|| DEFAULT_STORAGE_PATH.into());
    info!("ApiClient: base={} timeout={:?} storage={}", base_url, timeout, storage_path.display());

    let transport = HttpTransport::new(&base_url, timeout)?;
    Ok(Self::new(Arc::new(transport), Arc::new(FileStorage::new(storage_path))))
  }

  pub fn token(&self) -> Result<Option<String>> {
    Ok(self.storage.get_item(TOKEN_KEY)?.filter(|t| !t.is_empty()))
  }

  pub fn set_token(&self, token: &str) -> Result<()> {
    self.storage.set_item(TOKEN_KEY, token)
  }

  pub fn clear_token(&self) -> Result<()> {
    self.storage.remove_item(TOKEN_KEY)
  }

  pub async fn get<T: DeserializeOwned>(&self, path: &[&str], query: Vec<(String, String)>) -> Result<T> {
    let mut request = ApiRequest::new(Method::GET, path);
    request.query = query;
    self.fetch_data(request).await
  }

  pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &[&str], body: &B) -> Result<T> {
    let mut request = ApiRequest::new(Method::POST, path);
    request.body = RequestBody::Json(serde_json::to_value(body)?);
    self.fetch_data(request).await
  }

  /// POST without a body.
  pub async fn post_empty<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T> {
    self.fetch_data(ApiRequest::new(Method::POST, path)).await
  }

  pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &[&str], body: &B) -> Result<T> {
    let mut request = ApiRequest::new(Method::PUT, path);
    request.body = RequestBody::Json(serde_json::to_value(body)?);
    self.fetch_data(request).await
  }

  pub async fn delete<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T> {
    self.fetch_data(ApiRequest::new(Method::DELETE, path)).await
  }

  /// POST a form-encoded body and decode the reply as-is (no envelope).
  pub async fn post_form<T: DeserializeOwned>(&self, path: &[&str], fields: Vec<(String, String)>) -> Result<T> {
    let mut request = ApiRequest::new(Method::POST, path);
    request.body = RequestBody::Form(fields);
    let response = self.execute(request).await?;
    Ok(serde_json::from_slice(&response.body)?)
  }

  async fn fetch_data<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
    let response = self.execute(request).await?;
    let envelope: Envelope<T> = serde_json::from_slice(&response.body)?;
    if !envelope.success {
      let message = envelope.message;
      let err = envelope.error.unwrap_or_else(|| ApiError {
        message: message.unwrap_or_default(),
        ..Default::default()
      });
      return Err(Error::Api(err));
    }
    envelope.data.ok_or(Error::MissingData)
  }

  async fn execute(&self, mut request: ApiRequest) -> Result<RawResponse> {
    request.bearer = self.token()?;
    let method = request.method.clone();
    let path = request.path();
    debug!("{} {} auth={}", method, path, request.bearer.is_some());

    let response = self.transport.send(request).await?;
    if response.is_success() {
      return Ok(response);
    }
    debug!("{} {} -> status {}", method, path, response.status);
    Err(error_from_response(&response))
  }
}

/// Map a non-2xx response onto the error taxonomy.  The body may be an
/// envelope, something else, or not JSON at all.
fn error_from_response(response: &RawResponse) -> Error {
  let payload = serde_json::from_slice::<Envelope<serde_json::Value>>(&response.body)
    .ok()
    .and_then(|envelope| envelope.error)
    .filter(|err: &ApiError| !err.message.is_empty());
  let preview = body_preview(&response.body);
  let fallback = if preview.is_empty() {
    format!("status {}", response.status)
  } else {
    format!("status {}: {}", response.status, preview)
  };
  Error::from_status(response.status, payload, fallback)
}
