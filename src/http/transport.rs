use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde_json::Value as JsonValue;

pub use reqwest::Method;

use crate::error::*;

/// Request body, per endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
  Empty,
  Json(JsonValue),
  Form(Vec<(String, String)>),
}

/// A request relative to the API base.
///
/// The path is kept as raw segments; each one is percent-encoded on its own
/// when the URL is built, so a slug or username can never change the route.
#[derive(Debug, Clone)]
pub struct ApiRequest {
  pub method: Method,
  pub segments: Vec<String>,
  pub query: Vec<(String, String)>,
  /// Bearer token to send in the `Authorization` header.
  pub bearer: Option<String>,
  pub body: RequestBody,
}

impl ApiRequest {
  pub fn new(method: Method, segments: &[&str]) -> Self {
    Self {
      method,
      segments: segments.iter().map(|s| s.to_string()).collect(),
      query: Vec::new(),
      bearer: None,
      body: RequestBody::Empty,
    }
  }

  /// Unescaped path, for logs.
  pub fn path(&self) -> String {
    format!("/{}", self.segments.join("/"))
  }

  /// Value of a query parameter.
  pub fn query_param(&self, key: &str) -> Option<&str> {
    self.query.iter()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }

  /// Value of a form field.
  pub fn form_field(&self, key: &str) -> Option<&str> {
    match self.body {
      RequestBody::Form(ref fields) => fields.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str()),
      _ => None,
    }
  }
}

/// Status and body of a response, undecoded.
#[derive(Debug, Clone)]
pub struct RawResponse {
  pub status: u16,
  pub body: Vec<u8>,
}

impl RawResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// Sends requests to the remote API.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: ApiRequest) -> Result<RawResponse>;
}

/// Transport backed by a reqwest client.
pub struct HttpTransport {
  client: Client,
  base_url: Url,
}

impl HttpTransport {
  /// Without a `timeout` the client's default applies.
  pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
    let base_url = Url::parse(base_url)
      .map_err(|e| Error::BadRequest(format!("invalid api base url {:?}: {}", base_url, e)))?;
    if base_url.cannot_be_a_base() {
      return Err(Error::BadRequest(format!("invalid api base url {:?}", base_url.as_str())));
    }
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }
    Ok(Self {
      client: builder.build()?,
      base_url,
    })
  }

  fn url_for(&self, segments: &[String]) -> Result<Url> {
    let mut url = self.base_url.clone();
    url.path_segments_mut()
      .map_err(|_| Error::BadRequest(format!("api base url {} cannot take a path", self.base_url)))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
    let url = self.url_for(&request.segments)?;
    let mut builder = self.client
      .request(request.method, url)
      .header(ACCEPT, "application/json");
    if !request.query.is_empty() {
      builder = builder.query(&request.query);
    }
    if let Some(ref token) = request.bearer {
      builder = builder.bearer_auth(token);
    }
    builder = match request.body {
      RequestBody::Empty => builder,
      RequestBody::Json(ref body) => builder.json(body),
      RequestBody::Form(ref fields) => builder.form(fields),
    };

    let response = builder.send().await?;
    let status = response.status().as_u16();
    let body = response.bytes().await?.to_vec();
    Ok(RawResponse { status, body })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  fn segments(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
  }

  #[test]
  fn joins_paths_onto_base_without_double_slash() {
    let transport = HttpTransport::new("http://localhost:8080/", None).unwrap();
    let url = transport.url_for(&segments(&["api", "articles", "how-to-train"])).unwrap();
    assert_eq!(url.as_str(), "http://localhost:8080/api/articles/how-to-train");

    let transport = HttpTransport::new("http://example.com/conduit", None).unwrap();
    let url = transport.url_for(&segments(&["login"])).unwrap();
    assert_eq!(url.as_str(), "http://example.com/conduit/login");

    let transport = HttpTransport::new("http://example.com/conduit/", None).unwrap();
    let url = transport.url_for(&segments(&["login"])).unwrap();
    assert_eq!(url.as_str(), "http://example.com/conduit/login");
  }

  #[rstest]
  #[case::parent_dir("../articles", "http://localhost:8080/api/users/..%2Farticles")]
  #[case::query("ann?a", "http://localhost:8080/api/users/ann%3Fa")]
  #[case::fragment("a#b", "http://localhost:8080/api/users/a%23b")]
  #[case::slash("x/follow", "http://localhost:8080/api/users/x%2Ffollow")]
  fn escapes_each_segment(#[case] username: &str, #[case] expected: &str) {
    let transport = HttpTransport::new("http://localhost:8080", None).unwrap();
    let url = transport.url_for(&segments(&["api", "users", username])).unwrap();
    assert_eq!(url.as_str(), expected);
  }

  #[test]
  fn rejects_invalid_base_url() {
    assert!(matches!(
      HttpTransport::new("not a url", None),
      Err(Error::BadRequest(_))
    ));
  }

  #[test]
  fn reads_query_and_form_values() {
    let mut request = ApiRequest::new(Method::POST, &["login"]);
    request.query.push(("tag".to_string(), "rust".to_string()));
    request.body = RequestBody::Form(vec![("email".to_string(), "a@b.c".to_string())]);
    assert_eq!(request.query_param("tag"), Some("rust"));
    assert_eq!(request.query_param("author"), None);
    assert_eq!(request.form_field("email"), Some("a@b.c"));
    assert_eq!(request.path(), "/login");
  }
}
