use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub mod user;
pub mod article;
pub mod comment;
pub use self::{
  user::*,
  article::*,
  comment::*,
};

/// Structured error payload of the API envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
  pub code: String,
  pub message: String,
  pub details: Option<JsonValue>,
}

/// Envelope wrapping every `/api/**` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
  #[serde(default)]
  pub success: bool,
  #[serde(default = "Option::default")]
  pub data: Option<T>,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub error: Option<ApiError>,
}

impl<T> Envelope<T> {
  pub fn success(data: T) -> Self {
    Envelope {
      success: true,
      data: Some(data),
      message: None,
      error: None,
    }
  }

  pub fn error(code: &str, message: &str) -> Self {
    Envelope {
      success: false,
      data: None,
      message: None,
      error: Some(ApiError {
        code: code.to_string(),
        message: message.to_string(),
        details: None,
      }),
    }
  }
}
