use serde_json::Value as JsonValue;

use thiserror::Error;

use crate::forms::ApiError;

#[derive(Error, Debug)]
pub enum Error {
  // 401, 403
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  // 404
  #[error("not found: {0}")]
  NotFound(String),

  // 400, 409, 422
  #[error("validation failed: {}", .0.message)]
  Validation(ApiError),

  // any other non-2xx status
  #[error("http error {status}: {message}")]
  Http {
    status: u16,
    message: String,
  },

  // 2xx with `success: false`
  #[error("api error: {}", .0.message)]
  Api(ApiError),

  #[error("response carried no data")]
  MissingData,

  #[error("no token received")]
  MissingToken,

  #[error("request timed out")]
  Timeout,

  #[error("transport error: {0}")]
  Transport(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  // Json error
  #[error("Json error: {source}")]
  JsonError {
    #[from]
    source: serde_json::Error,
  },

  #[error("std io error: {source}")]
  IOError {
    #[from]
    source: std::io::Error,
  },

  #[error("config error: {source}")]
  ConfigError {
    #[from]
    source: config::ConfigError,
  },

  #[error(transparent)]
  Other(#[from] anyhow::Error),
}

impl From<reqwest::Error> for Error {
  fn from(err: reqwest::Error) -> Self {
    if err.is_timeout() {
      Error::Timeout
    } else {
      Error::Transport(err.to_string())
    }
  }
}

impl Error {
  /// Build an error from a non-2xx status and whatever error payload the
  /// server sent back.  `fallback` is used when there is no payload.
  pub fn from_status(status: u16, payload: Option<ApiError>, fallback: String) -> Self {
    let message = payload.as_ref()
      .map(|err| err.message.clone())
      .unwrap_or(fallback);
    match status {
      401 | 403 => Error::Unauthorized(message),
      404 => Error::NotFound(message),
      400 | 409 | 422 => {
        Error::Validation(payload.unwrap_or_else(|| ApiError {
          code: format!("HTTP_{}", status),
          message,
          details: None,
        }))
      },
      _ => Error::Http { status, message },
    }
  }

  /// Message the server attached to this error, if any.
  pub fn api_message(&self) -> Option<&str> {
    let message = match self {
      Error::Validation(err) | Error::Api(err) => err.message.as_str(),
      Error::Unauthorized(message) | Error::NotFound(message) => message.as_str(),
      Error::Http { message, .. } => message.as_str(),
      _ => return None,
    };
    if message.is_empty() {
      None
    } else {
      Some(message)
    }
  }

  /// Field level validation details, when the server sent them.
  pub fn details(&self) -> Option<&JsonValue> {
    match self {
      Error::Validation(err) | Error::Api(err) => err.details.as_ref(),
      _ => None,
    }
  }

  /// Human readable message for display, falling back to `fallback`.
  pub fn display_message(&self, fallback: &str) -> String {
    self.api_message().unwrap_or(fallback).to_string()
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Error::NotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
