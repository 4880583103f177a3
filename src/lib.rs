//! Client for the Conduit blogging API: a session cache, a content cache and
//! a profile cache sharing one token-carrying HTTP client.

pub mod error;
pub use error::Error;

mod util;

pub mod app;

pub mod forms;

pub mod models;

pub mod http;

pub mod stores;

#[cfg(feature = "mock")]
pub mod mock;
