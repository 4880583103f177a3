//! HTTP plumbing shared by every store: the request transport, the durable
//! token storage and the [`ApiClient`] that ties them together.

mod client;
mod storage;
mod transport;
pub use self::{
  client::*,
  storage::*,
  transport::*,
};
