//! Client-side caches between the presentation layer and the API.
//!
//! Each store is a cheap-to-clone handle on shared state.  Actions suspend at
//! the network call and then replace state unconditionally; concurrent calls
//! are not coordinated, so the last response to resolve wins.

use std::sync::{Arc, RwLock};

mod session;
mod content;
mod profile;
pub use self::{
  session::*,
  content::*,
  profile::*,
};

/// Shared, last-write-wins state cell.
#[derive(Debug)]
pub(crate) struct StateCell<S> {
  inner: Arc<RwLock<S>>,
}

impl<S> Clone for StateCell<S> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
    }
  }
}

impl<S: Clone> StateCell<S> {
  pub(crate) fn new(state: S) -> Self {
    Self {
      inner: Arc::new(RwLock::new(state)),
    }
  }

  pub(crate) fn snapshot(&self) -> S {
    self.read(|s| s.clone())
  }

  pub(crate) fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
    let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
    f(&guard)
  }

  /// Never held across an `.await`.
  pub(crate) fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
    let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
    f(&mut guard)
  }
}
