use std::future::Future;

use crate::error::*;

/// Follow/favorite flag as shown to the user.
///
/// `begin` flips the displayed value before the request is sent; `settle`
/// drops the optimistic value again and takes whatever the server said, or
/// keeps the old server value when the request failed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OptimisticFlag {
  server: bool,
  pending: Option<bool>,
}

impl OptimisticFlag {
  pub fn new(server: bool) -> Self {
    Self {
      server,
      pending: None,
    }
  }

  pub fn displayed(&self) -> bool {
    self.pending.unwrap_or(self.server)
  }

  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// Show the toggled value.  Returns the value the request should set.
  pub fn begin(&mut self) -> bool {
    let target = !self.displayed();
    self.pending = Some(target);
    target
  }

  pub fn settle(&mut self, server: Option<bool>) {
    if let Some(server) = server {
      self.server = server;
    }
    self.pending = None;
  }

  /// Toggle around `action`, which gets the target value and resolves to the
  /// server's new value.  A second toggle while one is pending is ignored.
  pub async fn toggle<F, Fut>(&mut self, action: F) -> Result<bool>
  where
    F: FnOnce(bool) -> Fut,
    Fut: Future<Output = Result<bool>>,
  {
    if self.is_pending() {
      return Ok(self.displayed());
    }
    let target = self.begin();
    match action(target).await {
      Ok(server) => {
        self.settle(Some(server));
        Ok(server)
      },
      Err(err) => {
        self.settle(None);
        Err(err)
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shows_pending_value_until_settled() {
    let mut flag = OptimisticFlag::new(false);
    assert!(flag.begin());
    assert!(flag.displayed());
    assert!(flag.is_pending());

    flag.settle(Some(true));
    assert!(flag.displayed());
    assert!(!flag.is_pending());
  }

  #[test]
  fn reverts_when_request_fails() {
    let mut flag = OptimisticFlag::new(true);
    assert!(!flag.begin());
    assert!(!flag.displayed());
    flag.settle(None);
    assert!(flag.displayed());
  }

  #[tokio::test]
  async fn toggle_takes_server_value() {
    let mut flag = OptimisticFlag::new(false);
    let res = flag.toggle(|target| async move { Ok(target) }).await.unwrap();
    assert!(res);
    assert_eq!(flag, OptimisticFlag::new(true));
  }

  #[tokio::test]
  async fn toggle_reverts_on_error() {
    let mut flag = OptimisticFlag::new(false);
    let res = flag.toggle(|_| async { Err(Error::Timeout) }).await;
    assert!(matches!(res, Err(Error::Timeout)));
    assert_eq!(flag, OptimisticFlag::new(false));
  }
}
