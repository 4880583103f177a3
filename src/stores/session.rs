use log::*;

use crate::error::*;
use crate::forms::*;
use crate::http::ApiClient;
use crate::models::User;

use super::StateCell;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
  pub user: Option<User>,
  pub is_logged_in: bool,
  pub is_loading: bool,
}

/// Current user's identity and login flag.
///
/// Logged in only means a token is stored.  When the identity fetch after
/// login or restore fails the session stays logged in with no user; check
/// [`SessionStore::has_identity`] before relying on `user`.
#[derive(Clone)]
pub struct SessionStore {
  client: ApiClient,
  state: StateCell<SessionState>,
}

impl SessionStore {
  pub fn new(client: ApiClient) -> Self {
    Self {
      client,
      state: StateCell::new(SessionState::default()),
    }
  }

  pub fn snapshot(&self) -> SessionState {
    self.state.snapshot()
  }

  pub fn user(&self) -> Option<User> {
    self.state.read(|s| s.user.clone())
  }

  pub fn is_logged_in(&self) -> bool {
    self.state.read(|s| s.is_logged_in)
  }

  pub fn is_loading(&self) -> bool {
    self.state.read(|s| s.is_loading)
  }

  pub fn has_identity(&self) -> bool {
    self.state.read(|s| s.user.is_some())
  }

  /// Log in and fetch the current user.
  pub async fn login(&self, email: &str, password: &str) -> Result<()> {
    let login = LoginUser {
      email: email.to_string(),
      password: password.to_string(),
    };
    self.state.update(|s| s.is_loading = true);
    match self.authenticate(&login).await {
      Ok(user) => {
        info!("login: logged in as {:?}", user.as_ref().map(|u| u.username.as_str()));
        self.state.update(|s| {
          s.user = user;
          s.is_logged_in = true;
          s.is_loading = false;
        });
        Ok(())
      },
      Err(err) => {
        self.state.update(|s| s.is_loading = false);
        Err(err)
      },
    }
  }

  /// Create the account, then log in with the same credentials.
  pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
    let register = RegisterUser {
      username: username.to_string(),
      email: email.to_string(),
      password: password.to_string(),
    };
    self.state.update(|s| s.is_loading = true);
    if let Err(err) = self.client.post::<_, User>(&["api", "users"], &register).await {
      self.state.update(|s| s.is_loading = false);
      return Err(err);
    }
    info!("register: created {:?}", register.username);
    let login = register.login();
    self.login(&login.email, &login.password).await
  }

  /// Forget the token and identity.  No server call.
  pub fn logout(&self) -> Result<()> {
    let res = self.client.clear_token();
    self.state.update(|s| {
      s.user = None;
      s.is_logged_in = false;
    });
    info!("logout");
    res
  }

  /// Pick up a stored token on start.  Returns whether a session was found.
  pub async fn restore_session(&self) -> Result<bool> {
    if self.client.token()?.is_none() {
      debug!("restore_session: no stored token");
      return Ok(false);
    }
    let user = self.fetch_identity().await;
    self.state.update(|s| {
      s.user = user;
      s.is_logged_in = true;
    });
    Ok(true)
  }

  pub fn set_identity(&self, user: User) {
    self.state.update(|s| s.user = Some(user));
  }

  /// Send the changed profile fields and take the server's result as the new
  /// identity.
  pub async fn update_user(&self, update: &UpdateUser) -> Result<User> {
    self.state.update(|s| s.is_loading = true);
    let res = self.client.put::<_, User>(&["api", "users", "me"], update).await;
    self.state.update(|s| s.is_loading = false);
    let user = res?;
    self.set_identity(user.clone());
    Ok(user)
  }

  async fn authenticate(&self, login: &LoginUser) -> Result<Option<User>> {
    let res: LoginResponse = self.client.post_form(&["login"], login.to_form()).await?;
    let token = res.token
      .filter(|token| !token.is_empty())
      .ok_or(Error::MissingToken)?;
    self.client.set_token(&token)?;
    Ok(self.fetch_identity().await)
  }

  async fn fetch_identity(&self) -> Option<User> {
    match self.client.get::<User>(&["api", "users", "me"], Vec::new()).await {
      Ok(user) => Some(user),
      Err(err) => {
        warn!("logged in without identity: {}", err);
        None
      },
    }
  }
}
