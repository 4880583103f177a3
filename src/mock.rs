//! In-memory Conduit server for tests.
//!
//! Speaks the same envelopes, status codes and quirks as the real API
//! (form login with a raw token reply, malformed JSON on login failure,
//! `data.profile` on follow) so the stores can be driven end to end without a
//! network.

use log::*;

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use crate::error::*;
use crate::forms::*;
use crate::http::{ApiRequest, RawResponse, RequestBody, Transport};
use crate::models::{Article, Comment, User};

const TOKEN_PREFIX: &str = "mock-token-";

struct Account {
  user: User,
  password: String,
}

struct StoredArticle {
  author_id: i64,
  article: Article,
}

struct StoredComment {
  slug: String,
  comment: Comment,
}

struct Failure {
  method: String,
  path: String,
  status: u16,
}

#[derive(Default)]
struct MockState {
  accounts: Vec<Account>,
  articles: Vec<StoredArticle>,
  comments: Vec<StoredComment>,
  // (follower, followee)
  follows: HashSet<(i64, i64)>,
  // (user, slug)
  favorites: HashSet<(i64, String)>,
  next_id: i64,
  identity_broken: bool,
  failures: Vec<Failure>,
  requests: Vec<ApiRequest>,
}

/// Fake Conduit API implementing [`Transport`].
#[derive(Default)]
pub struct MockConduit {
  state: Mutex<MockState>,
}

impl MockConduit {
  pub fn new() -> Self {
    Default::default()
  }

  fn lock(&self) -> MutexGuard<'_, MockState> {
    self.state.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Add an account directly, bypassing registration.
  pub fn seed_user(&self, username: &str, email: &str, password: &str) -> User {
    let mut state = self.lock();
    state.add_account(username, email, password)
  }

  /// Add an article by an existing user.
  pub fn seed_article(&self, author: &str, title: &str, body: &str, tags: &[&str]) -> Result<Article> {
    let mut state = self.lock();
    let author_id = state.account_by_username(author)
      .map(|acct| acct.user.id)
      .ok_or_else(|| Error::NotFound(format!("no user {:?}", author)))?;
    let form = CreateArticle {
      title: title.to_string(),
      description: Some(title.to_string()),
      body: body.to_string(),
      tag_list: Some(tags.iter().map(|t| t.to_string()).collect()),
    };
    Ok(state.add_article(author_id, form))
  }

  /// Token the server would hand out to `username`.
  pub fn token_for(&self, username: &str) -> Option<String> {
    self.lock().account_by_username(username).map(|acct| token_for_id(acct.user.id))
  }

  /// Make `GET /api/users/me` fail with a 500 while set.
  pub fn set_identity_broken(&self, broken: bool) {
    self.lock().identity_broken = broken;
  }

  /// Fail the next `method path` request with `status`.
  pub fn fail_next(&self, method: &str, path: &str, status: u16) {
    self.lock().failures.push(Failure {
      method: method.to_uppercase(),
      path: path.to_string(),
      status,
    });
  }

  /// Every request received so far.
  pub fn requests(&self) -> Vec<ApiRequest> {
    self.lock().requests.clone()
  }

  pub fn is_following(&self, follower: &str, followee: &str) -> bool {
    let state = self.lock();
    match (state.account_by_username(follower), state.account_by_username(followee)) {
      (Some(a), Some(b)) => state.follows.contains(&(a.user.id, b.user.id)),
      _ => false,
    }
  }
}

#[async_trait]
impl Transport for MockConduit {
  async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
    let mut state = self.lock();
    state.requests.push(request.clone());
    let method = request.method.as_str().to_string();
    let path = request.path();
    debug!("mock: {} {}", method, path);

    if let Some(pos) = state.failures.iter()
      .position(|f| f.method == method && f.path == path)
    {
      let failure = state.failures.remove(pos);
      return fail(failure.status, "INJECTED_FAILURE", "injected failure");
    }

    let segments: Vec<&str> = request.segments.iter().map(String::as_str).collect();
    match (method.as_str(), segments.as_slice()) {
      ("POST", ["login"]) => state.login(&request),
      ("POST", ["api", "users"]) => state.register(&request),
      ("GET", ["api", "users", "me"]) => state.current_user(&request),
      ("PUT", ["api", "users", "me"]) => state.update_user(&request),
      ("GET", ["api", "users", username]) => state.profile(&request, username),
      ("POST", ["api", "users", username, "follow"]) => state.set_follow(&request, username, true),
      ("DELETE", ["api", "users", username, "follow"]) => state.set_follow(&request, username, false),
      ("GET", ["api", "articles"]) => state.list_articles(&request),
      ("POST", ["api", "articles"]) => state.create_article(&request),
      ("GET", ["api", "articles", slug]) => state.get_article(&request, slug),
      ("GET", ["api", "articles", slug, "comments"]) => state.list_comments(slug),
      ("POST", ["api", "articles", slug, "comments"]) => state.create_comment(&request, slug),
      ("POST", ["api", "articles", slug, "favorite"]) => state.set_favorite(&request, slug, true),
      ("DELETE", ["api", "articles", slug, "favorite"]) => state.set_favorite(&request, slug, false),
      _ => fail(404, "NOT_FOUND", "no such route"),
    }
  }
}

impl MockState {
  fn next_id(&mut self) -> i64 {
    self.next_id += 1;
    self.next_id
  }

  fn add_account(&mut self, username: &str, email: &str, password: &str) -> User {
    let user = User {
      id: self.next_id(),
      username: username.to_string(),
      email: email.to_string(),
      ..Default::default()
    };
    self.accounts.push(Account {
      user: user.clone(),
      password: password.to_string(),
    });
    user
  }

  fn add_article(&mut self, author_id: i64, form: CreateArticle) -> Article {
    let base = slug::slugify(&form.title);
    let mut slug = base.clone();
    let mut n = 1;
    while self.article_by_slug(&slug).is_some() {
      n += 1;
      slug = format!("{}-{}", base, n);
    }
    let author = self.account_by_id(author_id)
      .map(|acct| acct.user.to_profile())
      .unwrap_or_default();
    // ids double as a monotonic clock for ordering
    self.next_id();
    let now = Utc::now().naive_utc();
    let article = Article {
      slug,
      title: form.title,
      description: form.description,
      body: form.body,
      created_at: now,
      updated_at: now,
      author,
      favorites_count: Some(0),
      favorited: Some(false),
      tag_list: form.tag_list,
    };
    self.articles.push(StoredArticle {
      author_id,
      article: article.clone(),
    });
    article
  }

  fn account_by_id(&self, id: i64) -> Option<&Account> {
    self.accounts.iter().find(|acct| acct.user.id == id)
  }

  fn account_by_username(&self, username: &str) -> Option<&Account> {
    self.accounts.iter().find(|acct| acct.user.username == username)
  }

  fn article_by_slug(&self, slug: &str) -> Option<&StoredArticle> {
    self.articles.iter().find(|stored| stored.article.slug == slug)
  }

  fn viewer(&self, request: &ApiRequest) -> Option<i64> {
    let id = request.bearer.as_deref()?
      .strip_prefix(TOKEN_PREFIX)?
      .parse::<i64>()
      .ok()?;
    self.account_by_id(id).map(|acct| acct.user.id)
  }

  fn view_user(&self, user: &User, viewer: Option<i64>) -> User {
    let mut user = user.clone();
    user.following = Some(viewer.map(|v| self.follows.contains(&(v, user.id))).unwrap_or(false));
    user.followers_count = Some(self.follows.iter().filter(|(_, b)| *b == user.id).count() as i64);
    user.following_count = Some(self.follows.iter().filter(|(a, _)| *a == user.id).count() as i64);
    user
  }

  fn view_article(&self, stored: &StoredArticle, viewer: Option<i64>) -> Article {
    let slug = &stored.article.slug;
    let mut article = stored.article.clone();
    article.favorites_count = Some(self.favorites.iter().filter(|(_, s)| s == slug).count() as i64);
    article.favorited = Some(viewer
      .map(|v| self.favorites.contains(&(v, slug.clone())))
      .unwrap_or(false));
    if let Some(acct) = self.account_by_id(stored.author_id) {
      article.author = acct.user.to_profile();
      article.author.following = None;
    }
    article
  }

  fn login(&mut self, request: &ApiRequest) -> Result<RawResponse> {
    let email = request.form_field("email").unwrap_or_default();
    let password = request.form_field("password").unwrap_or_default();
    let account = self.accounts.iter()
      .find(|acct| acct.user.email == email && acct.password == password);
    match account {
      Some(acct) => respond(200, &json!({
        "success": true,
        "message": "login success",
        "token": token_for_id(acct.user.id),
        "tokenType": "Bearer",
      })),
      // The real server closes one brace too many here.
      None => Ok(RawResponse {
        status: 401,
        body: br#"{"success": false, "error": {"code": "LOGIN_FAILED", "message": "login failed"}}}"#
          .to_vec(),
      }),
    }
  }

  fn register(&mut self, request: &ApiRequest) -> Result<RawResponse> {
    let form: RegisterUser = match json_body(request) {
      Ok(form) => form,
      Err(res) => return res,
    };
    let mut details = serde_json::Map::new();
    for (field, value) in [("username", &form.username), ("email", &form.email), ("password", &form.password)] {
      if value.trim().is_empty() {
        details.insert(field.to_string(), json!("must not be blank"));
      }
    }
    if !details.is_empty() {
      let err = ApiError {
        code: "VALIDATION_ERROR".to_string(),
        message: "invalid input".to_string(),
        details: Some(details.into()),
      };
      return respond(400, &Envelope::<()> {
        success: false,
        data: None,
        message: None,
        error: Some(err),
      });
    }
    if self.accounts.iter().any(|acct| acct.user.email == form.email) {
      return fail(409, "REGISTRATION_FAILED", "email already in use");
    }
    if self.account_by_username(&form.username).is_some() {
      return fail(409, "REGISTRATION_FAILED", "username already in use");
    }
    let user = self.add_account(&form.username, &form.email, &form.password);
    let user = self.view_user(&user, None);
    respond(201, &Envelope::success(user))
  }

  fn current_user(&mut self, request: &ApiRequest) -> Result<RawResponse> {
    let viewer = match self.viewer(request) {
      Some(viewer) => viewer,
      None => return fail(401, "USER_FETCH_FAILED", "failed to fetch user"),
    };
    if self.identity_broken {
      return fail(500, "INTERNAL_ERROR", "identity lookup failed");
    }
    match self.account_by_id(viewer) {
      Some(acct) => respond(200, &Envelope::success(self.view_user(&acct.user, None))),
      None => fail(401, "USER_FETCH_FAILED", "failed to fetch user"),
    }
  }

  fn update_user(&mut self, request: &ApiRequest) -> Result<RawResponse> {
    let viewer = match self.viewer(request) {
      Some(viewer) => viewer,
      None => return fail(401, "UNAUTHORIZED", "login required"),
    };
    let form: UpdateUser = match json_body(request) {
      Ok(form) => form,
      Err(res) => return res,
    };
    if let Some(ref username) = form.username {
      if self.accounts.iter().any(|a| &a.user.username == username && a.user.id != viewer) {
        return fail(409, "USER_UPDATE_FAILED", "username already in use");
      }
    }
    let acct = match self.accounts.iter_mut().find(|acct| acct.user.id == viewer) {
      Some(acct) => acct,
      None => return fail(401, "UNAUTHORIZED", "login required"),
    };
    if let Some(username) = form.username {
      acct.user.username = username;
    }
    if let Some(email) = form.email {
      acct.user.email = email;
    }
    if let Some(password) = form.password {
      acct.password = password;
    }
    if form.bio.is_some() {
      acct.user.bio = form.bio;
    }
    if form.image.is_some() {
      acct.user.image = form.image;
    }
    let user = acct.user.clone();
    respond(200, &Envelope::success(self.view_user(&user, None)))
  }

  fn profile(&mut self, request: &ApiRequest, username: &str) -> Result<RawResponse> {
    let viewer = self.viewer(request);
    match self.account_by_username(username) {
      Some(acct) => respond(200, &Envelope::success(self.view_user(&acct.user, viewer))),
      None => fail(404, "USER_NOT_FOUND", "user not found"),
    }
  }

  fn set_follow(&mut self, request: &ApiRequest, username: &str, follow: bool) -> Result<RawResponse> {
    let code = if follow { "FOLLOW_FAILED" } else { "UNFOLLOW_FAILED" };
    let viewer = match self.viewer(request) {
      Some(viewer) => viewer,
      None => return fail(401, "UNAUTHORIZED", "login required"),
    };
    let target = match self.account_by_username(username) {
      Some(acct) => acct.user.clone(),
      None => return fail(400, code, "user not found"),
    };
    if target.id == viewer {
      return fail(400, code, "cannot follow yourself");
    }
    if follow {
      self.follows.insert((viewer, target.id));
    } else {
      self.follows.remove(&(viewer, target.id));
    }
    respond(200, &Envelope::success(ProfileOut {
      profile: self.view_user(&target, Some(viewer)),
    }))
  }

  fn list_articles(&mut self, request: &ApiRequest) -> Result<RawResponse> {
    let viewer = self.viewer(request);
    let author = request.query_param("author").filter(|a| !a.is_empty());
    let tag = request.query_param("tag").filter(|t| !t.is_empty());
    let offset = request.query_param("offset").and_then(|v| v.parse().ok()).unwrap_or(0usize);
    let limit = request.query_param("limit").and_then(|v| v.parse().ok()).unwrap_or(20usize);

    let mut matching: Vec<&StoredArticle> = self.articles.iter()
      .filter(|stored| author.map_or(true, |a| stored.article.author.username == a))
      .filter(|stored| tag.map_or(true, |t| stored.article.tags().iter().any(|x| x == t)))
      .collect();
    // newest first
    matching.reverse();
    let articles = matching.iter()
      .skip(offset)
      .take(limit)
      .map(|stored| self.view_article(stored, viewer))
      .collect();
    respond(200, &Envelope::success(ArticleList {
      articles,
      articles_count: matching.len(),
    }))
  }

  fn create_article(&mut self, request: &ApiRequest) -> Result<RawResponse> {
    let viewer = match self.viewer(request) {
      Some(viewer) => viewer,
      None => return fail(401, "UNAUTHORIZED", "login required"),
    };
    let form: CreateArticle = match json_body(request) {
      Ok(form) => form,
      Err(res) => return res,
    };
    let description = form.description.as_deref().unwrap_or_default();
    if form.title.trim().is_empty() || description.trim().is_empty() || form.body.trim().is_empty() {
      return fail(400, "ARTICLE_CREATE_FAILED", "title, description and body are required");
    }
    let article = self.add_article(viewer, form);
    respond(201, &Envelope::success(ArticleOut { article }))
  }

  fn get_article(&mut self, request: &ApiRequest, slug: &str) -> Result<RawResponse> {
    let viewer = self.viewer(request);
    match self.article_by_slug(slug) {
      Some(stored) => respond(200, &Envelope::success(ArticleOut {
        article: self.view_article(stored, viewer),
      })),
      None => fail(404, "ARTICLE_NOT_FOUND", "article not found"),
    }
  }

  fn list_comments(&mut self, slug: &str) -> Result<RawResponse> {
    if self.article_by_slug(slug).is_none() {
      return fail(400, "COMMENTS_FETCH_FAILED", "article not found");
    }
    let comments: Vec<Comment> = self.comments.iter()
      .filter(|stored| stored.slug == slug)
      .map(|stored| stored.comment.clone())
      .collect();
    respond(200, &Envelope::success(CommentList {
      comments_count: comments.len(),
      comments,
    }))
  }

  fn create_comment(&mut self, request: &ApiRequest, slug: &str) -> Result<RawResponse> {
    let viewer = match self.viewer(request) {
      Some(viewer) => viewer,
      None => return fail(401, "UNAUTHORIZED", "login required"),
    };
    let form: CreateComment = match json_body(request) {
      Ok(form) => form,
      Err(res) => return res,
    };
    if self.article_by_slug(slug).is_none() {
      return fail(400, "COMMENT_CREATE_FAILED", "article not found");
    }
    if form.body.trim().is_empty() {
      return fail(400, "COMMENT_CREATE_FAILED", "comment body is required");
    }
    let author = self.account_by_id(viewer)
      .map(|acct| acct.user.to_profile())
      .unwrap_or_default();
    let comment = Comment {
      id: self.next_id(),
      body: form.body,
      created_at: Utc::now().naive_utc(),
      author,
    };
    self.comments.push(StoredComment {
      slug: slug.to_string(),
      comment: comment.clone(),
    });
    respond(201, &Envelope::success(CommentOut { comment }))
  }

  fn set_favorite(&mut self, request: &ApiRequest, slug: &str, favorite: bool) -> Result<RawResponse> {
    let code = if favorite { "ARTICLE_FAVORITE_FAILED" } else { "ARTICLE_UNFAVORITE_FAILED" };
    let viewer = match self.viewer(request) {
      Some(viewer) => viewer,
      None => return fail(401, "UNAUTHORIZED", "login required"),
    };
    if self.article_by_slug(slug).is_none() {
      return fail(400, code, "article not found");
    }
    if favorite {
      self.favorites.insert((viewer, slug.to_string()));
    } else {
      self.favorites.remove(&(viewer, slug.to_string()));
    }
    match self.article_by_slug(slug) {
      Some(stored) => respond(200, &Envelope::success(ArticleOut {
        article: self.view_article(stored, Some(viewer)),
      })),
      None => fail(400, code, "article not found"),
    }
  }
}

fn token_for_id(id: i64) -> String {
  format!("{}{}", TOKEN_PREFIX, id)
}

fn json_body<T: DeserializeOwned>(request: &ApiRequest) -> std::result::Result<T, Result<RawResponse>> {
  match request.body {
    RequestBody::Json(ref value) => serde_json::from_value(value.clone())
      .map_err(|e| fail(400, "VALIDATION_ERROR", &e.to_string())),
    _ => Err(fail(400, "VALIDATION_ERROR", "expected a JSON body")),
  }
}

fn respond<T: Serialize>(status: u16, body: &T) -> Result<RawResponse> {
  Ok(RawResponse {
    status,
    body: serde_json::to_vec(body)?,
  })
}

fn fail(status: u16, code: &str, message: &str) -> Result<RawResponse> {
  respond(status, &Envelope::<()>::error(code, message))
}
