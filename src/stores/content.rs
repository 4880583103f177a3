use log::*;

use crate::error::*;
use crate::forms::*;
use crate::http::ApiClient;
use crate::models::{Article, Comment};

use super::StateCell;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentState {
  /// Current feed.
  pub articles: Vec<Article>,
  /// Total the server reported for the current feed.
  pub articles_count: usize,
  pub current_article: Option<Article>,
  /// Comments of one article only; see `comments_slug`.
  pub comments: Vec<Comment>,
  /// Slug the cached comments belong to.
  pub comments_slug: Option<String>,
  pub is_loading: bool,
  pub error: Option<String>,
}

/// Feed, current article and its comments.
#[derive(Clone)]
pub struct ContentStore {
  client: ApiClient,
  state: StateCell<ContentState>,
}

impl ContentStore {
  pub fn new(client: ApiClient) -> Self {
    Self {
      client,
      state: StateCell::new(ContentState::default()),
    }
  }

  pub fn snapshot(&self) -> ContentState {
    self.state.snapshot()
  }

  pub fn articles(&self) -> Vec<Article> {
    self.state.read(|s| s.articles.clone())
  }

  pub fn current_article(&self) -> Option<Article> {
    self.state.read(|s| s.current_article.clone())
  }

  pub fn comments(&self) -> Vec<Comment> {
    self.state.read(|s| s.comments.clone())
  }

  pub fn is_loading(&self) -> bool {
    self.state.read(|s| s.is_loading)
  }

  pub fn error(&self) -> Option<String> {
    self.state.read(|s| s.error.clone())
  }

  pub fn clear_error(&self) {
    self.state.update(|s| s.error = None);
  }

  /// Replace the feed with the server's list for `query`.
  pub async fn list_articles(&self, query: &ArticleQuery) -> Result<Vec<Article>> {
    self.begin();
    let res = self.client.get::<ArticleList>(&["api", "articles"], query.to_pairs()).await;
    match res {
      Ok(list) => {
        debug!("list_articles: {} of {}", list.articles.len(), list.articles_count);
        let count = list.articles_count;
        let articles = list.articles;
        self.state.update(|s| {
          s.articles = articles.clone();
          s.articles_count = count;
          s.is_loading = false;
        });
        Ok(articles)
      },
      Err(err) => Err(self.fail(err, "Failed to fetch articles")),
    }
  }

  /// Replace the current article.  An unknown slug clears it and yields
  /// `None`.
  pub async fn get_article(&self, slug: &str) -> Result<Option<Article>> {
    self.begin();
    let res = self.client.get::<ArticleOut<Article>>(&["api", "articles", slug], Vec::new()).await;
    match res {
      Ok(out) => {
        let article = out.article;
        self.state.update(|s| {
          s.current_article = Some(article.clone());
          s.is_loading = false;
        });
        Ok(Some(article))
      },
      Err(err) if err.is_not_found() => {
        debug!("get_article: {:?} not found", slug);
        self.state.update(|s| {
          s.current_article = None;
          s.is_loading = false;
        });
        Ok(None)
      },
      Err(err) => Err(self.fail(err, "Failed to fetch article")),
    }
  }

  /// Publish an article; the result carries the server assigned slug.
  pub async fn create_article(&self, article: &CreateArticle) -> Result<Article> {
    self.begin();
    let res = self.client.post::<_, ArticleOut<Article>>(&["api", "articles"], article).await;
    match res {
      Ok(out) => {
        info!("create_article: published {:?}", out.article.slug);
        self.state.update(|s| s.is_loading = false);
        Ok(out.article)
      },
      Err(err) => Err(self.fail(err, "Failed to create article")),
    }
  }

  /// Replace the comment slot with the comments of `slug`.
  pub async fn list_comments(&self, slug: &str) -> Result<Vec<Comment>> {
    let path = ["api", "articles", slug, "comments"];
    match self.client.get::<CommentList>(&path, Vec::new()).await {
      Ok(list) => {
        let comments = list.comments;
        self.state.update(|s| {
          s.comments = comments.clone();
          s.comments_slug = Some(slug.to_string());
        });
        Ok(comments)
      },
      Err(err) => Err(self.record(err, "Failed to fetch comments")),
    }
  }

  /// Post a comment, then re-fetch the whole list for `slug`.
  pub async fn post_comment(&self, slug: &str, body: &str) -> Result<Vec<Comment>> {
    let path = ["api", "articles", slug, "comments"];
    let comment = CreateComment {
      body: body.to_string(),
    };
    if let Err(err) = self.client.post::<_, CommentOut<Comment>>(&path, &comment).await {
      return Err(self.record(err, "Failed to post comment"));
    }
    self.list_comments(slug).await
  }

  pub async fn favorite(&self, slug: &str) -> Result<Article> {
    let res = self.client.post_empty::<ArticleOut<Article>>(&["api", "articles", slug, "favorite"]).await;
    self.apply_favorite(res, "Failed to favorite article")
  }

  pub async fn unfavorite(&self, slug: &str) -> Result<Article> {
    let res = self.client.delete::<ArticleOut<Article>>(&["api", "articles", slug, "favorite"]).await;
    self.apply_favorite(res, "Failed to unfavorite article")
  }

  /// Server's article replaces the current article and its feed entry.
  fn apply_favorite(&self, res: Result<ArticleOut<Article>>, fallback: &str) -> Result<Article> {
    let article = match res {
      Ok(out) => out.article,
      Err(err) => return Err(self.record(err, fallback)),
    };
    self.state.update(|s| {
      if let Some(ref mut current) = s.current_article {
        if current.slug == article.slug {
          *current = article.clone();
        }
      }
      for entry in s.articles.iter_mut().filter(|a| a.slug == article.slug) {
        *entry = article.clone();
      }
    });
    Ok(article)
  }

  fn begin(&self) {
    self.state.update(|s| {
      s.is_loading = true;
      s.error = None;
    });
  }

  fn fail(&self, err: Error, fallback: &str) -> Error {
    self.state.update(|s| s.is_loading = false);
    self.record(err, fallback)
  }

  fn record(&self, err: Error, fallback: &str) -> Error {
    let message = err.display_message(fallback);
    warn!("{}: {}", fallback, err);
    self.state.update(|s| s.error = Some(message));
    err
  }
}
