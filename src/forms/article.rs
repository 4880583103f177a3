use serde::{Deserialize, Serialize};

use crate::models::Article;

#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleOut<T> {
  pub article: T,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleList {
  pub articles: Vec<Article>,
  #[serde(default)]
  pub articles_count: usize,
}

/// Feed filters for `GET /api/articles`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleQuery {
  pub author: Option<String>,
  pub tag: Option<String>,
  pub offset: Option<u32>,
  pub limit: Option<u32>,
}

impl ArticleQuery {
  pub fn new() -> Self {
    Default::default()
  }

  pub fn author(mut self, author: &str) -> Self {
    self.author = Some(author.to_string());
    self
  }

  pub fn tag(mut self, tag: &str) -> Self {
    self.tag = Some(tag.to_string());
    self
  }

  pub fn page(mut self, offset: u32, limit: u32) -> Self {
    self.offset = Some(offset);
    self.limit = Some(limit);
    self
  }

  /// Query string pairs; unset and blank filters are left out.
  pub fn to_pairs(&self) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut push = |key: &str, val: Option<String>| {
      if let Some(val) = val.filter(|v| !v.is_empty()) {
        pairs.push((key.to_string(), val));
      }
    };
    push("author", self.author.clone());
    push("tag", self.tag.clone());
    push("offset", self.offset.map(|v| v.to_string()));
    push("limit", self.limit.map(|v| v.to_string()));
    pairs
  }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticle {
  pub title: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub body: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tag_list: Option<Vec<String>>,
}
