use serde::{Deserialize, Serialize};

use crate::models::Comment;

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentOut<T> {
  pub comment: T,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentList {
  pub comments: Vec<Comment>,
  #[serde(default)]
  pub comments_count: usize,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateComment {
  pub body: String,
}
