use chrono::NaiveDateTime;

use serde::{Deserialize, Serialize};

use crate::models::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
  pub slug: String,
  pub title: String,
  pub description: Option<String>,
  pub body: String,
  pub created_at: NaiveDateTime,
  pub updated_at: NaiveDateTime,
  pub author: user::Profile,
  pub favorites_count: Option<i64>,
  pub favorited: Option<bool>,
  pub tag_list: Option<Vec<String>>,
}

impl Article {
  pub fn is_favorited(&self) -> bool {
    self.favorited.unwrap_or(false)
  }

  pub fn tags(&self) -> &[String] {
    self.tag_list.as_deref().unwrap_or(&[])
  }
}
