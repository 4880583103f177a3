use chrono::NaiveDateTime;

use serde::{Deserialize, Serialize};

use crate::models::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub id: i64,
  pub body: String,
  pub created_at: NaiveDateTime,
  pub author: user::Profile,
}
