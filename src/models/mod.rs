pub mod user;
pub mod article;
pub mod comment;
pub use self::{
  user::*,
  article::*,
  comment::*,
};
