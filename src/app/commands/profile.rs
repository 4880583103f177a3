use crate::error::*;
use crate::app::{AppContext, OptimisticFlag};
use crate::forms::ArticleQuery;

use super::account::print_user;

pub async fn show(ctx: &AppContext, username: &str) -> Result<()> {
  let user = ctx.profiles.get_profile(username).await?;
  print_user(&user);
  if ctx.session.is_logged_in() {
    println!("  {}", if user.is_followed() { "following" } else { "not following" });
  }
  println!();
  let articles = ctx.content.list_articles(&ArticleQuery::new().author(username)).await?;
  println!("My Articles ({})", articles.len());
  for article in articles.iter() {
    println!("  {} ({})", article.title, article.slug);
  }
  Ok(())
}

pub async fn set_following(ctx: &AppContext, username: &str, follow: bool) -> Result<()> {
  if !ctx.session.is_logged_in() {
    println!("Please log in to follow users.");
    return Ok(());
  }
  if ctx.session.user().map(|u| u.username == username).unwrap_or(false) {
    println!("You cannot follow yourself.");
    return Ok(());
  }

  let current = ctx.profiles.get_profile(username).await?;
  let mut flag = OptimisticFlag::new(current.is_followed());
  if flag.displayed() == follow {
    println!("Already {} {}.", if follow { "following" } else { "not following" }, username);
    return Ok(());
  }
  let profiles = &ctx.profiles;
  flag.toggle(move |target| async move {
    println!("{} {}...", if target { "Following" } else { "Unfollowing" }, username);
    let user = if target {
      profiles.follow(username).await?
    } else {
      profiles.unfollow(username).await?
    };
    Ok(user.is_followed())
  }).await?;
  println!("{} {}.", if flag.displayed() { "Following" } else { "Not following" }, username);
  Ok(())
}
