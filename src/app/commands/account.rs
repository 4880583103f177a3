use log::*;

use crate::error::*;
use crate::app::AppContext;
use crate::forms::UpdateUser;
use crate::models::User;
use crate::util::opt_str;

pub async fn login(ctx: &AppContext, email: &str, password: &str) -> Result<()> {
  ctx.session.login(email, password).await?;
  print_session(ctx);
  Ok(())
}

pub async fn register(ctx: &AppContext, username: &str, email: &str, password: &str) -> Result<()> {
  ctx.session.register(username, email, password).await?;
  print_session(ctx);
  Ok(())
}

pub fn logout(ctx: &AppContext) -> Result<()> {
  ctx.session.logout()?;
  println!("Logged out.");
  Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
  print_session(ctx);
  Ok(())
}

pub async fn settings(ctx: &AppContext, update: UpdateUser) -> Result<()> {
  let current = match ctx.session.user() {
    Some(user) => user,
    None => {
      println!("Please log in to access settings.");
      return Ok(());
    },
  };
  let update = update.changes_from(&current);
  if update.is_empty() {
    println!("No changes to save");
    return Ok(());
  }
  let user = ctx.session.update_user(&update).await?;
  info!("settings: updated {}", user.username);
  println!("Settings updated successfully!");
  print_user(&user);
  Ok(())
}

fn print_session(ctx: &AppContext) {
  let session = ctx.session.snapshot();
  match (session.is_logged_in, session.user) {
    (false, _) => println!("Not logged in."),
    (true, Some(user)) => print_user(&user),
    (true, None) => println!("Logged in, but the current user could not be fetched."),
  }
}

pub(super) fn print_user(user: &User) {
  println!("{} <{}>", user.username, user.email);
  println!("  bio:   {}", opt_str(&user.bio, "-"));
  println!("  image: {}", opt_str(&user.image, "-"));
  if let (Some(followers), Some(following)) = (user.followers_count, user.following_count) {
    println!("  {} followers, {} following", followers, following);
  }
}
