//! Command-line front end.  Each command is one store action followed by
//! printing what the store now holds.

use clap::{Parser, Subcommand};

use crate::error::*;
use crate::app::AppContext;

mod account;
mod feed;
mod profile;

#[derive(Debug, Parser)]
#[command(name = "conduit", version, about = "Read and write on a Conduit blogging server")]
pub struct Cli {
  /// Config file; replaces conf/* and APP_* environment overrides.
  #[arg(short, long)]
  pub config: Option<String>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Sign in and store the token.
  Login {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
  },
  /// Create an account and sign in.
  Register {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
  },
  /// Forget the stored token.
  Logout,
  /// Show the signed in user.
  Whoami,
  /// Update the signed in user; only changed fields are sent.
  Settings {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    image: Option<String>,
  },
  /// List the feed.
  Articles {
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    tag: Option<String>,
    #[arg(long)]
    offset: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
  },
  /// Show one article with its comments.
  Article {
    slug: String,
  },
  /// Publish a new article.
  Publish {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    body: String,
    #[arg(long = "tag")]
    tags: Vec<String>,
  },
  /// List the comments of an article.
  Comments {
    slug: String,
  },
  /// Comment on an article.
  Comment {
    slug: String,
    body: String,
  },
  Favorite {
    slug: String,
  },
  Unfavorite {
    slug: String,
  },
  /// Show a user's profile and articles.
  Profile {
    username: String,
  },
  Follow {
    username: String,
  },
  Unfollow {
    username: String,
  },
}

pub async fn execute(ctx: &AppContext, command: Command) -> Result<()> {
  match command {
    Command::Login { email, password } => account::login(ctx, &email, &password).await,
    Command::Register { username, email, password } => {
      account::register(ctx, &username, &email, &password).await
    },
    Command::Logout => account::logout(ctx),
    Command::Whoami => account::whoami(ctx),
    Command::Settings { username, email, password, bio, image } => {
      let update = crate::forms::UpdateUser { username, email, password, bio, image };
      account::settings(ctx, update).await
    },
    Command::Articles { author, tag, offset, limit } => {
      let query = crate::forms::ArticleQuery { author, tag, offset, limit };
      feed::articles(ctx, &query).await
    },
    Command::Article { slug } => feed::article(ctx, &slug).await,
    Command::Publish { title, description, body, tags } => {
      let article = crate::forms::CreateArticle {
        title,
        description: Some(description),
        body,
        tag_list: if tags.is_empty() { None } else { Some(tags) },
      };
      feed::publish(ctx, &article).await
    },
    Command::Comments { slug } => feed::comments(ctx, &slug).await,
    Command::Comment { slug, body } => feed::comment(ctx, &slug, &body).await,
    Command::Favorite { slug } => feed::set_favorite(ctx, &slug, true).await,
    Command::Unfavorite { slug } => feed::set_favorite(ctx, &slug, false).await,
    Command::Profile { username } => profile::show(ctx, &username).await,
    Command::Follow { username } => profile::set_following(ctx, &username, true).await,
    Command::Unfollow { username } => profile::set_following(ctx, &username, false).await,
  }
}
