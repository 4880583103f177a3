use crate::error::*;
use crate::app::{AppContext, OptimisticFlag};
use crate::forms::{ArticleQuery, CreateArticle};
use crate::models::{Article, Comment};
use crate::util::format_date;

pub async fn articles(ctx: &AppContext, query: &ArticleQuery) -> Result<()> {
  let articles = ctx.content.list_articles(query).await?;
  if articles.is_empty() {
    println!("No articles are here... yet.");
  }
  for article in articles.iter() {
    print_summary(article);
  }
  Ok(())
}

pub async fn article(ctx: &AppContext, slug: &str) -> Result<()> {
  let article = match ctx.content.get_article(slug).await? {
    Some(article) => article,
    None => {
      println!("Article not found: {}", slug);
      return Ok(());
    },
  };
  print_summary(&article);
  println!();
  println!("{}", article.body);
  println!();
  print_comments(&ctx.content.list_comments(slug).await?);
  Ok(())
}

pub async fn publish(ctx: &AppContext, article: &CreateArticle) -> Result<()> {
  let article = ctx.content.create_article(article).await?;
  println!("Published: {}", article.slug);
  Ok(())
}

pub async fn comments(ctx: &AppContext, slug: &str) -> Result<()> {
  print_comments(&ctx.content.list_comments(slug).await?);
  Ok(())
}

pub async fn comment(ctx: &AppContext, slug: &str, body: &str) -> Result<()> {
  print_comments(&ctx.content.post_comment(slug, body).await?);
  Ok(())
}

pub async fn set_favorite(ctx: &AppContext, slug: &str, favorite: bool) -> Result<()> {
  let current = match ctx.content.get_article(slug).await? {
    Some(article) => article,
    None => {
      println!("Article not found: {}", slug);
      return Ok(());
    },
  };
  let mut flag = OptimisticFlag::new(current.is_favorited());
  if flag.displayed() == favorite {
    println!("{} already {}.", slug, favorite_label(favorite));
    return Ok(());
  }
  let content = &ctx.content;
  flag.toggle(move |target| async move {
    println!("{} {}...", if target { "Favoriting" } else { "Unfavoriting" }, slug);
    let article = if target {
      content.favorite(slug).await?
    } else {
      content.unfavorite(slug).await?
    };
    Ok(article.is_favorited())
  }).await?;
  if let Some(article) = ctx.content.current_article() {
    println!("{} {} ({} favorites)", slug, favorite_label(flag.displayed()),
      article.favorites_count.unwrap_or(0));
  }
  Ok(())
}

fn favorite_label(favorite: bool) -> &'static str {
  if favorite { "favorited" } else { "not favorited" }
}

fn print_summary(article: &Article) {
  println!("{} ({})", article.title, article.slug);
  println!("  by {} on {}  <3 {}", article.author.username, format_date(&article.created_at),
    article.favorites_count.unwrap_or(0));
  if let Some(ref description) = article.description {
    println!("  {}", description);
  }
  if !article.tags().is_empty() {
    println!("  #{}", article.tags().join(" #"));
  }
}

fn print_comments(comments: &[Comment]) {
  if comments.is_empty() {
    println!("No comments yet.");
  }
  for comment in comments {
    println!("- {} ({}, {})", comment.body, comment.author.username, format_date(&comment.created_at));
  }
}
