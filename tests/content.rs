mod common;

use fast_realworld_client::error::Error;
use fast_realworld_client::forms::{ArticleQuery, CreateArticle};
use fast_realworld_client::http::Method;
use rstest::rstest;

use common::*;

async fn with_articles() -> Harness {
  let h = Harness::logged_in().await;
  h.server.seed_article("jake", "How to train your dragon", "Ever wonder how?", &["dragons", "training"]).unwrap();
  h.server.seed_article("anna", "Writing tests", "Start small.", &["rust"]).unwrap();
  h.server.seed_article("jake", "Dragon care", "Feed them.", &["dragons"]).unwrap();
  h
}

fn slugs(articles: &[fast_realworld_client::models::Article]) -> Vec<&str> {
  articles.iter().map(|a| a.slug.as_str()).collect()
}

#[tokio::test]
async fn global_feed_is_newest_first() {
  let h = with_articles().await;

  let articles = h.ctx.content.list_articles(&ArticleQuery::new()).await.unwrap();

  assert_eq!(slugs(&articles), vec!["dragon-care", "writing-tests", "how-to-train-your-dragon"]);
  let state = h.ctx.content.snapshot();
  assert_eq!(state.articles, articles);
  assert_eq!(state.articles_count, 3);
  assert!(!state.is_loading);
}

#[rstest]
#[case::author(ArticleQuery::new().author("jake"), vec!["dragon-care", "how-to-train-your-dragon"])]
#[case::tag(ArticleQuery::new().tag("rust"), vec!["writing-tests"])]
#[case::author_and_tag(ArticleQuery::new().author("anna").tag("dragons"), vec![])]
#[case::page(ArticleQuery::new().page(1, 1), vec!["writing-tests"])]
#[tokio::test]
async fn filtered_feed(#[case] query: ArticleQuery, #[case] expected: Vec<&str>) {
  let h = with_articles().await;

  let articles = h.ctx.content.list_articles(&query).await.unwrap();

  assert_eq!(slugs(&articles), expected);
  if let Some(author) = query.author {
    assert!(articles.iter().all(|a| a.author.username == author));
  }
}

#[tokio::test]
async fn failed_listing_keeps_previous_feed() {
  let h = with_articles().await;
  let before = h.ctx.content.list_articles(&ArticleQuery::new()).await.unwrap();
  h.server.fail_next("GET", "/api/articles", 500);

  let err = h.ctx.content.list_articles(&ArticleQuery::new().author("anna")).await.unwrap_err();

  assert!(matches!(err, Error::Http { status: 500, .. }), "{:?}", err);
  let state = h.ctx.content.snapshot();
  assert_eq!(state.articles, before);
  assert_eq!(state.error.as_deref(), Some("injected failure"));
  assert!(!state.is_loading);

  h.ctx.content.clear_error();
  assert_eq!(h.ctx.content.error(), None);
}

#[tokio::test]
async fn last_response_wins() {
  let h = with_articles().await;
  let all = ArticleQuery::new();
  let anna = ArticleQuery::new().author("anna");

  let (first, second) = futures::join!(
    h.ctx.content.list_articles(&all),
    h.ctx.content.list_articles(&anna),
  );

  assert_eq!(first.unwrap().len(), 3);
  assert_eq!(h.ctx.content.articles(), second.unwrap());
}

#[tokio::test]
async fn missing_article_clears_current() {
  let h = with_articles().await;
  h.ctx.content.get_article("dragon-care").await.unwrap();
  assert!(h.ctx.content.current_article().is_some());

  let article = h.ctx.content.get_article("nonexistent-slug").await.unwrap();

  assert_eq!(article, None);
  assert_eq!(h.ctx.content.current_article(), None);
  assert!(!h.ctx.content.is_loading());
  assert_eq!(h.ctx.content.error(), None);
}

#[tokio::test]
async fn get_article_sets_current() {
  let h = with_articles().await;

  let article = h.ctx.content.get_article("writing-tests").await.unwrap().unwrap();

  assert_eq!(article.title, "Writing tests");
  assert_eq!(article.author.username, "anna");
  assert_eq!(h.ctx.content.current_article(), Some(article));
}

#[tokio::test]
async fn create_article_returns_server_slug() {
  let h = with_articles().await;
  let form = CreateArticle {
    title: "Dragon care".to_string(),
    description: Some("again".to_string()),
    body: "Feed them more.".to_string(),
    tag_list: None,
  };

  let article = h.ctx.content.create_article(&form).await.unwrap();

  assert_eq!(article.slug, "dragon-care-2");
  assert_eq!(article.author.username, "jake");
  assert!(!h.ctx.content.is_loading());
}

#[tokio::test]
async fn create_article_requires_description() {
  let h = with_articles().await;
  let form = CreateArticle {
    title: "No summary".to_string(),
    body: "Just a body.".to_string(),
    ..Default::default()
  };

  let err = h.ctx.content.create_article(&form).await.unwrap_err();

  assert!(matches!(err, Error::Validation(_)), "{:?}", err);
  assert_eq!(h.ctx.content.error().as_deref(), Some("title, description and body are required"));
  assert!(!h.ctx.content.is_loading());
}

#[tokio::test]
async fn create_article_requires_login() {
  let h = with_articles().await;
  h.ctx.session.logout().unwrap();
  let form = CreateArticle {
    title: "Anonymous".to_string(),
    body: "Nobody wrote this.".to_string(),
    ..Default::default()
  };

  let err = h.ctx.content.create_article(&form).await.unwrap_err();

  assert!(matches!(err, Error::Unauthorized(_)), "{:?}", err);
  assert_eq!(h.ctx.content.error().as_deref(), Some("login required"));
}

#[tokio::test]
async fn post_comment_refetches_list() {
  let h = with_articles().await;

  let comments = h.ctx.content.post_comment("writing-tests", "hello").await.unwrap();

  assert!(comments.iter().any(|c| c.body == "hello"));
  let state = h.ctx.content.snapshot();
  assert_eq!(state.comments, comments);
  assert_eq!(state.comments_slug.as_deref(), Some("writing-tests"));

  let requests = h.server.requests();
  let tail: Vec<_> = requests[requests.len() - 2..].iter()
    .map(|r| (r.method.clone(), r.path()))
    .collect();
  assert_eq!(tail, vec![
    (Method::POST, "/api/articles/writing-tests/comments".to_string()),
    (Method::GET, "/api/articles/writing-tests/comments".to_string()),
  ]);
}

#[tokio::test]
async fn comment_slot_follows_last_listing() {
  let h = with_articles().await;
  h.ctx.content.post_comment("writing-tests", "first").await.unwrap();

  let comments = h.ctx.content.list_comments("dragon-care").await.unwrap();

  assert!(comments.is_empty());
  let state = h.ctx.content.snapshot();
  assert!(state.comments.is_empty());
  assert_eq!(state.comments_slug.as_deref(), Some("dragon-care"));
}

#[tokio::test]
async fn failed_comment_keeps_cached_comments() {
  let h = with_articles().await;
  let before = h.ctx.content.post_comment("writing-tests", "first").await.unwrap();

  let err = h.ctx.content.post_comment("writing-tests", "  ").await.unwrap_err();

  assert!(matches!(err, Error::Validation(_)), "{:?}", err);
  assert_eq!(h.ctx.content.comments(), before);
  assert_eq!(h.ctx.content.error().as_deref(), Some("comment body is required"));
}

#[tokio::test]
async fn failed_comment_listing_keeps_slot() {
  let h = with_articles().await;
  let before = h.ctx.content.post_comment("writing-tests", "first").await.unwrap();
  h.server.fail_next("GET", "/api/articles/dragon-care/comments", 500);

  let err = h.ctx.content.list_comments("dragon-care").await.unwrap_err();

  assert!(matches!(err, Error::Http { status: 500, .. }), "{:?}", err);
  let state = h.ctx.content.snapshot();
  assert_eq!(state.comments, before);
  assert_eq!(state.comments_slug.as_deref(), Some("writing-tests"));
  assert_eq!(state.error.as_deref(), Some("injected failure"));
}

#[tokio::test]
async fn failed_refetch_after_comment_keeps_slot() {
  let h = with_articles().await;
  let before = h.ctx.content.post_comment("writing-tests", "first").await.unwrap();
  h.server.fail_next("GET", "/api/articles/writing-tests/comments", 500);

  let err = h.ctx.content.post_comment("writing-tests", "second").await.unwrap_err();

  assert!(matches!(err, Error::Http { status: 500, .. }), "{:?}", err);
  let state = h.ctx.content.snapshot();
  assert_eq!(state.comments, before);
  assert_eq!(state.comments_slug.as_deref(), Some("writing-tests"));
  assert_eq!(state.error.as_deref(), Some("injected failure"));

  // the comment itself was stored
  let comments = h.ctx.content.list_comments("writing-tests").await.unwrap();
  assert_eq!(comments.len(), 2);
}

#[tokio::test]
async fn slug_with_reserved_characters_stays_one_segment() {
  let h = with_articles().await;

  let article = h.ctx.content.get_article("../articles").await.unwrap();

  assert_eq!(article, None);
  let last = h.server.requests().pop().unwrap();
  assert_eq!(last.segments, vec!["api", "articles", "../articles"]);
}

#[tokio::test]
async fn favorite_updates_current_and_feed() {
  let h = with_articles().await;
  h.ctx.content.list_articles(&ArticleQuery::new()).await.unwrap();
  h.ctx.content.get_article("writing-tests").await.unwrap();

  let article = h.ctx.content.favorite("writing-tests").await.unwrap();

  assert!(article.is_favorited());
  assert_eq!(article.favorites_count, Some(1));
  assert_eq!(h.ctx.content.current_article(), Some(article.clone()));
  let feed = h.ctx.content.articles();
  assert_eq!(feed.iter().find(|a| a.slug == "writing-tests"), Some(&article));

  let article = h.ctx.content.unfavorite("writing-tests").await.unwrap();
  assert!(!article.is_favorited());
  assert_eq!(h.ctx.content.current_article(), Some(article));
}
