use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, route::url, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(i64),
	#[error("unknown comment {0}")]
	UnknownComment(i64),
	#[error("not the author of comment {comment_id}")]
	NotAuthor { post_id: i64, comment_id: i64 },
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/posts/:post_id/comment/", post_with(add, add_docs))
		.api_route(
			"/posts/:post_id/edit_comment/:comment_id/",
			get_with(edit_form, edit_form_docs).post_with(edit, edit_docs),
		)
		.api_route(
			"/posts/:post_id/delete_comment/:comment_id/",
			get_with(delete_form, delete_form_docs).post_with(delete, delete_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::UnknownComment(..) => StatusCode::NOT_FOUND,
			Self::NotAuthor { .. } => StatusCode::FORBIDDEN,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", *post)
				.into_vec(),
			Self::UnknownComment(comment) => error::Message::new("unknown_comment")
				.detail("comment", *comment)
				.into_vec(),
			Self::NotAuthor { comment_id, .. } => error::Message::new("not_author")
				.detail("comment", *comment_id)
				.into_vec(),
		}
	}

	fn location(&self) -> Option<String> {
		match self {
			Self::NotAuthor { post_id, .. } => Some(url::post_detail(*post_id)),
			Self::UnknownPost(..) | Self::UnknownComment(..) => None,
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	async fn comment_texts(pool: &Database, post_id: i64) -> Vec<String> {
		sqlx::query_scalar::<_, String>("SELECT text FROM comment WHERE post_id = $1 ORDER BY id")
			.bind(post_id)
			.fetch_all(pool)
			.await
			.unwrap()
	}

	#[sqlx::test]
	async fn test_add_comment(pool: Database) {
		let app = app(pool.clone());
		let (author, _) = seed_user(&pool, "author").await;
		let (_, cookie) = seed_user(&pool, "reader").await;
		let post = seed_post(&pool, &author, PostSeed::default()).await;

		let response = app
			.post(&format!("/posts/{post}/comment/"))
			.add_cookie(cookie)
			.form(&json!({ "text": "Nice post" }))
			.await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), format!("/posts/{post}/"));
		assert_eq!(comment_texts(&pool, post).await, vec!["Nice post".to_owned()]);

		let body = app.get(&format!("/posts/{post}/")).await.json::<Value>();

		assert_eq!(body["context"]["comments"][0]["author_username"], "reader");
		assert_eq!(body["context"]["post"]["comment_count"], 1);
	}

	#[sqlx::test]
	async fn test_empty_comment_is_discarded(pool: Database) {
		let app = app(pool.clone());
		let (author, cookie) = seed_user(&pool, "author").await;
		let post = seed_post(&pool, &author, PostSeed::default()).await;

		let response = app
			.post(&format!("/posts/{post}/comment/"))
			.add_cookie(cookie)
			.form(&json!({ "text": "" }))
			.await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), format!("/posts/{post}/"));
		assert!(comment_texts(&pool, post).await.is_empty());
	}

	#[sqlx::test]
	async fn test_comment_on_unknown_post(pool: Database) {
		let app = app(pool.clone());
		let (_, cookie) = seed_user(&pool, "reader").await;

		let response = app
			.post("/posts/404/comment/")
			.add_cookie(cookie)
			.form(&json!({ "text": "Hello" }))
			.await;

		assert_eq!(response.status_code(), 404);
	}

	#[sqlx::test]
	async fn test_edit_comment(pool: Database) {
		let app = app(pool.clone());
		let (author, cookie) = seed_user(&pool, "author").await;
		let post = seed_post(&pool, &author, PostSeed::default()).await;
		let comment = seed_comment(&pool, &author, post, "First").await;
		let path = format!("/posts/{post}/edit_comment/{comment}/");

		let body = app.get(&path).add_cookie(cookie.clone()).await.json::<Value>();

		assert_eq!(body["template"], "blog/comment.html");
		assert_eq!(body["context"]["form"]["form"]["text"], "First");
		assert_eq!(body["context"]["comment"]["id"], comment);

		let response = app
			.post(&path)
			.add_cookie(cookie.clone())
			.form(&json!({ "text": "Edited" }))
			.await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(comment_texts(&pool, post).await, vec!["Edited".to_owned()]);

		let response = app
			.post(&path)
			.add_cookie(cookie)
			.form(&json!({ "text": "  " }))
			.await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(comment_texts(&pool, post).await, vec!["Edited".to_owned()]);
	}

	#[sqlx::test]
	async fn test_non_author_cannot_touch_comment(pool: Database) {
		let app = app(pool.clone());
		let (author, _) = seed_user(&pool, "author").await;
		let (_, other) = seed_user(&pool, "other").await;
		let post = seed_post(&pool, &author, PostSeed::default()).await;
		let comment = seed_comment(&pool, &author, post, "First").await;

		let response = app
			.post(&format!("/posts/{post}/edit_comment/{comment}/"))
			.add_cookie(other.clone())
			.form(&json!({ "text": "Hijacked" }))
			.await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), format!("/posts/{post}/"));

		let response = app
			.post(&format!("/posts/{post}/delete_comment/{comment}/"))
			.add_cookie(other)
			.await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(comment_texts(&pool, post).await, vec!["First".to_owned()]);
	}

	#[sqlx::test]
	async fn test_comment_must_belong_to_post(pool: Database) {
		let app = app(pool.clone());
		let (author, cookie) = seed_user(&pool, "author").await;
		let post = seed_post(&pool, &author, PostSeed::default()).await;
		let other_post = seed_post(&pool, &author, PostSeed::default()).await;
		let comment = seed_comment(&pool, &author, post, "First").await;

		let response = app
			.get(&format!("/posts/{other_post}/edit_comment/{comment}/"))
			.add_cookie(cookie)
			.await;

		assert_eq!(response.status_code(), 404);
	}

	#[sqlx::test]
	async fn test_delete_comment(pool: Database) {
		let app = app(pool.clone());
		let (author, cookie) = seed_user(&pool, "author").await;
		let post = seed_post(&pool, &author, PostSeed::default()).await;
		let comment = seed_comment(&pool, &author, post, "First").await;
		let path = format!("/posts/{post}/delete_comment/{comment}/");

		let body = app.get(&path).add_cookie(cookie.clone()).await.json::<Value>();

		assert_eq!(body["template"], "blog/comment.html");
		assert_eq!(body["context"]["comment"]["text"], "First");
		assert!(body["context"].get("form").is_none());

		let response = app.post(&path).add_cookie(cookie).await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), format!("/posts/{post}/"));
		assert!(comment_texts(&pool, post).await.is_empty());
	}
}
