use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, route::url, AppState};

pub mod model;
pub mod route;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("password hashing error")]
	Argon(#[from] argon2::Error),
	#[error("login required")]
	LoginRequired { next: String },
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/auth/registration/",
			get_with(registration_form, registration_form_docs).post_with(register, register_docs),
		)
		.api_route(
			"/auth/login/",
			get_with(login_form, login_form_docs).post_with(login, login_docs),
		)
		.api_route("/auth/logout/", post_with(logout, logout_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::LoginRequired { .. } => StatusCode::UNAUTHORIZED,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		error::Message::new(self.to_string()).into_vec()
	}

	fn location(&self) -> Option<String> {
		match self {
			Self::LoginRequired { next } => Some(url::login(Some(next))),
			Self::Argon(..) => None,
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_registration_flow(pool: Database) {
		let app = app(pool.clone());

		let response = app
			.post("/auth/registration/")
			.form(&json!({
				"username": "john",
				"email": "john@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), "/profile/john/");
		assert!(response
			.header("set-cookie")
			.to_str()
			.unwrap()
			.contains("session="));

		let response = app
			.post("/auth/login/?next=%2Fposts%2Fcreate%2F")
			.form(&json!({
				"username": "john",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), "/posts/create/");
		assert!(response
			.header("set-cookie")
			.to_str()
			.unwrap()
			.contains("session="));
	}

	#[sqlx::test]
	async fn test_login_wrong_password(pool: Database) {
		let app = app(pool.clone());
		seed_user(&pool, "john").await;

		let response = app
			.post("/auth/login/")
			.form(&json!({
				"username": "john",
				"password": "wrong-password",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();

		assert_eq!(body["template"], "registration/login.html");
		assert!(body["context"]["errors"]["__all__"].is_array());
		assert!(body["context"]["form"].get("password").is_none());
	}

	#[sqlx::test]
	async fn test_registration_username_taken(pool: Database) {
		let app = app(pool.clone());
		seed_user(&pool, "john").await;

		let response = app
			.post("/auth/registration/")
			.form(&json!({
				"username": "john",
				"email": "other@smith.com",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 200);
		assert!(response.json::<Value>()["context"]["errors"]["username"].is_array());
	}

	#[sqlx::test]
	async fn test_protected_route_redirects_to_login(pool: Database) {
		let app = app(pool);

		let response = app.get("/posts/create/").await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), "/auth/login/?next=%2Fposts%2Fcreate%2F");
	}

	#[sqlx::test]
	async fn test_logout(pool: Database) {
		let app = app(pool.clone());
		let (_, cookie) = seed_user(&pool, "john").await;

		let response = app.post("/auth/logout/").add_cookie(cookie.clone()).await;

		assert_eq!(response.status_code(), 303);

		let response = app.get("/posts/create/").add_cookie(cookie).await;

		assert_eq!(response.status_code(), 303);
		assert!(response
			.header("location")
			.to_str()
			.unwrap()
			.starts_with("/auth/login/"));
	}
}
