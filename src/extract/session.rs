use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};
use uuid::Uuid;

use crate::{
	error::RouteError,
	guard::Authored,
	openapi::SECURITY_SCHEME_SESSION,
	route::auth::{self, model::User},
	session, Database,
};

/// Looks up the user owning the session cookie of the request, if any.
async fn authenticate<S>(
	parts: &request::Parts,
	state: &S,
) -> Result<Option<Session>, RouteError<auth::Error>>
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	let cookies = parts
		.headers
		.get_all(header::COOKIE)
		.into_iter()
		.filter_map(|value| value.to_str().ok());

	let Some(Ok(session_id)) = session::find_session_id(cookies) else {
		return Ok(None);
	};

	let database = Database::from_ref(state);
	let user = sqlx::query_as::<_, User>(
		r#"
			SELECT "user".* FROM "user"
			JOIN session ON session.user_id = "user".id
			WHERE session.id = $1
		"#,
	)
	.bind(session_id)
	.fetch_optional(&database)
	.await?;

	Ok(user.map(|user| Session {
		id: session_id,
		user,
	}))
}

/// Extracts the session and related user from the request.
///
/// If there is no valid session cookie, an [`auth::Error::LoginRequired`] is returned,
/// which redirects the client to the login page.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub id: Uuid,
	pub user: User,
}

impl Session {
	/// Returns `true` if the session user wrote `item`.
	pub fn is_author_of<T: Authored>(&self, item: &T) -> bool {
		item.author_id() == self.user.id
	}
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		authenticate(parts, state).await?.ok_or_else(|| {
			auth::Error::LoginRequired {
				next: parts.uri.path().to_owned(),
			}
			.into()
		})
	}
}

impl OperationInput for Session {
	/// Operation input for the session extractor.
	///
	/// This adds a session cookie requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}

/// The user making the request, or `None` for anonymous visitors.
///
/// Unlike [`Session`], this never rejects a request over a missing or stale cookie.
#[derive(Debug, Default)]
pub struct Viewer(pub Option<User>);

impl Viewer {
	pub fn user(&self) -> Option<&User> {
		self.0.as_ref()
	}

	/// Returns `true` if the viewer is logged in as the user with `id`.
	pub fn is(&self, id: Uuid) -> bool {
		self.user().is_some_and(|user| user.id == id)
	}
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Viewer
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		Ok(Self(authenticate(parts, state).await?.map(|session| session.user)))
	}
}

impl OperationInput for Viewer {}
