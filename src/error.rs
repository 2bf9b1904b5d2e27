use std::borrow::Cow;

use axum::{
	extract::rejection::{FormRejection, PathRejection, QueryRejection},
	http::StatusCode,
	response::{IntoResponse, Redirect, Response},
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;
use tower_governor::GovernorError;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message presented to the client.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A machine-readable description of the error.
	pub content: Cow<'a, str>,
	/// The form field that caused the error, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Additional context, such as the identifier that was not found.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorBody<'a> {
	pub success: bool,
	pub errors: Vec<Message<'a>>,
}

/// Describes how a route-specific error is presented to the client.
pub trait ErrorShape: std::error::Error {
	/// The status code of the response.
	fn status(&self) -> StatusCode;

	/// The messages included in the response body.
	fn errors(&self) -> Vec<Message<'_>>;

	/// When set, the client is redirected here instead of receiving an error body.
	fn location(&self) -> Option<String> {
		None
	}
}

/// Errors shared by every route: rejected input and database failures.
///
/// The Display implementation is only logged, never sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("form error: {0}")]
	Form(#[from] FormRejection),
	#[error("query error: {0}")]
	Query(#[from] QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] PathRejection),
	#[error("rate limited")]
	RateLimit(GovernorError),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

impl From<GovernorError> for AppError {
	fn from(error: GovernorError) -> Self {
		Self::RateLimit(error)
	}
}

impl AppError {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..) | Self::Form(..) | Self::Query(..) => StatusCode::BAD_REQUEST,
			// A path that does not parse names nothing that exists
			Self::Path(..) => StatusCode::NOT_FOUND,
			Self::RateLimit(GovernorError::TooManyRequests { .. }) => StatusCode::TOO_MANY_REQUESTS,
			Self::RateLimit(..) | Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	pub fn errors(&self) -> Vec<Message<'static>> {
		match self {
			Self::Validation(errors) => validation_messages(errors),
			Self::Form(rejection) => Message::new(rejection.body_text()).into_vec(),
			Self::Query(rejection) => Message::new(rejection.body_text()).into_vec(),
			Self::Path(..) => Message::new("not_found").into_vec(),
			Self::RateLimit(..) => Message::new("too_many_requests").into_vec(),
			Self::Database(..) => Vec::new(),
		}
	}
}

/// Flattens validation errors into one message per failed rule.
pub fn validation_messages(errors: &validator::ValidationErrors) -> Vec<Message<'static>> {
	let mut messages = errors
		.field_errors()
		.into_iter()
		.flat_map(|(field, errors)| {
			let field = field.to_string();

			errors
				.iter()
				.map(move |error| Message::new(error.to_string()).field(field.clone()))
		})
		.collect::<Vec<_>>();

	messages.sort_by(|a, b| a.field.cmp(&b.field));
	messages
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		if let Self::Database(ref error) = self {
			tracing::error!(%error, "database error");
		}

		(
			self.status(),
			Json(ErrorBody {
				success: false,
				errors: self.errors(),
			}),
		)
			.into_response()
	}
}

/// The error type returned by handlers: either a route-specific error `E` or
/// an [`AppError`].
#[derive(Debug, thiserror::Error)]
pub enum RouteError<E: ErrorShape> {
	#[error(transparent)]
	Route(E),
	#[error(transparent)]
	App(AppError),
}

impl<E: ErrorShape> From<E> for RouteError<E> {
	fn from(error: E) -> Self {
		Self::Route(error)
	}
}

impl<E: ErrorShape> From<AppError> for RouteError<E> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<E: ErrorShape> From<sqlx::Error> for RouteError<E> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(AppError::Database(error))
	}
}

impl<E: ErrorShape> IntoResponse for RouteError<E> {
	fn into_response(self) -> Response {
		match self {
			Self::Route(error) => {
				if let Some(location) = error.location() {
					return Redirect::to(&location).into_response();
				}

				(
					error.status(),
					Json(ErrorBody {
						success: false,
						errors: error.errors(),
					}),
				)
					.into_response()
			}
			Self::App(error) => error.into_response(),
		}
	}
}

impl<E: ErrorShape> aide::OperationOutput for RouteError<E> {
	type Inner = Self;
}

#[cfg(test)]
mod test {
	use axum::http::header;
	use validator::Validate;

	use super::*;

	#[derive(Debug, thiserror::Error)]
	enum TestError {
		#[error("missing")]
		Missing,
		#[error("elsewhere")]
		Elsewhere,
	}

	impl ErrorShape for TestError {
		fn status(&self) -> StatusCode {
			StatusCode::NOT_FOUND
		}

		fn errors(&self) -> Vec<Message<'_>> {
			Message::new(self.to_string()).detail("id", 1).into_vec()
		}

		fn location(&self) -> Option<String> {
			match self {
				Self::Missing => None,
				Self::Elsewhere => Some("/elsewhere/".into()),
			}
		}
	}

	#[derive(Validate)]
	struct Input {
		#[validate(length(min = 1))]
		text: String,
	}

	#[test]
	fn test_route_error_status() {
		let response = RouteError::<TestError>::from(TestError::Missing).into_response();

		assert_eq!(response.status(), StatusCode::NOT_FOUND);
	}

	#[test]
	fn test_route_error_redirect() {
		let response = RouteError::<TestError>::from(TestError::Elsewhere).into_response();

		assert_eq!(response.status(), StatusCode::SEE_OTHER);
		assert_eq!(response.headers()[header::LOCATION], "/elsewhere/");
	}

	#[test]
	fn test_validation_messages() {
		let errors = Input {
			text: String::new(),
		}
		.validate()
		.unwrap_err();

		let messages = validation_messages(&errors);

		assert_eq!(messages.len(), 1);
		assert_eq!(messages[0].field.as_deref(), Some("text"));
	}

	#[test]
	fn test_message_details() {
		let message = Message::new("unknown_post").detail("post", 4);
		let details = message.details.unwrap();

		assert_eq!(details["post"], serde_json::json!(4));
	}
}
