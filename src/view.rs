use axum::{
	http::{header, StatusCode},
	response::{IntoResponse, Redirect, Response},
	Json,
};
use aide::{
	gen::GenContext,
	openapi::{Operation, Response as ApiResponse},
	OperationOutput,
};
use cookie::Cookie;
use schemars::JsonSchema;
use serde::Serialize;

/// A page to render: the template name and the context handed to it.
///
/// Rendering itself happens outside this service, so the response body is the
/// JSON document `{ "template": ..., "context": ... }`.
#[derive(Debug)]
pub struct Template<C> {
	pub name: &'static str,
	pub context: C,
}

/// The response body of a [`Template`].
#[derive(Serialize, JsonSchema)]
struct Rendered<C> {
	/// Name of the template to render.
	template: &'static str,
	context: C,
}

impl<C> Template<C> {
	pub fn new(name: &'static str, context: C) -> Self {
		Self { name, context }
	}
}

impl<C: Serialize> IntoResponse for Template<C> {
	fn into_response(self) -> Response {
		(
			StatusCode::OK,
			Json(Rendered {
				template: self.name,
				context: self.context,
			}),
		)
			.into_response()
	}
}

impl<C: JsonSchema> OperationOutput for Template<C> {
	type Inner = C;

	fn operation_response(ctx: &mut GenContext, operation: &mut Operation) -> Option<ApiResponse> {
		Json::<Rendered<C>>::operation_response(ctx, operation)
	}

	fn inferred_responses(
		ctx: &mut GenContext,
		operation: &mut Operation,
	) -> Vec<(Option<u16>, ApiResponse)> {
		Json::<Rendered<C>>::inferred_responses(ctx, operation)
	}
}

/// The result of a form endpoint: render a page, or redirect elsewhere.
#[derive(Debug)]
pub enum Outcome<C> {
	Render(Template<C>),
	Redirect {
		location: String,
		/// Set on the client along with the redirect.
		cookie: Option<Cookie<'static>>,
	},
}

impl<C> Outcome<C> {
	pub fn redirect(location: impl Into<String>) -> Self {
		Self::Redirect {
			location: location.into(),
			cookie: None,
		}
	}

	/// Sets `cookie` when redirecting. Rendered pages are left as they are.
	pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
		if let Self::Redirect { cookie: ref mut slot, .. } = self {
			*slot = Some(cookie);
		}

		self
	}
}

impl<C> From<Template<C>> for Outcome<C> {
	fn from(template: Template<C>) -> Self {
		Self::Render(template)
	}
}

impl<C: Serialize> IntoResponse for Outcome<C> {
	fn into_response(self) -> Response {
		match self {
			Self::Render(template) => template.into_response(),
			Self::Redirect {
				location,
				cookie: None,
			} => Redirect::to(&location).into_response(),
			Self::Redirect {
				location,
				cookie: Some(cookie),
			} => (
				[(header::SET_COOKIE, cookie.to_string())],
				Redirect::to(&location),
			)
				.into_response(),
		}
	}
}

/// Documented as the rendered page; routes describe their redirects themselves.
impl<C: JsonSchema> OperationOutput for Outcome<C> {
	type Inner = C;

	fn operation_response(ctx: &mut GenContext, operation: &mut Operation) -> Option<ApiResponse> {
		Template::<C>::operation_response(ctx, operation)
	}

	fn inferred_responses(
		ctx: &mut GenContext,
		operation: &mut Operation,
	) -> Vec<(Option<u16>, ApiResponse)> {
		Template::<C>::inferred_responses(ctx, operation)
	}
}

#[cfg(test)]
mod test {
	use axum::body::to_bytes;
	use serde_json::{json, Value};

	use super::*;

	#[tokio::test]
	async fn test_template_body() {
		let response = Template::new("blog/index.html", json!({ "page": 1 })).into_response();

		assert_eq!(response.status(), StatusCode::OK);

		let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		let body = serde_json::from_slice::<Value>(&body).unwrap();

		assert_eq!(body["template"], "blog/index.html");
		assert_eq!(body["context"]["page"], 1);
	}

	#[test]
	fn test_redirect() {
		let response = Outcome::<()>::redirect("/posts/1/").into_response();

		assert_eq!(response.status(), StatusCode::SEE_OTHER);
		assert_eq!(response.headers()[header::LOCATION], "/posts/1/");
		assert!(response.headers().get(header::SET_COOKIE).is_none());
	}

	#[test]
	fn test_redirect_with_cookie() {
		let response = Outcome::<()>::redirect("/")
			.with_cookie(Cookie::new("session", "abc"))
			.into_response();

		assert_eq!(response.status(), StatusCode::SEE_OTHER);
		assert_eq!(response.headers()[header::SET_COOKIE], "session=abc");
	}

	#[test]
	fn test_render_ignores_cookie() {
		let response = Outcome::from(Template::new("blog/index.html", ()))
			.with_cookie(Cookie::new("session", "abc"))
			.into_response();

		assert_eq!(response.status(), StatusCode::OK);
		assert!(response.headers().get(header::SET_COOKIE).is_none());
	}
}
