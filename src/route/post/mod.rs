use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, route::url, AppState};

pub mod model;
pub mod query;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(i64),
	#[error("unknown category {0}")]
	UnknownCategory(String),
	#[error("not the author of post {0}")]
	NotAuthor(i64),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(index, index_docs))
		.api_route(
			"/posts/create/",
			get_with(create_form, create_form_docs).post_with(create, create_docs),
		)
		.api_route("/posts/:post_id/", get_with(detail, detail_docs))
		.api_route(
			"/posts/:post_id/edit/",
			get_with(edit_form, edit_form_docs).post_with(edit, edit_docs),
		)
		.api_route(
			"/posts/:post_id/delete/",
			get_with(delete_form, delete_form_docs).post_with(delete, delete_docs),
		)
		.api_route("/:category_slug/", get_with(category, category_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) | Self::UnknownCategory(..) => StatusCode::NOT_FOUND,
			Self::NotAuthor(..) => StatusCode::FORBIDDEN,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", *post)
				.into_vec(),
			Self::UnknownCategory(slug) => error::Message::new("unknown_category")
				.detail("category", slug.as_str())
				.into_vec(),
			Self::NotAuthor(post) => error::Message::new("not_author")
				.detail("post", *post)
				.into_vec(),
		}
	}

	fn location(&self) -> Option<String> {
		match self {
			Self::NotAuthor(post) => Some(url::post_detail(*post)),
			Self::UnknownPost(..) | Self::UnknownCategory(..) => None,
		}
	}
}
