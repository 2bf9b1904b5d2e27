use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown user {0}")]
	UnknownUser(String),
	#[error("not following {0}")]
	NotFollowing(String),
	#[error("cannot follow yourself")]
	SelfFollow,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route(
			"/profile/edit/",
			get_with(edit_form, edit_form_docs).post_with(edit, edit_docs),
		)
		.api_route("/profile/:username/", get_with(profile, profile_docs))
		.api_route("/profile/:username/follow/", post_with(follow, follow_docs))
		.api_route("/profile/:username/unfollow/", post_with(unfollow, unfollow_docs))
		.api_route("/following/", get_with(following, following_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) | Self::NotFollowing(..) => StatusCode::NOT_FOUND,
			Self::SelfFollow => StatusCode::BAD_REQUEST,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownUser(username) => error::Message::new("unknown_user")
				.detail("username", username.as_str())
				.into_vec(),
			Self::NotFollowing(username) => error::Message::new("not_following")
				.detail("username", username.as_str())
				.into_vec(),
			Self::SelfFollow => error::Message::new("self_follow").into_vec(),
		}
	}
}
