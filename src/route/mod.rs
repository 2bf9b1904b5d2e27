use aide::axum::ApiRouter;

use crate::AppState;

pub mod auth;
pub mod comment;
pub mod docs;
pub mod model;
pub mod post;
pub mod profile;
pub mod url;

/// Every page of the blog. The authentication routes are returned separately by
/// [`auth::routes`] so that they can be rate limited on their own.
pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new()
		.merge(post::routes())
		.merge(comment::routes())
		.merge(profile::routes())
		.merge(docs::routes())
}
