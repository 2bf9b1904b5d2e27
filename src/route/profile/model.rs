use schemars::JsonSchema;
use serde::Serialize;

use crate::route::{auth::model::User, model::Paginated, post::model::PostEntry};

/// Context of `blog/profile.html`.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ProfilePage {
	pub profile: User,
	/// Every post of the profile owner, including unpublished ones.
	pub page_obj: Paginated<PostEntry>,
	/// Whether the viewer follows the profile owner.
	pub is_subscriber: bool,
}
