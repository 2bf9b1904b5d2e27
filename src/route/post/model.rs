use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
	form::{self, BoundForm},
	guard::Authored,
	route::{
		comment::model::{CommentEntry, CommentForm},
		model::Paginated,
	},
};

/// A single post, written by a user.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	pub id: i64,
	pub title: String,
	/// The body of the post.
	pub text: String,
	/// The post is hidden from feeds until this time.
	pub pub_date: DateTime<Utc>,
	/// Unpublished posts are only visible to their author.
	pub is_published: bool,
	/// The user that wrote the post.
	pub author_id: Uuid,
	pub category_id: Option<i64>,
	pub location_id: Option<i64>,
	/// The creation time of the post.
	pub created_at: DateTime<Utc>,
}

impl Authored for Post {
	fn author_id(&self) -> Uuid {
		self.author_id
	}
}

/// Submitted form fields of a [`Post`].
///
/// The date and the chosen category and location are kept as entered, so a
/// value that does not parse is shown back next to its error.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate)]
pub struct PostForm {
	#[serde(default, deserialize_with = "crate::form::trimmed")]
	#[validate(length(min = 1, max = 256, message = "Between 1 and 256 characters."))]
	pub title: String,
	#[serde(default, deserialize_with = "crate::form::trimmed")]
	#[validate(length(min = 1, message = "This field is required."))]
	pub text: String,
	/// A blank value means now.
	#[serde(default, deserialize_with = "crate::form::trimmed")]
	pub pub_date: String,
	#[serde(default, deserialize_with = "crate::form::checkbox")]
	pub is_published: bool,
	#[serde(default, deserialize_with = "crate::form::trimmed")]
	pub category_id: String,
	#[serde(default, deserialize_with = "crate::form::trimmed")]
	pub location_id: String,
}

impl PostForm {
	/// The form shown on the create page: published, dated now.
	pub fn empty() -> Self {
		Self {
			title: String::new(),
			text: String::new(),
			pub_date: form::format_datetime(Utc::now()),
			is_published: true,
			category_id: String::new(),
			location_id: String::new(),
		}
	}
}

impl From<&Post> for PostForm {
	fn from(post: &Post) -> Self {
		let choice = |id: Option<i64>| id.map(|id| id.to_string()).unwrap_or_default();

		Self {
			title: post.title.clone(),
			text: post.text.clone(),
			pub_date: form::format_datetime(post.pub_date),
			is_published: post.is_published,
			category_id: choice(post.category_id),
			location_id: choice(post.location_id),
		}
	}
}

/// The values of a post form that parsed and passed every check.
#[derive(Debug)]
pub struct PostValues {
	pub title: String,
	pub text: String,
	pub pub_date: DateTime<Utc>,
	pub is_published: bool,
	pub category_id: Option<i64>,
	pub location_id: Option<i64>,
}

/// A post as listed in feeds and shown on its detail page, together with
/// the names of everything it refers to.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct PostEntry {
	#[serde(flatten)]
	#[sqlx(flatten)]
	pub post: Post,
	pub author_username: String,
	pub category_slug: Option<String>,
	pub category_title: Option<String>,
	pub category_is_published: Option<bool>,
	/// Only set when the location is published.
	pub location_name: Option<String>,
	pub comment_count: i64,
}

impl PostEntry {
	/// Whether anyone, not just the author, may see the post at `now`.
	pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
		self.post.is_published
			&& self.post.pub_date <= now
			&& self.category_is_published.unwrap_or(true)
	}
}

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Category {
	pub id: i64,
	pub title: String,
	pub description: String,
	/// Identifies the category in its feed URL.
	pub slug: String,
	pub is_published: bool,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Location {
	pub id: i64,
	pub name: String,
	pub is_published: bool,
	pub created_at: DateTime<Utc>,
}

/// Context of `blog/index.html` and `blog/following.html`.
#[derive(Debug, Serialize, JsonSchema)]
pub struct FeedPage {
	pub page_obj: Paginated<PostEntry>,
}

/// Context of `blog/category.html`.
#[derive(Debug, Serialize, JsonSchema)]
pub struct CategoryPage {
	pub category: Category,
	pub page_obj: Paginated<PostEntry>,
}

/// Context of `blog/detail.html`.
#[derive(Debug, Serialize, JsonSchema)]
pub struct DetailPage {
	pub post: PostEntry,
	/// An empty comment form.
	pub form: BoundForm<CommentForm>,
	/// Comments on the post, oldest first.
	pub comments: Vec<CommentEntry>,
}

/// Context of `blog/create.html`, shared by the create, edit and delete pages.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PostPage {
	#[serde(flatten)]
	pub form: BoundForm<PostForm>,
	/// The post being edited or deleted.
	pub post: Option<Post>,
	pub categories: Vec<Category>,
	pub locations: Vec<Location>,
}
