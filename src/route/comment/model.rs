use chrono::{DateTime, Utc};
use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{form::BoundForm, guard::Authored, Database};

/// A comment left on a post.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Comment {
	#[serde(skip_deserializing)]
	pub id: i64,
	#[serde(default, deserialize_with = "crate::form::trimmed")]
	#[validate(length(min = 1, message = "This field is required."))]
	pub text: String,
	#[serde(skip_deserializing)]
	pub post_id: i64,
	#[serde(skip_deserializing)]
	pub author_id: Uuid,
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
}

impl Authored for Comment {
	fn author_id(&self) -> Uuid {
		self.author_id
	}
}

impl Default for CommentForm {
	fn default() -> Self {
		Self {
			text: String::new(),
		}
	}
}

/// A comment with the username of its author.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct CommentEntry {
	#[serde(flatten)]
	#[sqlx(flatten)]
	pub comment: Comment,
	pub author_username: String,
}

impl CommentEntry {
	/// Returns the comments on a post, oldest first.
	pub async fn for_post(database: &Database, post_id: i64) -> Result<Vec<Self>, sqlx::Error> {
		sqlx::query_as::<_, Self>(
			r#"
				SELECT comment.*, "user".username AS author_username
				FROM comment
				JOIN "user" ON "user".id = comment.author_id
				WHERE comment.post_id = $1
				ORDER BY comment.created_at, comment.id
			"#,
		)
		.bind(post_id)
		.fetch_all(database)
		.await
	}
}

/// Context of `blog/comment.html`. The form is only present on the edit page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct CommentPage {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub form: Option<BoundForm<CommentForm>>,
	pub comment: Comment,
}
