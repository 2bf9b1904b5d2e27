//! Builds the post listings shared by every feed.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
	route::model::{PageRequest, Paginated, Window, PAGE_SIZE},
	Database,
};

use super::model::PostEntry;

/// Columns selected for a [`PostEntry`].
const ENTRY_COLUMNS: &str = r#"
	SELECT
		post.*,
		"user".username AS author_username,
		category.slug AS category_slug,
		category.title AS category_title,
		category.is_published AS category_is_published,
		CASE WHEN location.is_published THEN location.name END AS location_name,
		(SELECT COUNT(*) FROM comment WHERE comment.post_id = post.id) AS comment_count
"#;

const ENTRY_FROM: &str = r#"
	FROM post
	JOIN "user" ON "user".id = post.author_id
	LEFT JOIN category ON category.id = post.category_id
	LEFT JOIN location ON location.id = post.location_id
"#;

/// A restriction of the post table, newest first.
///
/// ```rust
/// let page = PostFilter::visible(Utc::now())
///   .in_category(category.id)
///   .paginate(&database, query.request())
///   .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
	visible_at: Option<DateTime<Utc>>,
	category_id: Option<i64>,
	author_id: Option<Uuid>,
	followed_by: Option<Uuid>,
}

impl PostFilter {
	/// Every post, including unpublished and scheduled ones.
	pub fn all() -> Self {
		Self::default()
	}

	/// Posts that are published, dated no later than `now` and not in an
	/// unpublished category.
	pub fn visible(now: DateTime<Utc>) -> Self {
		Self {
			visible_at: Some(now),
			..Self::default()
		}
	}

	pub fn in_category(mut self, category_id: i64) -> Self {
		self.category_id = Some(category_id);
		self
	}

	pub fn by_author(mut self, author_id: Uuid) -> Self {
		self.author_id = Some(author_id);
		self
	}

	/// Posts written by anyone `user_id` follows.
	pub fn followed_by(mut self, user_id: Uuid) -> Self {
		self.followed_by = Some(user_id);
		self
	}

	fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>) {
		builder.push(" WHERE TRUE");

		if let Some(now) = self.visible_at {
			builder
				.push(" AND post.is_published AND post.pub_date <= ")
				.push_bind(now)
				.push(" AND (post.category_id IS NULL OR category.is_published)");
		}

		if let Some(category_id) = self.category_id {
			builder.push(" AND post.category_id = ").push_bind(category_id);
		}

		if let Some(author_id) = self.author_id {
			builder.push(" AND post.author_id = ").push_bind(author_id);
		}

		if let Some(user_id) = self.followed_by {
			builder
				.push(" AND post.author_id IN (SELECT following_id FROM follow WHERE user_id = ")
				.push_bind(user_id)
				.push(")");
		}
	}

	fn count_query(&self) -> QueryBuilder<'static, Postgres> {
		let mut builder = QueryBuilder::new("SELECT COUNT(*)");

		builder.push(ENTRY_FROM);
		self.push_conditions(&mut builder);
		builder
	}

	fn page_query(&self, window: &Window) -> QueryBuilder<'static, Postgres> {
		let mut builder = QueryBuilder::new(ENTRY_COLUMNS);

		builder.push(ENTRY_FROM);
		self.push_conditions(&mut builder);
		builder
			.push(" ORDER BY post.pub_date DESC, post.id DESC LIMIT ")
			.push_bind(window.limit())
			.push(" OFFSET ")
			.push_bind(window.offset());
		builder
	}

	pub async fn count(&self, database: &Database) -> Result<i64, sqlx::Error> {
		let (count,) = self
			.count_query()
			.build_query_as::<(i64,)>()
			.fetch_one(database)
			.await?;

		Ok(count)
	}

	/// Returns the requested page of matching posts, clamped to the pages that exist.
	pub async fn paginate(
		&self,
		database: &Database,
		request: PageRequest,
	) -> Result<Paginated<PostEntry>, sqlx::Error> {
		let window = Window::new(self.count(database).await?, request, PAGE_SIZE);
		let posts = self
			.page_query(&window)
			.build_query_as::<PostEntry>()
			.fetch_all(database)
			.await?;

		Ok(window.with_items(posts))
	}
}

/// Looks up a single post by id, regardless of its visibility.
pub async fn find_entry(database: &Database, post_id: i64) -> Result<Option<PostEntry>, sqlx::Error> {
	let mut builder = QueryBuilder::<Postgres>::new(ENTRY_COLUMNS);

	builder
		.push(ENTRY_FROM)
		.push(" WHERE post.id = ")
		.push_bind(post_id);

	builder
		.build_query_as::<PostEntry>()
		.fetch_optional(database)
		.await
}
