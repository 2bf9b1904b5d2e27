use axum::{extract::State, Json};
use chrono::Utc;
use macros::route;

use crate::{
	error::ErrorBody,
	extract::{Form, Path, Query, Session, Viewer},
	form::{self, BoundForm},
	guard,
	openapi::tag,
	route::{
		comment::model::{CommentEntry, CommentForm},
		model::{CategoryPath, PageQuery, PostPath},
		url,
	},
	view::{Outcome, Template},
	Database,
};

use super::{model, query::PostFilter, Error, RouteError};

const INDEX_TEMPLATE: &str = "blog/index.html";
const CATEGORY_TEMPLATE: &str = "blog/category.html";
const DETAIL_TEMPLATE: &str = "blog/detail.html";
const CREATE_TEMPLATE: &str = "blog/create.html";

const INVALID_CHOICE: &str = "Select a valid choice.";
const INVALID_DATETIME: &str = "Enter a valid date/time.";

/// Loads a post and checks that the session user wrote it.
async fn find_own_post(
	database: &Database,
	session: &Session,
	post_id: i64,
) -> Result<model::Post, RouteError> {
	let post = sqlx::query_as::<_, model::Post>("SELECT * FROM post WHERE id = $1")
		.bind(post_id)
		.fetch_optional(database)
		.await?
		.ok_or(Error::UnknownPost(post_id))?;

	guard::author(session, &post).map_err(|_| Error::NotAuthor(post_id))?;

	Ok(post)
}

/// Resolves the id submitted by an optional select. `None` if it is not the
/// id of a row in `table`.
async fn find_choice(
	database: &Database,
	table: &'static str,
	value: &str,
) -> Result<Option<Option<i64>>, sqlx::Error> {
	let id = match form::parse_choice(value) {
		Ok(Some(id)) => id,
		Ok(None) => return Ok(Some(None)),
		Err(_) => return Ok(None),
	};

	let sql = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)");
	let exists = sqlx::query_scalar::<_, bool>(&sql)
		.bind(id)
		.fetch_one(database)
		.await?;

	Ok(exists.then_some(Some(id)))
}

/// Runs the field validators and parses the date and the chosen category and
/// location. Returns the form along with its errors if anything is wrong.
async fn bind_post(
	database: &Database,
	form: model::PostForm,
) -> Result<Result<model::PostValues, BoundForm<model::PostForm>>, sqlx::Error> {
	let mut bound = BoundForm::validate(form);

	let pub_date = form::parse_datetime(&bound.form.pub_date);
	let category_id = find_choice(database, "category", &bound.form.category_id).await?;
	let location_id = find_choice(database, "location", &bound.form.location_id).await?;

	if pub_date.is_none() {
		bound = bound.with_error("pub_date", INVALID_DATETIME);
	}

	if category_id.is_none() {
		bound = bound.with_error("category_id", INVALID_CHOICE);
	}

	if location_id.is_none() {
		bound = bound.with_error("location_id", INVALID_CHOICE);
	}

	match (pub_date, category_id, location_id) {
		(Some(pub_date), Some(category_id), Some(location_id)) if bound.is_valid() => {
			let form = bound.form;

			Ok(Ok(model::PostValues {
				title: form.title,
				text: form.text,
				pub_date,
				is_published: form.is_published,
				category_id,
				location_id,
			}))
		}
		_ => Ok(Err(bound)),
	}
}

/// Renders the post form along with the category and location choices.
async fn post_page(
	database: &Database,
	form: BoundForm<model::PostForm>,
	post: Option<model::Post>,
) -> Result<Template<model::PostPage>, sqlx::Error> {
	let categories = sqlx::query_as::<_, model::Category>("SELECT * FROM category ORDER BY title")
		.fetch_all(database)
		.await?;
	let locations = sqlx::query_as::<_, model::Location>("SELECT * FROM location ORDER BY name")
		.fetch_all(database)
		.await?;

	Ok(Template::new(
		CREATE_TEMPLATE,
		model::PostPage {
			form,
			post,
			categories,
			locations,
		},
	))
}

/// Home page
/// Returns a page of published posts, newest first.
#[route(tag = tag::POST)]
pub async fn index(
	State(database): State<Database>,
	Query(page): Query<PageQuery>,
) -> Result<Template<model::FeedPage>, RouteError> {
	let page_obj = PostFilter::visible(Utc::now())
		.paginate(&database, page.request())
		.await?;

	Ok(Template::new(INDEX_TEMPLATE, model::FeedPage { page_obj }))
}

/// Category feed
/// Returns a page of published posts in a published category.
#[route(tag = tag::POST, response(status = 404, description = "The category does not exist or is not published.", shape = "Json<ErrorBody<'static>>"))]
pub async fn category(
	State(database): State<Database>,
	Path(path): Path<CategoryPath>,
	Query(page): Query<PageQuery>,
) -> Result<Template<model::CategoryPage>, RouteError> {
	let category = sqlx::query_as::<_, model::Category>(
		"SELECT * FROM category WHERE slug = $1 AND is_published",
	)
	.bind(&path.category_slug)
	.fetch_optional(&database)
	.await?
	.ok_or_else(|| Error::UnknownCategory(path.category_slug.clone()))?;

	let page_obj = PostFilter::visible(Utc::now())
		.in_category(category.id)
		.paginate(&database, page.request())
		.await?;

	Ok(Template::new(
		CATEGORY_TEMPLATE,
		model::CategoryPage { category, page_obj },
	))
}

/// Post detail
/// Returns a post with its comments. Authors always see their own posts,
/// everyone else only sees published ones.
#[route(tag = tag::POST, response(status = 404, description = "The post does not exist or is hidden.", shape = "Json<ErrorBody<'static>>"))]
pub async fn detail(
	State(database): State<Database>,
	viewer: Viewer,
	Path(path): Path<PostPath>,
) -> Result<Template<model::DetailPage>, RouteError> {
	let post = super::query::find_entry(&database, path.post_id)
		.await?
		.filter(|post| viewer.is(post.post.author_id) || post.is_visible_at(Utc::now()))
		.ok_or(Error::UnknownPost(path.post_id))?;

	let comments = CommentEntry::for_post(&database, post.post.id).await?;

	Ok(Template::new(
		DETAIL_TEMPLATE,
		model::DetailPage {
			post,
			form: BoundForm::new(CommentForm::default()),
			comments,
		},
	))
}

/// Create page
/// Renders an empty post form.
#[route(tag = tag::POST, login)]
pub async fn create_form(
	State(database): State<Database>,
	_session: Session,
) -> Result<Template<model::PostPage>, RouteError> {
	Ok(post_page(&database, BoundForm::new(model::PostForm::empty()), None).await?)
}

/// Create post
/// Publishes a new post and redirects to the author's profile.
/// Invalid submissions render the form again with errors.
#[route(tag = tag::POST, login)]
pub async fn create(
	State(database): State<Database>,
	session: Session,
	Form(form): Form<model::PostForm>,
) -> Result<Outcome<model::PostPage>, RouteError> {
	let form = match bind_post(&database, form).await? {
		Ok(values) => values,
		Err(bound) => return Ok(post_page(&database, bound, None).await?.into()),
	};

	let post_id = sqlx::query_scalar::<_, i64>(
		r#"
			INSERT INTO post (title, text, pub_date, is_published, author_id, category_id, location_id)
			VALUES ($1, $2, $3, $4, $5, $6, $7)
			RETURNING id
		"#,
	)
	.bind(form.title)
	.bind(form.text)
	.bind(form.pub_date)
	.bind(form.is_published)
	.bind(session.user.id)
	.bind(form.category_id)
	.bind(form.location_id)
	.fetch_one(&database)
	.await?;

	tracing::info!(post_id, author = %session.user.username, "created post");

	Ok(Outcome::redirect(url::profile(&session.user.username)))
}

/// Edit page
/// Renders the post form filled in with the current values.
#[route(tag = tag::POST, login)]
pub async fn edit_form(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<PostPath>,
) -> Result<Template<model::PostPage>, RouteError> {
	let post = find_own_post(&database, &session, path.post_id).await?;
	let form = BoundForm::new(model::PostForm::from(&post));

	Ok(post_page(&database, form, Some(post)).await?)
}

/// Edit post
/// Saves the submitted values onto the post and redirects to it.
/// Invalid submissions render the form again with errors.
#[route(tag = tag::POST, login)]
pub async fn edit(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<PostPath>,
	Form(form): Form<model::PostForm>,
) -> Result<Outcome<model::PostPage>, RouteError> {
	let post = find_own_post(&database, &session, path.post_id).await?;
	let form = match bind_post(&database, form).await? {
		Ok(values) => values,
		Err(bound) => return Ok(post_page(&database, bound, Some(post)).await?.into()),
	};

	sqlx::query(
		r#"
			UPDATE post
			SET title = $1, text = $2, pub_date = $3, is_published = $4, category_id = $5, location_id = $6
			WHERE id = $7
		"#,
	)
	.bind(form.title)
	.bind(form.text)
	.bind(form.pub_date)
	.bind(form.is_published)
	.bind(form.category_id)
	.bind(form.location_id)
	.bind(post.id)
	.execute(&database)
	.await?;

	Ok(Outcome::redirect(url::post_detail(post.id)))
}

/// Delete page
/// Renders a confirmation page showing the post's current values.
#[route(tag = tag::POST, login)]
pub async fn delete_form(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<PostPath>,
) -> Result<Template<model::PostPage>, RouteError> {
	let post = find_own_post(&database, &session, path.post_id).await?;
	let form = BoundForm::new(model::PostForm::from(&post));

	Ok(post_page(&database, form, Some(post)).await?)
}

/// Delete post
/// Deletes the post along with its comments and redirects to the author's profile.
#[route(tag = tag::POST, login)]
pub async fn delete(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<PostPath>,
) -> Result<Outcome<()>, RouteError> {
	let post = find_own_post(&database, &session, path.post_id).await?;

	sqlx::query("DELETE FROM post WHERE id = $1")
		.bind(post.id)
		.execute(&database)
		.await?;

	tracing::info!(post_id = post.id, "deleted post");

	Ok(Outcome::redirect(url::profile(&session.user.username)))
}
