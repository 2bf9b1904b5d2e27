use axum::{extract::State, Json};
use macros::route;

use crate::{
	error::ErrorBody,
	extract::{Form, Path, Session},
	form::BoundForm,
	guard,
	openapi::tag,
	route::{
		model::{CommentPath, PostPath},
		url,
	},
	view::{Outcome, Template},
	Database,
};

use super::{model, Error, RouteError};

const COMMENT_TEMPLATE: &str = "blog/comment.html";

/// Loads a comment of the post in `path` and checks that the session user wrote it.
async fn find_own_comment(
	database: &Database,
	session: &Session,
	path: &CommentPath,
) -> Result<model::Comment, RouteError> {
	let comment = sqlx::query_as::<_, model::Comment>(
		"SELECT * FROM comment WHERE id = $1 AND post_id = $2",
	)
	.bind(path.comment_id)
	.bind(path.post_id)
	.fetch_optional(database)
	.await?
	.ok_or(Error::UnknownComment(path.comment_id))?;

	guard::author(session, &comment).map_err(|_| Error::NotAuthor {
		post_id: path.post_id,
		comment_id: path.comment_id,
	})?;

	Ok(comment)
}

/// Add comment
/// Comments on a post and redirects back to it.
/// Invalid comments are dropped without notice.
#[route(tag = tag::COMMENT, login, response(status = 404, description = "The post does not exist.", shape = "Json<ErrorBody<'static>>"))]
pub async fn add(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<PostPath>,
	Form(form): Form<model::CommentForm>,
) -> Result<Outcome<()>, RouteError> {
	let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM post WHERE id = $1)")
		.bind(path.post_id)
		.fetch_one(&database)
		.await?;

	if !exists {
		return Err(Error::UnknownPost(path.post_id).into());
	}

	let bound = BoundForm::validate(form);

	if bound.is_valid() {
		sqlx::query("INSERT INTO comment (text, post_id, author_id) VALUES ($1, $2, $3)")
			.bind(&bound.form.text)
			.bind(path.post_id)
			.bind(session.user.id)
			.execute(&database)
			.await?;
	} else {
		tracing::debug!(post_id = path.post_id, errors = ?bound.errors, "discarded invalid comment");
	}

	Ok(Outcome::redirect(url::post_detail(path.post_id)))
}

/// Edit page
/// Renders the comment form filled in with the current text.
#[route(tag = tag::COMMENT, login)]
pub async fn edit_form(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<CommentPath>,
) -> Result<Template<model::CommentPage>, RouteError> {
	let comment = find_own_comment(&database, &session, &path).await?;
	let form = model::CommentForm {
		text: comment.text.clone(),
	};

	Ok(Template::new(
		COMMENT_TEMPLATE,
		model::CommentPage {
			form: Some(BoundForm::new(form)),
			comment,
		},
	))
}

/// Edit comment
/// Saves the new text and redirects to the post.
/// Invalid text leaves the comment unchanged.
#[route(tag = tag::COMMENT, login)]
pub async fn edit(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<CommentPath>,
	Form(form): Form<model::CommentForm>,
) -> Result<Outcome<()>, RouteError> {
	let comment = find_own_comment(&database, &session, &path).await?;
	let bound = BoundForm::validate(form);

	if bound.is_valid() {
		sqlx::query("UPDATE comment SET text = $1 WHERE id = $2")
			.bind(&bound.form.text)
			.bind(comment.id)
			.execute(&database)
			.await?;
	} else {
		tracing::debug!(comment_id = comment.id, errors = ?bound.errors, "discarded invalid comment edit");
	}

	Ok(Outcome::redirect(url::post_detail(path.post_id)))
}

/// Delete page
/// Renders a confirmation page showing the comment.
#[route(tag = tag::COMMENT, login)]
pub async fn delete_form(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<CommentPath>,
) -> Result<Template<model::CommentPage>, RouteError> {
	let comment = find_own_comment(&database, &session, &path).await?;

	Ok(Template::new(
		COMMENT_TEMPLATE,
		model::CommentPage {
			form: None,
			comment,
		},
	))
}

/// Delete comment
/// Deletes the comment and redirects to the post.
#[route(tag = tag::COMMENT, login)]
pub async fn delete(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<CommentPath>,
) -> Result<Outcome<()>, RouteError> {
	let comment = find_own_comment(&database, &session, &path).await?;

	sqlx::query("DELETE FROM comment WHERE id = $1")
		.bind(comment.id)
		.execute(&database)
		.await?;

	Ok(Outcome::redirect(url::post_detail(path.post_id)))
}
