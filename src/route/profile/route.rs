use axum::{extract::State, Json};
use macros::route;

use crate::{
	error::ErrorBody,
	extract::{Form, Path, Query, Session, Viewer},
	form::BoundForm,
	openapi::tag,
	route::{
		auth::model::{User, UserForm},
		model::{PageQuery, UsernamePath},
		post::{model::FeedPage, query::PostFilter},
		url,
	},
	view::{Outcome, Template},
	Database,
};

use super::{model, Error, RouteError};

const PROFILE_TEMPLATE: &str = "blog/profile.html";
const USER_TEMPLATE: &str = "blog/user.html";
const FOLLOWING_TEMPLATE: &str = "blog/following.html";

async fn find_user(database: &Database, username: &str) -> Result<User, RouteError> {
	let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE username = $1"#)
		.bind(username)
		.fetch_optional(database)
		.await?
		.ok_or_else(|| Error::UnknownUser(username.to_owned()))?;

	Ok(user)
}

/// Returns `true` if `user_id` follows `following_id`.
pub async fn is_following(
	database: &Database,
	user_id: uuid::Uuid,
	following_id: uuid::Uuid,
) -> Result<bool, sqlx::Error> {
	sqlx::query_scalar::<_, bool>(
		"SELECT EXISTS (SELECT 1 FROM follow WHERE user_id = $1 AND following_id = $2)",
	)
	.bind(user_id)
	.bind(following_id)
	.fetch_one(database)
	.await
}

/// Profile
/// Returns a user's profile with a page of all their posts, newest first.
#[route(tag = tag::PROFILE, response(status = 404, description = "The user does not exist.", shape = "Json<ErrorBody<'static>>"))]
pub async fn profile(
	State(database): State<Database>,
	viewer: Viewer,
	Path(path): Path<UsernamePath>,
	Query(page): Query<PageQuery>,
) -> Result<Template<model::ProfilePage>, RouteError> {
	let profile = find_user(&database, &path.username).await?;
	let page_obj = PostFilter::all()
		.by_author(profile.id)
		.paginate(&database, page.request())
		.await?;

	let is_subscriber = match viewer.user() {
		Some(user) => is_following(&database, user.id, profile.id).await?,
		None => false,
	};

	Ok(Template::new(
		PROFILE_TEMPLATE,
		model::ProfilePage {
			profile,
			page_obj,
			is_subscriber,
		},
	))
}

/// Edit profile page
/// Renders the profile form filled in with the current values.
#[route(tag = tag::PROFILE, login)]
pub async fn edit_form(session: Session) -> Template<BoundForm<UserForm>> {
	Template::new(USER_TEMPLATE, BoundForm::new(UserForm::from(&session.user)))
}

/// Edit profile
/// Saves the submitted values onto your own profile and redirects to it.
/// Invalid submissions and taken usernames render the form again with errors.
#[route(tag = tag::PROFILE, login)]
pub async fn edit(
	State(database): State<Database>,
	session: Session,
	Form(form): Form<UserForm>,
) -> Result<Outcome<BoundForm<UserForm>>, RouteError> {
	let bound = BoundForm::validate(form);

	if !bound.is_valid() {
		return Ok(Template::new(USER_TEMPLATE, bound).into());
	}

	let form = &bound.form;
	let updated = sqlx::query(
		r#"
			UPDATE "user"
			SET username = $1, first_name = $2, last_name = $3, email = $4
			WHERE id = $5
		"#,
	)
	.bind(&form.username)
	.bind(&form.first_name)
	.bind(&form.last_name)
	.bind(&form.email)
	.bind(session.user.id)
	.execute(&database)
	.await;

	if let Err(sqlx::Error::Database(ref error)) = updated {
		if error.constraint() == Some("user_username_key") {
			let bound = bound.with_error("username", "A user with that username already exists.");

			return Ok(Template::new(USER_TEMPLATE, bound).into());
		}
	}

	updated?;

	Ok(Outcome::redirect(url::profile(&bound.form.username)))
}

/// Follow user
/// Subscribes to a user's posts and redirects to their profile.
/// Following someone twice has no further effect.
#[route(tag = tag::PROFILE, login, response(status = 400, description = "Users cannot follow themselves.", shape = "Json<ErrorBody<'static>>"))]
pub async fn follow(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<UsernamePath>,
) -> Result<Outcome<()>, RouteError> {
	let following = find_user(&database, &path.username).await?;

	if following.id == session.user.id {
		return Err(Error::SelfFollow.into());
	}

	sqlx::query(
		r#"
			INSERT INTO follow (user_id, following_id) VALUES ($1, $2)
			ON CONFLICT ON CONSTRAINT follow_user_id_following_id_key DO NOTHING
		"#,
	)
	.bind(session.user.id)
	.bind(following.id)
	.execute(&database)
	.await?;

	Ok(Outcome::redirect(url::profile(&following.username)))
}

/// Unfollow user
/// Unsubscribes from a user's posts and redirects to their profile.
#[route(tag = tag::PROFILE, login, response(status = 404, description = "The user does not exist or is not followed.", shape = "Json<ErrorBody<'static>>"))]
pub async fn unfollow(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<UsernamePath>,
) -> Result<Outcome<()>, RouteError> {
	let following = find_user(&database, &path.username).await?;

	let deleted = sqlx::query("DELETE FROM follow WHERE user_id = $1 AND following_id = $2")
		.bind(session.user.id)
		.bind(following.id)
		.execute(&database)
		.await?;

	if deleted.rows_affected() == 0 {
		return Err(Error::NotFollowing(following.username).into());
	}

	Ok(Outcome::redirect(url::profile(&following.username)))
}

/// Following feed
/// Returns a page of posts by the users you follow, newest first.
#[route(tag = tag::PROFILE, login)]
pub async fn following(
	State(database): State<Database>,
	session: Session,
	Query(page): Query<PageQuery>,
) -> Result<Template<FeedPage>, RouteError> {
	let page_obj = PostFilter::all()
		.followed_by(session.user.id)
		.paginate(&database, page.request())
		.await?;

	Ok(Template::new(FOLLOWING_TEMPLATE, FeedPage { page_obj }))
}
