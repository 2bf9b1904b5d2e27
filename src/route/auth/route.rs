use argon2::Argon2;
use axum::extract::State;
use macros::route;
use uuid::Uuid;

use crate::{
	extract::{Form, Query, Session},
	form::{BoundForm, NON_FIELD_ERRORS},
	openapi::tag,
	route::url,
	session,
	view::{Outcome, Template},
	AppState, Database,
};

use super::{model, Error, RouteError};

pub const KEY_LENGTH: usize = 32;

const LOGIN_TEMPLATE: &str = "registration/login.html";
const REGISTRATION_TEMPLATE: &str = "registration/registration_form.html";

/// Hashes a password with Argon2, using the user's id as a salt.
/// Since this is only used for logging in and creating a new password,
/// the scope of this function can remain in here with no issues.
pub(crate) fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

/// Registration page
/// Renders an empty registration form.
#[route(tag = tag::AUTH)]
pub async fn registration_form() -> Template<BoundForm<model::RegistrationForm>> {
	Template::new(
		REGISTRATION_TEMPLATE,
		BoundForm::new(model::RegistrationForm::default()),
	)
}

/// Register account
/// Creates an account and logs in to it, redirecting to the new profile.
/// Invalid submissions and taken usernames render the form again with errors.
#[route(tag = tag::AUTH, response(status = 303, description = "Registered, redirects to the new profile."))]
pub async fn register(
	State(state): State<AppState>,
	Form(form): Form<model::RegistrationForm>,
) -> Result<Outcome<BoundForm<model::RegistrationForm>>, RouteError> {
	let bound = BoundForm::validate(form);

	if !bound.is_valid() {
		return Ok(Template::new(REGISTRATION_TEMPLATE, bound).into());
	}

	let form = &bound.form;
	let user_id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &form.password, &user_id).map_err(Error::Argon)?;

	let mut tx = state.database.begin().await?;

	let inserted = sqlx::query(
		r#"
			INSERT INTO "user" (id, username, email, password) VALUES ($1, $2, $3, $4)
		"#,
	)
	.bind(user_id)
	.bind(&form.username)
	.bind(&form.email)
	.bind(&hashed[..])
	.execute(&mut *tx)
	.await;

	if let Err(sqlx::Error::Database(ref error)) = inserted {
		if error.constraint() == Some("user_username_key") {
			let bound = bound.with_error("username", "A user with that username already exists.");

			return Ok(Template::new(REGISTRATION_TEMPLATE, bound).into());
		}
	}

	inserted?;

	let session_id = sqlx::query_scalar::<_, Uuid>(
		r#"
			INSERT INTO session (user_id) VALUES ($1) RETURNING id
		"#,
	)
	.bind(user_id)
	.fetch_one(&mut *tx)
	.await?;

	tx.commit().await?;

	tracing::info!(username = %bound.form.username, "registered user");

	Ok(Outcome::redirect(url::profile(&bound.form.username))
		.with_cookie(session::create_cookie(session_id)))
}

/// Login page
/// Renders an empty login form, remembering where to go afterwards.
#[route(tag = tag::AUTH)]
pub async fn login_form(Query(query): Query<model::NextQuery>) -> Template<model::LoginPage> {
	Template::new(
		LOGIN_TEMPLATE,
		model::LoginPage {
			form: BoundForm::new(model::LoginForm::default()),
			next: query.next,
		},
	)
}

/// Log in
/// Logs in to an account, setting a session cookie and redirecting to `next`
/// (or the profile). Wrong credentials render the form again.
#[route(tag = tag::AUTH, response(status = 303, description = "Logged in successfully."))]
pub async fn login(
	State(state): State<AppState>,
	Query(query): Query<model::NextQuery>,
	Form(form): Form<model::LoginForm>,
) -> Result<Outcome<model::LoginPage>, RouteError> {
	let bound = BoundForm::validate(form);
	let render = |form: BoundForm<model::LoginForm>| -> Outcome<model::LoginPage> {
		Template::new(
			LOGIN_TEMPLATE,
			model::LoginPage {
				form,
				next: query.next.clone(),
			},
		)
		.into()
	};

	if !bound.is_valid() {
		return Ok(render(bound));
	}

	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE username = $1"#)
		.bind(&bound.form.username)
		.fetch_optional(&state.database)
		.await?;

	let authenticated = match user {
		Some(user) => {
			let hashed =
				hash_password(&state.hasher, &bound.form.password, &user.id).map_err(Error::Argon)?;

			(user.password == hashed).then_some(user)
		}
		None => None,
	};

	let Some(user) = authenticated else {
		return Ok(render(bound.with_error(
			NON_FIELD_ERRORS,
			"Please enter a correct username and password.",
		)));
	};

	let session_id = sqlx::query_scalar::<_, Uuid>(
		"INSERT INTO session (user_id) VALUES ($1) RETURNING id",
	)
	.bind(user.id)
	.fetch_one(&state.database)
	.await?;

	let location = query
		.next
		.as_deref()
		.and_then(url::local)
		.map_or_else(|| url::profile(&user.username), ToOwned::to_owned);

	Ok(Outcome::redirect(location).with_cookie(session::create_cookie(session_id)))
}

/// Log out
/// Ends the current session and redirects to the home page.
#[route(tag = tag::AUTH, login, response(status = 303, description = "Logged out successfully."))]
pub async fn logout(
	State(database): State<Database>,
	session: Session,
) -> Result<Outcome<()>, RouteError> {
	sqlx::query("DELETE FROM session WHERE id = $1")
		.bind(session.id)
		.execute(&database)
		.await?;

	Ok(Outcome::redirect(url::index()).with_cookie(session::clear_cookie()))
}
