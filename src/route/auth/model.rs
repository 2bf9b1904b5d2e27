use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Usernames appear in profile URLs, so they are limited to ASCII letters,
/// digits and `_.@+-`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username
		.chars()
		.any(|c| !c.is_ascii_alphanumeric() && !"_.@+-".contains(c))
	{
		let mut error = ValidationError::new("username");
		error.message = Some("Letters, digits and _.@+- only.".into());

		return Err(error);
	}

	Ok(())
}

/// A single user.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	#[serde(skip_deserializing)]
	pub id: Uuid,
	/// The username that is displayed to the public and used in profile URLs.
	#[serde(default, deserialize_with = "crate::form::trimmed")]
	#[validate(
		length(min = 1, max = 150, message = "Between 1 and 150 characters."),
		custom(function = "validate_username")
	)]
	pub username: String,
	#[serde(default, deserialize_with = "crate::form::trimmed")]
	#[validate(length(max = 150, message = "At most 150 characters."))]
	pub first_name: String,
	#[serde(default, deserialize_with = "crate::form::trimmed")]
	#[validate(length(max = 150, message = "At most 150 characters."))]
	pub last_name: String,
	/// The user's email address, never shown on public pages.
	#[serde(default, deserialize_with = "crate::form::trimmed")]
	#[serde(skip_serializing)]
	#[validate(email)]
	pub email: String,
	/// The hashed password.
	#[serde(skip)]
	pub password: Vec<u8>,
	/// The creation time of the user.
	#[serde(skip_deserializing)]
	pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&User> for UserForm {
	fn from(user: &User) -> Self {
		Self {
			username: user.username.clone(),
			first_name: user.first_name.clone(),
			last_name: user.last_name.clone(),
			email: user.email.clone(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, JsonSchema)]
pub struct LoginForm {
	#[serde(default)]
	#[validate(length(min = 1, message = "This field is required."))]
	pub username: String,
	#[serde(default, skip_serializing)]
	#[validate(length(min = 1, message = "This field is required."))]
	pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, JsonSchema)]
pub struct RegistrationForm {
	#[serde(default)]
	#[validate(
		length(min = 1, max = 150, message = "Between 1 and 150 characters."),
		custom(function = "validate_username")
	)]
	pub username: String,
	#[serde(default)]
	#[validate(email)]
	pub email: String,
	#[serde(default, skip_serializing)]
	#[validate(length(min = 8, max = 128, message = "Between 8 and 128 characters."))]
	pub password: String,
}

/// The `?next=` parameter of the login page.
#[derive(Debug, Default, Deserialize, Validate, JsonSchema)]
pub struct NextQuery {
	pub next: Option<String>,
}

/// Context of the login page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct LoginPage {
	#[serde(flatten)]
	pub form: crate::form::BoundForm<LoginForm>,
	pub next: Option<String>,
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::*;

	fn form(username: &str, email: &str) -> UserForm {
		UserForm {
			username: username.into(),
			first_name: String::new(),
			last_name: String::new(),
			email: email.into(),
		}
	}

	#[test]
	fn test_username_charset() {
		assert!(validate_username("alice.b+c@d-e_f").is_ok());
		assert!(validate_username("al ice").is_err());
		assert!(validate_username("алиса").is_err());
	}

	#[test]
	fn test_user_form() {
		assert!(form("alice", "alice@example.com").validate().is_ok());
		assert!(form("", "alice@example.com").validate().is_err());
		assert!(form("alice", "not-an-email").validate().is_err());
	}

	#[test]
	fn test_user_form_keeps_email() {
		let value = serde_json::to_value(form("alice", "alice@example.com")).unwrap();

		assert_eq!(value["email"], "alice@example.com");
	}

	#[test]
	fn test_registration_password_length() {
		let form = RegistrationForm {
			username: "alice".into(),
			email: "alice@example.com".into(),
			password: "short".into(),
		};

		let errors = form.validate().unwrap_err();

		assert!(errors.field_errors().contains_key("password"));
	}
}
