//! Form binding: lenient field parsers for HTML inputs and the [`BoundForm`]
//! wrapper that carries submitted values together with their errors.

use std::{collections::BTreeMap, num::ParseIntError};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationErrors};

/// Key for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Field name mapped to the messages shown next to it.
pub type FormErrors = BTreeMap<String, Vec<String>>;

/// Formats accepted for `datetime-local` and plain text inputs, tried in order
/// after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
	"%Y-%m-%dT%H:%M",
	"%Y-%m-%dT%H:%M:%S",
	"%Y-%m-%d %H:%M",
	"%Y-%m-%d %H:%M:%S",
];

/// Text inputs are stripped of surrounding whitespace, so that a blank value
/// fails a `length(min = 1)` check.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	let value = String::deserialize(deserializer)?;

	Ok(value.trim().to_owned())
}

/// A checkbox is only submitted when ticked, usually with the value `on`.
///
/// Use together with `#[serde(default)]`.
pub fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	let value = String::deserialize(deserializer)?;

	Ok(matches!(
		value.trim().to_ascii_lowercase().as_str(),
		"on" | "true" | "1" | "yes"
	))
}

/// Parses the id submitted by an optional select, which is an empty string
/// when nothing is chosen.
pub fn parse_choice(value: &str) -> Result<Option<i64>, ParseIntError> {
	match value.trim() {
		"" => Ok(None),
		value => value.parse().map(Some),
	}
}

/// Parses a publication date; a blank value means "now".
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
	let value = value.trim();

	if value.is_empty() {
		return Some(Utc::now());
	}

	if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
		return Some(datetime.with_timezone(&Utc));
	}

	DATETIME_FORMATS
		.iter()
		.find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
		.map(|naive| Utc.from_utc_datetime(&naive))
}

/// Formats a date the way a `datetime-local` input submits it.
pub fn format_datetime(datetime: DateTime<Utc>) -> String {
	datetime.format(DATETIME_FORMATS[0]).to_string()
}

/// Converts validation errors into the per-field messages of a form.
pub fn form_errors(errors: &ValidationErrors) -> FormErrors {
	errors
		.field_errors()
		.into_iter()
		.map(|(field, errors)| {
			let messages = errors
				.iter()
				.map(|error| {
					error
						.message
						.as_ref()
						.map_or_else(|| error.code.to_string(), ToString::to_string)
				})
				.collect();

			(field.to_string(), messages)
		})
		.collect()
}

/// Submitted form values together with their validation errors, as rendered
/// back to the user.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BoundForm<F> {
	pub form: F,
	pub errors: FormErrors,
}

impl<F> BoundForm<F> {
	/// A form without errors, such as an empty or pre-filled one.
	pub fn new(form: F) -> Self {
		Self {
			form,
			errors: FormErrors::new(),
		}
	}

	/// Adds an error to `field`.
	pub fn with_error(mut self, field: &str, message: impl Into<String>) -> Self {
		self.errors
			.entry(field.to_owned())
			.or_default()
			.push(message.into());
		self
	}

	pub fn is_valid(&self) -> bool {
		self.errors.is_empty()
	}
}

impl<F: Validate> BoundForm<F> {
	/// Binds submitted values, running the field validators.
	pub fn validate(form: F) -> Self {
		let errors = form
			.validate()
			.err()
			.map(|errors| form_errors(&errors))
			.unwrap_or_default();

		Self { form, errors }
	}
}

#[cfg(test)]
mod test {
	use chrono::{Datelike, Timelike};

	use super::*;

	#[derive(Debug, Deserialize, Validate)]
	struct Input {
		#[validate(length(min = 1, message = "required"))]
		#[serde(default, deserialize_with = "trimmed")]
		title: String,
		#[serde(default, deserialize_with = "checkbox")]
		published: bool,
	}

	fn parse(query: &str) -> Input {
		serde_urlencoded::from_str::<Input>(query).unwrap()
	}

	#[test]
	fn test_trimmed() {
		assert_eq!(parse("title=+hello%20").title, "hello");
		assert_eq!(parse("title=a+b").title, "a b");
		assert!(!BoundForm::validate(parse("title=+++")).is_valid());
	}

	#[test]
	fn test_checkbox() {
		assert!(parse("title=a&published=on").published);
		assert!(parse("title=a&published=true").published);
		assert!(!parse("title=a").published);
	}

	#[test]
	fn test_parse_choice() {
		assert_eq!(parse_choice(""), Ok(None));
		assert_eq!(parse_choice(" 7 "), Ok(Some(7)));
		assert!(parse_choice("seven").is_err());
	}

	#[test]
	fn test_parse_datetime() {
		let date = parse_datetime("2024-03-01T12:30").unwrap();

		assert_eq!((date.year(), date.month(), date.day()), (2024, 3, 1));
		assert_eq!((date.hour(), date.minute()), (12, 30));
		assert_eq!(format_datetime(date), "2024-03-01T12:30");

		let date = parse_datetime("2024-03-01T12:30:00Z").unwrap();

		assert_eq!(date.hour(), 12);
		assert!(parse_datetime("yesterday").is_none());
		assert!(parse_datetime("01.03.2024 12:30").is_none());
	}

	#[test]
	fn test_blank_date_is_now() {
		let before = Utc::now();

		assert!(parse_datetime(" ").unwrap() >= before);
	}

	#[test]
	fn test_bound_form_errors() {
		let bound = BoundForm::validate(parse(""));

		assert!(!bound.is_valid());
		assert_eq!(bound.errors["title"], vec!["required".to_owned()]);

		let bound = BoundForm::validate(parse("title=hello"));

		assert!(bound.is_valid());
		assert!(!bound.with_error("category", "unknown").is_valid());
	}
}
