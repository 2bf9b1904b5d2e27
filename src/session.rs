use uuid::Uuid;

pub const COOKIE_NAME: &str = "session";

/// Creates a session cookie with no expiry
pub fn create_cookie(session_id: Uuid) -> cookie::Cookie<'static> {
	cookie::Cookie::build((COOKIE_NAME, session_id.to_string()))
		.secure(!cfg!(debug_assertions))
		.http_only(true)
		.same_site(cookie::SameSite::Lax)
		.path("/")
		.into()
}

/// Creates an empty session cookie used to invalidate a previous one
pub fn clear_cookie() -> cookie::Cookie<'static> {
	cookie::Cookie::build(COOKIE_NAME)
		.http_only(true)
		.path("/")
		.max_age(cookie::time::Duration::ZERO)
		.into()
}

/// Finds the session id among the `Cookie` header values of a request.
///
/// Returns `None` when there is no session cookie and `Some(Err(..))` when its
/// value is not a session id.
pub fn find_session_id<'a>(
	headers: impl IntoIterator<Item = &'a str>,
) -> Option<Result<Uuid, uuid::Error>> {
	headers
		.into_iter()
		.flat_map(cookie::Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == COOKIE_NAME)
		.map(|cookie| Uuid::parse_str(cookie.value()))
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_find_session_id() {
		let id = Uuid::new_v4();
		let header = format!("theme=dark; {COOKIE_NAME}={id}");

		assert_eq!(find_session_id([header.as_str()]).unwrap().unwrap(), id);
	}

	#[test]
	fn test_find_session_id_missing() {
		assert!(find_session_id(["theme=dark"]).is_none());
		assert!(find_session_id(std::iter::empty::<&str>()).is_none());
	}

	#[test]
	fn test_find_session_id_invalid() {
		let header = format!("{COOKIE_NAME}=not-a-uuid");

		assert!(find_session_id([header.as_str()]).unwrap().is_err());
	}

	#[test]
	fn test_clear_cookie_expires() {
		let cookie = clear_cookie();

		assert_eq!(cookie.name(), COOKIE_NAME);
		assert_eq!(cookie.max_age(), Some(cookie::time::Duration::ZERO));
	}
}
