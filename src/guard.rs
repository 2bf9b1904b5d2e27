//! Ownership checks shared by every mutation endpoint.

use uuid::Uuid;

use crate::extract::Session;

/// Content that belongs to the user who wrote it.
pub trait Authored {
	fn author_id(&self) -> Uuid;
}

/// The session user is not the author of the content.
#[derive(Debug, thiserror::Error)]
#[error("not the author")]
pub struct NotAuthor;

/// Allows the request through only if the session user wrote `item`.
///
/// ```rust
/// guard::author(&session, &post).map_err(|_| Error::NotAuthor(post.id))?;
/// ```
pub fn author<T: Authored>(session: &Session, item: &T) -> Result<(), NotAuthor> {
	if session.is_author_of(item) {
		Ok(())
	} else {
		Err(NotAuthor)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::test::user_with_id;

	struct Note(Uuid);

	impl Authored for Note {
		fn author_id(&self) -> Uuid {
			self.0
		}
	}

	#[test]
	fn test_author_allowed() {
		let session = Session {
			id: Uuid::new_v4(),
			user: user_with_id(Uuid::new_v4(), "alice"),
		};

		assert!(author(&session, &Note(session.user.id)).is_ok());
	}

	#[test]
	fn test_other_user_denied() {
		let session = Session {
			id: Uuid::new_v4(),
			user: user_with_id(Uuid::new_v4(), "alice"),
		};

		assert!(author(&session, &Note(Uuid::new_v4())).is_err());
	}
}
