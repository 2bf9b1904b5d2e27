//! Paths of the pages that handlers redirect to.

pub fn index() -> String {
	"/".into()
}

pub fn post_detail(post_id: i64) -> String {
	format!("/posts/{post_id}/")
}

pub fn profile(username: &str) -> String {
	format!("/profile/{username}/")
}

/// The login page, returning to `next` once logged in.
pub fn login(next: Option<&str>) -> String {
	match next.and_then(|next| serde_urlencoded::to_string([("next", next)]).ok()) {
		Some(query) => format!("/auth/login/?{query}"),
		None => "/auth/login/".into(),
	}
}

/// Returns `next` if it is safe to redirect to, i.e. a path on this site.
pub fn local(next: &str) -> Option<&str> {
	(next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')).then_some(next)
}
