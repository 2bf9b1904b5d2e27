use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Number of posts on a single page.
pub const PAGE_SIZE: i64 = 10;

/// The `?page=` query parameter.
///
/// Kept as a string so that garbage input falls back to the first page
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize, Validate, JsonSchema)]
pub struct PageQuery {
	/// The page number to return (1-indexed), or `last`.
	pub page: Option<String>,
}

/// A page number as requested by the client, before it is clamped to the
/// pages that actually exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
	Number(i64),
	Last,
}

impl PageQuery {
	pub fn request(&self) -> PageRequest {
		match self.page.as_deref().map(str::trim) {
			Some("last") => PageRequest::Last,
			Some(page) => page.parse().map_or(PageRequest::Number(1), PageRequest::Number),
			None => PageRequest::Number(1),
		}
	}
}

/// The slice of a result list that makes up one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
	/// The resolved page number (1-indexed).
	pub number: i64,
	pub num_pages: i64,
	/// Total number of items across all pages.
	pub count: i64,
	pub size: i64,
}

impl Window {
	/// Resolves `request` against `count` items, clamping to the existing pages.
	/// An empty list still has a single, empty, first page.
	pub fn new(count: i64, request: PageRequest, size: i64) -> Self {
		let count = count.max(0);
		let num_pages = ((count + size - 1) / size).max(1);
		let number = match request {
			PageRequest::Number(number) => number.clamp(1, num_pages),
			PageRequest::Last => num_pages,
		};

		Self {
			number,
			num_pages,
			count,
			size,
		}
	}

	pub fn offset(&self) -> i64 {
		(self.number - 1) * self.size
	}

	pub fn limit(&self) -> i64 {
		self.size
	}

	pub fn with_items<T>(self, object_list: Vec<T>) -> Paginated<T> {
		let has_next = self.number < self.num_pages;
		let has_previous = self.number > 1;

		Paginated {
			object_list,
			number: self.number,
			num_pages: self.num_pages,
			count: self.count,
			has_next,
			has_previous,
			next_page_number: has_next.then_some(self.number + 1),
			previous_page_number: has_previous.then_some(self.number - 1),
		}
	}
}

/// One page of results along with what is needed to link to its neighbours.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Paginated<T> {
	pub object_list: Vec<T>,
	pub number: i64,
	pub num_pages: i64,
	pub count: i64,
	pub has_next: bool,
	pub has_previous: bool,
	pub next_page_number: Option<i64>,
	pub previous_page_number: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct PostPath {
	pub post_id: i64,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CommentPath {
	pub post_id: i64,
	pub comment_id: i64,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct UsernamePath {
	pub username: String,
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct CategoryPath {
	pub category_slug: String,
}

#[cfg(test)]
mod test {
	use super::*;

	fn query(page: &str) -> PageQuery {
		PageQuery {
			page: Some(page.into()),
		}
	}

	#[test]
	fn test_page_request() {
		assert_eq!(PageQuery::default().request(), PageRequest::Number(1));
		assert_eq!(query("3").request(), PageRequest::Number(3));
		assert_eq!(query("last").request(), PageRequest::Last);
		assert_eq!(query("abc").request(), PageRequest::Number(1));
		assert_eq!(query("").request(), PageRequest::Number(1));
	}

	#[test]
	fn test_window_offset() {
		let mut window = Window::new(100, PageRequest::Number(1), PAGE_SIZE);

		assert_eq!(window.offset(), 0);
		assert_eq!(window.limit(), 10);

		window = Window::new(100, PageRequest::Number(2), PAGE_SIZE);

		assert_eq!(window.offset(), 10);

		window = Window::new(100, PageRequest::Number(3), 5);

		assert_eq!(window.offset(), 10);
	}

	#[test]
	fn test_window_clamps() {
		let window = Window::new(25, PageRequest::Number(99), PAGE_SIZE);

		assert_eq!(window.num_pages, 3);
		assert_eq!(window.number, 3);

		let window = Window::new(25, PageRequest::Number(0), PAGE_SIZE);

		assert_eq!(window.number, 1);

		let window = Window::new(25, PageRequest::Number(-4), PAGE_SIZE);

		assert_eq!(window.number, 1);

		let window = Window::new(25, PageRequest::Last, PAGE_SIZE);

		assert_eq!(window.number, 3);
	}

	#[test]
	fn test_window_empty() {
		let window = Window::new(0, PageRequest::Number(5), PAGE_SIZE);

		assert_eq!(window.num_pages, 1);
		assert_eq!(window.number, 1);
		assert_eq!(window.offset(), 0);
	}

	#[test]
	fn test_window_exact_multiple() {
		assert_eq!(Window::new(20, PageRequest::Last, PAGE_SIZE).num_pages, 2);
		assert_eq!(Window::new(21, PageRequest::Last, PAGE_SIZE).num_pages, 3);
	}

	#[test]
	fn test_paginated_links() {
		let page = Window::new(25, PageRequest::Number(2), PAGE_SIZE).with_items(vec![(); 10]);

		assert!(page.has_next);
		assert!(page.has_previous);
		assert_eq!(page.next_page_number, Some(3));
		assert_eq!(page.previous_page_number, Some(1));

		let page = Window::new(5, PageRequest::Number(1), PAGE_SIZE).with_items(vec![(); 5]);

		assert!(!page.has_next);
		assert!(!page.has_previous);
		assert_eq!(page.next_page_number, None);
	}
}
