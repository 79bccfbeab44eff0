use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate, JsonSchema)]
pub struct PageQuery {
	/// The page number to return (1-indexed).
	///
	/// Values that are not a number select the first page, numbers outside
	/// of the available range select the last one.
	pub page: Option<String>,
}

/// Splits `count` items into pages of `per_page` items.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
	count: i64,
	per_page: i64,
}

impl Paginator {
	pub fn new(count: i64, per_page: i64) -> Self {
		Self {
			count: count.max(0),
			per_page: per_page.max(1),
		}
	}

	/// The number of pages, which is at least 1 even with no items.
	pub fn num_pages(&self) -> i64 {
		if self.count == 0 {
			1
		} else {
			(self.count + self.per_page - 1) / self.per_page
		}
	}

	/// Resolves a requested page number to one that exists.
	pub fn page_number(&self, raw: Option<&str>) -> i64 {
		let Some(number) = raw.and_then(|raw| raw.trim().parse::<i64>().ok()) else {
			return 1;
		};

		if number < 1 || number > self.num_pages() {
			self.num_pages()
		} else {
			number
		}
	}

	pub fn offset(&self, number: i64) -> i64 {
		(number - 1) * self.per_page
	}

	pub fn limit(&self) -> i64 {
		self.per_page
	}
}

/// A single page of items, with enough information to link to its neighbours.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Page<T> {
	pub items: Vec<T>,
	/// The 1-indexed number of this page.
	pub number: i64,
	pub num_pages: i64,
	/// The number of items across all pages.
	pub count: i64,
	pub has_next: bool,
	pub has_previous: bool,
	pub next_page_number: Option<i64>,
	pub previous_page_number: Option<i64>,
}

impl<T> Page<T> {
	pub fn new(paginator: &Paginator, number: i64, items: Vec<T>) -> Self {
		let num_pages = paginator.num_pages();
		let has_next = number < num_pages;
		let has_previous = number > 1;

		Self {
			items,
			number,
			num_pages,
			count: paginator.count,
			has_next,
			has_previous,
			next_page_number: has_next.then_some(number + 1),
			previous_page_number: has_previous.then_some(number - 1),
		}
	}
}

#[cfg(test)]
mod test {
	use super::Paginator;

	#[test]
	fn test_paginate_offset() {
		let paginator = Paginator::new(65, 10);

		assert_eq!(paginator.offset(1), 0);
		assert_eq!(paginator.offset(2), 10);
		assert_eq!(paginator.offset(7), 60);

		let paginator = Paginator::new(65, 5);

		assert_eq!(paginator.offset(2), 5);
		assert_eq!(paginator.offset(3), 10);
	}

	#[test]
	fn test_paginate_limit() {
		assert_eq!(Paginator::new(65, 10).limit(), 10);
	}

	#[test]
	fn test_num_pages() {
		assert_eq!(Paginator::new(65, 10).num_pages(), 7);
		assert_eq!(Paginator::new(60, 10).num_pages(), 6);
		assert_eq!(Paginator::new(0, 10).num_pages(), 1);
	}

	#[test]
	fn test_page_number_fallbacks() {
		let paginator = Paginator::new(65, 10);

		assert_eq!(paginator.page_number(None), 1);
		assert_eq!(paginator.page_number(Some("3")), 3);
		assert_eq!(paginator.page_number(Some("abc")), 1);
		assert_eq!(paginator.page_number(Some("")), 1);
		assert_eq!(paginator.page_number(Some("0")), 7);
		assert_eq!(paginator.page_number(Some("-2")), 7);
		assert_eq!(paginator.page_number(Some("100")), 7);
	}

	#[test]
	fn test_page_links() {
		let paginator = Paginator::new(65, 10);

		let first = super::Page::new(&paginator, 1, vec![(); 10]);

		assert!(first.has_next);
		assert!(!first.has_previous);
		assert_eq!(first.next_page_number, Some(2));
		assert_eq!(first.previous_page_number, None);

		let last = super::Page::new(&paginator, 7, vec![(); 5]);

		assert!(!last.has_next);
		assert_eq!(last.previous_page_number, Some(6));
		assert_eq!(last.count, 65);
	}
}
