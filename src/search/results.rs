use serde_json::Value;

/// A post exactly as the search API returned it.
///
/// Kept as a loose JSON bag: providers omit or reshape nested objects freely,
/// so nothing here assumes any field is present.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPost(Value);

impl RawPost {
	/// String at a nested object path, e.g. `["user", "name"]`.
	pub fn str_at(&self, path: &[&str]) -> Option<&str> {
		path.iter()
			.try_fold(&self.0, |v, key| v.get(key))
			.and_then(Value::as_str)
	}
}

impl From<Value> for RawPost {
	fn from(value: Value) -> Self {
		Self(value)
	}
}

/// Posts returned by one search request, in API order. Drained once.
#[derive(Debug)]
pub struct SearchResults {
	posts: std::vec::IntoIter<RawPost>,
}

impl SearchResults {
	pub fn new(posts: Vec<RawPost>) -> Self {
		Self {
			posts: posts.into_iter(),
		}
	}

	pub fn remaining(&self) -> usize {
		self.posts.len()
	}
}

impl Iterator for SearchResults {
	type Item = RawPost;

	fn next(&mut self) -> Option<RawPost> {
		self.posts.next()
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.posts.size_hint()
	}
}
