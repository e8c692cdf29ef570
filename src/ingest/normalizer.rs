use crate::ingest::table::{PostRecord, PostTable};
use crate::search::RawPost;

/// Project raw posts onto the `author_name, created_at, text` schema.
///
/// The projection is permissive: a post missing any of the source fields (or
/// carrying them with a non-string type) still yields a row, with `None` in
/// the affected cells. Output order follows input order.
pub fn normalize<I>(posts: I) -> PostTable
where
	I: IntoIterator<Item = RawPost>,
{
	posts.into_iter().map(|post| normalize_post(&post)).collect()
}

/// Normalize a single raw post.
pub fn normalize_post(post: &RawPost) -> PostRecord {
	PostRecord {
		author_name: post.str_at(&["user", "name"]).map(str::to_string),
		created_at: post.str_at(&["created_at"]).map(str::to_string),
		// extended-mode payloads carry the body in `full_text`
		text: post
			.str_at(&["text"])
			.or_else(|| post.str_at(&["full_text"]))
			.map(str::to_string),
	}
}
