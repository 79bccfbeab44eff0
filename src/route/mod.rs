pub mod auth;
pub mod docs;
pub mod group;
pub mod model;
pub mod post;
pub mod profile;

/// Paths of the pages that routes redirect to.
pub mod url {
	use axum::http::HeaderValue;
	use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

	/// Characters escaped in a single path segment.
	const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
		.remove(b'-')
		.remove(b'.')
		.remove(b'_')
		.remove(b'~');

	/// Characters escaped in a `next` parameter, which keeps its slashes.
	const NEXT: &AsciiSet = &SEGMENT.remove(b'/');

	pub fn post_detail(post_id: i64) -> String {
		format!("/posts/{post_id}/")
	}

	pub fn profile(username: &str) -> String {
		format!("/profile/{}/", utf8_percent_encode(username, SEGMENT))
	}

	/// The login page, returning to `next` after a successful login.
	pub fn login(next: &str) -> String {
		format!("/auth/login/?next={}", utf8_percent_encode(next, NEXT))
	}

	/// Whether `next` is a path on this site that can be sent back in a
	/// `Location` header.
	pub fn is_local(next: &str) -> bool {
		next.starts_with('/')
			&& !next.starts_with("//")
			&& !next.starts_with("/\\")
			&& !next.bytes().any(|byte| byte.is_ascii_control())
			&& HeaderValue::from_str(next).is_ok()
	}

	#[cfg(test)]
	mod test {
		#[test]
		fn test_login_keeps_slashes() {
			assert_eq!(super::login("/create/"), "/auth/login/?next=/create/");
		}

		#[test]
		fn test_login_encodes_query() {
			assert_eq!(
				super::login("/follow/?page=2"),
				"/auth/login/?next=/follow/%3Fpage%3D2"
			);
		}

		#[test]
		fn test_login_encodes_non_ascii() {
			assert_eq!(
				super::login("/profile/Стёпа/"),
				"/auth/login/?next=/profile/%D0%A1%D1%82%D1%91%D0%BF%D0%B0/"
			);
		}

		#[test]
		fn test_profile_encodes_username() {
			assert_eq!(super::profile("Stepan"), "/profile/Stepan/");
			assert_eq!(super::profile("Стёпа"), "/profile/%D0%A1%D1%82%D1%91%D0%BF%D0%B0/");
		}

		#[test]
		fn test_is_local() {
			assert!(super::is_local("/posts/1/"));
			assert!(!super::is_local("//evil.example/"));
			assert!(!super::is_local("https://evil.example/"));
			assert!(!super::is_local("/x\n"));
			assert!(!super::is_local("/x\r\nSet-Cookie: a=b"));
			assert!(!super::is_local("/x\0"));
			assert!(!super::is_local("/x\ty"));
			assert!(!super::is_local("/profile/Стёпа/"));
		}
	}
}
