use axum::http::{header, HeaderMap};
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

/// Reads the session id from the request cookies, if one is present and well-formed.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
	headers
		.get_all(header::COOKIE)
		.into_iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(cookie::Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == COOKIE_NAME)
		.and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

#[cfg(test)]
mod test {
	use axum::http::HeaderValue;

	use super::*;

	#[test]
	fn test_session_id_from_cookie_header() {
		let id = Uuid::new_v4();
		let mut headers = HeaderMap::new();

		headers.insert(
			header::COOKIE,
			HeaderValue::from_str(&format!("theme=dark; {COOKIE_NAME}={id}")).unwrap(),
		);

		assert_eq!(session_id(&headers), Some(id));
	}

	#[test]
	fn test_malformed_session_id_is_ignored() {
		let mut headers = HeaderMap::new();

		headers.insert(
			header::COOKIE,
			HeaderValue::from_static("session=not-a-uuid"),
		);

		assert_eq!(session_id(&headers), None);
	}
}
