use aide::OperationOutput;
use axum::{
	body::Body,
	http::{header, HeaderValue, Response, StatusCode},
	response::{IntoResponse, Redirect},
	Json,
};
use serde::Serialize;

enum Kind<T> {
	Render(T),
	Redirect(String),
	NoContent,
}

/// A page response: either the rendered context, or a redirect elsewhere.
///
/// ```rust
/// async fn route() -> Reply<Page> {
///   Reply::redirect("/")
/// }
/// ```
pub struct Reply<T> {
	kind: Kind<T>,
	cookie: Option<cookie::Cookie<'static>>,
}

impl<T> Reply<T> {
	pub fn render(value: T) -> Self {
		Self {
			kind: Kind::Render(value),
			cookie: None,
		}
	}

	/// Sends the client to `location` with `303 See Other`.
	pub fn redirect(location: impl Into<String>) -> Self {
		Self {
			kind: Kind::Redirect(location.into()),
			cookie: None,
		}
	}

	pub fn no_content() -> Self {
		Self {
			kind: Kind::NoContent,
			cookie: None,
		}
	}

	/// Attaches a `Set-Cookie` header to the response.
	pub fn cookie(mut self, cookie: cookie::Cookie<'static>) -> Self {
		self.cookie = Some(cookie);
		self
	}
}

impl<T: Serialize> IntoResponse for Reply<T> {
	fn into_response(self) -> Response<Body> {
		let mut response = match self.kind {
			Kind::Render(value) => Json(value).into_response(),
			Kind::Redirect(location) => Redirect::to(&location).into_response(),
			Kind::NoContent => StatusCode::NO_CONTENT.into_response(),
		};

		if let Some(cookie) = self.cookie {
			if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
				response.headers_mut().append(header::SET_COOKIE, value);
			}
		}

		response
	}
}

impl<T> OperationOutput for Reply<T> {
	type Inner = T;
}
