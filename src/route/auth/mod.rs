use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, route::url, AppState};

pub mod model;
pub mod route;

/// An error that can occur during authentication.
///
/// Note that the messages are presented to the client, so they should not contain
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid username or password")]
	InvalidUsernameOrPassword,
	#[error("password validation error")]
	Argon(#[from] argon2::Error),
	/// Carries the path to return to after logging in.
	#[error("login required for {0}")]
	LoginRequired(String),
	#[error("username already taken")]
	UsernameTaken,
	#[error("email already taken")]
	EmailTaken,
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/signup/", post_with(signup, signup_docs))
		.api_route(
			"/login/",
			get_with(login_page, login_page_docs).post_with(login, login_docs),
		)
		.api_route("/logout/", get_with(logout, logout_docs))
		.api_route("/me/", get_with(get_me, get_me_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::InvalidUsernameOrPassword | Self::LoginRequired(..) => StatusCode::UNAUTHORIZED,
			Self::Argon(..) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::UsernameTaken | Self::EmailTaken => StatusCode::CONFLICT,
		}
	}

	fn errors(&self) -> Vec<error::Message> {
		match self {
			// The hashing failure itself should not reach the client.
			Self::Argon(..) => Vec::new(),
			_ => error::Message::new(self.to_string()).into_vec(),
		}
	}

	fn location(&self) -> Option<String> {
		match self {
			Self::LoginRequired(next) => Some(url::login(next)),
			_ => None,
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_signup_flow(pool: Database) {
		let app = app(pool);

		let response = app
			.post("/auth/signup/")
			.json(&json!({
				"email": "stepan@example.com",
				"username": "Stepan",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		assert!(response
			.header("set-cookie")
			.to_str()
			.unwrap()
			.contains("session="));

		let response = app
			.post("/auth/login/")
			.json(&json!({
				"username": "Stepan",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		let cookie = response.cookie(session::COOKIE_NAME);

		let response = app.get("/auth/me/").add_cookie(cookie).await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["username"], "Stepan");
	}

	#[sqlx::test]
	async fn test_login_redirects_to_next(pool: Database) {
		let app = app(pool.clone());

		app.post("/auth/signup/")
			.json(&json!({
				"email": "sergei@example.com",
				"username": "Sergei",
				"password": "hunter2hunter",
			}))
			.await;

		let response = app
			.post("/auth/login/")
			.add_query_param("next", "/create/")
			.json(&json!({
				"username": "Sergei",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), "/create/");
	}

	#[sqlx::test]
	async fn test_login_ignores_unsafe_next(pool: Database) {
		let app = app(pool.clone());

		app.post("/auth/signup/")
			.json(&json!({
				"email": "sergei@example.com",
				"username": "Sergei",
				"password": "hunter2hunter",
			}))
			.await;

		for next in ["/x\n", "/x\r\nSet-Cookie: a=b", "/x\0", "//evil.example/"] {
			let response = app
				.post("/auth/login/")
				.add_query_param("next", next)
				.json(&json!({
					"username": "Sergei",
					"password": "hunter2hunter",
				}))
				.await;

			assert_eq!(response.status_code(), StatusCode::OK);
			assert!(response.json::<Value>()["session_id"].is_string());
		}
	}

	#[sqlx::test]
	async fn test_login_rejects_wrong_password(pool: Database) {
		let app = app(pool.clone());

		app.post("/auth/signup/")
			.json(&json!({
				"email": "sergei@example.com",
				"username": "Sergei",
				"password": "hunter2hunter",
			}))
			.await;

		let response = app
			.post("/auth/login/")
			.json(&json!({
				"username": "Sergei",
				"password": "wrong-password",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
	}

	#[sqlx::test]
	async fn test_signup_rejects_taken_username(pool: Database) {
		let app = app(pool.clone());

		create_user(&pool, "Stepan").await;

		let response = app
			.post("/auth/signup/")
			.json(&json!({
				"email": "other@example.com",
				"username": "Stepan",
				"password": "hunter2hunter",
			}))
			.await;

		assert_eq!(response.status_code(), StatusCode::CONFLICT);
	}

	#[sqlx::test]
	async fn test_logout_invalidates_session(pool: Database) {
		let app = app(pool.clone());
		let user = create_user(&pool, "Stepan").await;
		let cookie = login(&pool, &user).await;

		let response = app.get("/auth/logout/").add_cookie(cookie.clone()).await;

		assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

		let response = app.get("/auth/me/").add_cookie(cookie).await;

		assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
		assert_eq!(response.header("location"), "/auth/login/?next=/auth/me/");
	}
}
