use aide::OperationInput;
use axum::{
	extract::{FromRef, FromRequestParts, OriginalUri},
	http::request,
};
use uuid::Uuid;

use crate::{
	error::RouteError,
	openapi::SECURITY_SCHEME_SESSION,
	route::auth::{self, model::User},
	session, Database,
};

/// Extracts the session and related user from the request.
///
/// Requests without a valid session are rejected with
/// [`auth::Error::LoginRequired`], which sends the client to the login page
/// and back to the requested path afterwards.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub id: Uuid,
	pub user: User,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		// Nested routers strip their prefix from `parts.uri`.
		let uri = parts
			.extensions
			.get::<OriginalUri>()
			.map_or(&parts.uri, |uri| &uri.0);
		let next = uri
			.path_and_query()
			.map_or("/", |path| path.as_str())
			.to_owned();

		let Some(session_id) = session::session_id(&parts.headers) else {
			return Err(auth::Error::LoginRequired(next).into());
		};

		let database = Database::from_ref(state);
		let user = sqlx::query_as::<_, User>(
			r#"
				SELECT "user".* FROM "user"
				JOIN session ON session.user_id = "user".id
				WHERE session.id = ?
			"#,
		)
		.bind(session_id)
		.fetch_optional(&database)
		.await?;

		let user = user.ok_or(auth::Error::LoginRequired(next))?;

		Ok(Self {
			id: session_id,
			user,
		})
	}
}

impl OperationInput for Session {
	/// Operation input for the session extractor.
	///
	/// This adds a session cookie requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.extend([[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
			.into_iter()
			.collect()]);
	}
}

/// The user making the request, if they are logged in.
///
/// Unlike [`Session`], anonymous requests are not rejected.
#[derive(Debug)]
pub struct Viewer(pub Option<User>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Viewer
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		match Session::from_request_parts(parts, state).await {
			Ok(session) => Ok(Self(Some(session.user))),
			Err(RouteError::Route(auth::Error::LoginRequired(..))) => Ok(Self(None)),
			Err(error) => Err(error),
		}
	}
}

impl OperationInput for Viewer {}
