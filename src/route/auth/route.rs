use aide::transform::TransformOperation;
use argon2::Argon2;
use axum::extract::State;
use chrono::Utc;
use uuid::Uuid;

use crate::{
	extract::{Json, Query, Session},
	openapi::tag,
	reply::Reply,
	route::url,
	session, AppState, Database,
};

use super::{model, Error, RouteError};

pub const KEY_LENGTH: usize = 32;

/// Hashes a password with Argon2, using the user's id as a salt.
/// Since this is only used for logging in and creating a new password,
/// the scope of this function can remain in here with no issues.
fn hash_password(
	hasher: &Argon2,
	password: &str,
	id: &Uuid,
) -> Result<[u8; KEY_LENGTH], argon2::Error> {
	let mut hash = [0; KEY_LENGTH];

	hasher.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;
	Ok(hash)
}

async fn create_session<'e, E>(executor: E, user_id: Uuid) -> Result<model::Session, sqlx::Error>
where
	E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
	sqlx::query_as::<_, model::Session>(
		"INSERT INTO session (id, user_id, created_at) VALUES (?, ?, ?) RETURNING *",
	)
	.bind(Uuid::new_v4())
	.bind(user_id)
	.bind(Utc::now())
	.fetch_one(executor)
	.await
}

pub fn login_page_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Login page")
		.description("Returns the context of the login form.")
		.tag(tag::AUTH)
}

/// Returns the context of the login form.
pub async fn login_page(Query(query): Query<model::NextQuery>) -> Json<model::LoginPage> {
	Json(model::LoginPage { next: query.next })
}

pub fn login_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Log in")
		.description(
			"Logs in to an account, setting a session cookie. \
			Redirects to `next` when it is given, otherwise returns the session.",
		)
		.tag(tag::AUTH)
}

/// Logs in to an account, returning an associated session cookie.
pub async fn login(
	State(state): State<AppState>,
	Query(query): Query<model::NextQuery>,
	Json(auth): Json<model::LoginInput>,
) -> Result<Reply<model::Session>, RouteError> {
	let user = sqlx::query_as::<_, model::User>(r#"SELECT * FROM "user" WHERE username = ?"#)
		.bind(&auth.username)
		.fetch_optional(&state.database)
		.await?;

	let Some(user) = user else {
		return Err(Error::InvalidUsernameOrPassword.into());
	};

	let hashed = hash_password(&state.hasher, &auth.password, &user.id).map_err(Error::Argon)?;

	if user.password != hashed {
		return Err(Error::InvalidUsernameOrPassword.into());
	}

	let session = create_session(&state.database, user.id).await?;
	let cookie = session::create_cookie(session.id);

	tracing::info!(username = %user.username, "user logged in");

	let reply = match query.next {
		Some(next) if url::is_local(&next) => Reply::redirect(next),
		_ => Reply::render(session),
	};

	Ok(reply.cookie(cookie))
}

pub fn logout_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Log out")
		.description("Logs out of the authenticated account and clears the session cookie.")
		.tag(tag::AUTH)
}

/// Logs out of the authenticated account.
pub async fn logout(
	State(database): State<Database>,
	session: Session,
) -> Result<Reply<()>, RouteError> {
	sqlx::query("DELETE FROM session WHERE id = ?")
		.bind(session.id)
		.execute(&database)
		.await?;

	// Clear the session cookie
	Ok(Reply::no_content().cookie(session::clear_cookie()))
}

pub fn signup_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Sign up")
		.description("Registers a new account, returning an associated session cookie.")
		.tag(tag::AUTH)
}

/// Registers a new account, returning an associated session cookie.
pub async fn signup(
	State(state): State<AppState>,
	Json(auth): Json<model::RegisterInput>,
) -> Result<Reply<model::Session>, RouteError> {
	let user_id = Uuid::new_v4();
	let hashed = hash_password(&state.hasher, &auth.password, &user_id).map_err(Error::Argon)?;

	let mut tx = state.database.begin().await?;

	sqlx::query(
		r#"
			INSERT INTO "user" (id, email, username, password, created_at) VALUES (?, ?, ?, ?, ?)
		"#,
	)
	.bind(user_id)
	.bind(&auth.email)
	.bind(&auth.username)
	.bind(&hashed[..])
	.bind(Utc::now())
	.execute(&mut *tx)
	.await
	.map_err(|e| match e {
		sqlx::Error::Database(ref d)
			if d.is_unique_violation() || d.message().contains("UNIQUE constraint failed") =>
		{
			if d.message().contains("user.username") {
				Error::UsernameTaken.into()
			} else {
				Error::EmailTaken.into()
			}
		}
		e => RouteError::from(e),
	})?;

	let session = create_session(&mut *tx, user_id).await?;

	tx.commit().await?;

	tracing::info!(username = %auth.username, "user signed up");

	let cookie = session::create_cookie(session.id);

	Ok(Reply::render(session).cookie(cookie))
}

pub fn get_me_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get user")
		.description("Returns the authenticated user.")
		.tag(tag::AUTH)
}

/// Returns the authenticated user.
pub async fn get_me(session: Session) -> Json<model::User> {
	Json(session.user)
}
