pub use axum::http::StatusCode;
pub use axum_test::TestServer;
pub use serde_json::{json, Value};

pub(crate) use crate::{session, Database};

use chrono::Utc;
use uuid::Uuid;

use crate::{config::Config, route::auth::model::User, AppState};

/// A 2x1 pixel GIF.
pub const SMALL_GIF: &[u8] = b"\x47\x49\x46\x38\x39\x61\x02\x00\x01\x00\x80\x00\x00\x00\x00\x00\xFF\xFF\xFF\x21\xF9\x04\x00\x00\x00\x00\x00\x2C\x00\x00\x00\x00\x02\x00\x01\x00\x00\x02\x02\x0C\x0A\x00\x3B";

pub fn app_with_state(pool: Database) -> (TestServer, AppState) {
	let config = Config {
		media_root: std::env::temp_dir().join(format!("yatube-test-{}", Uuid::new_v4())),
		..Config::default()
	};
	let state = AppState::new(pool, config);
	let server = TestServer::new(crate::app(state.clone())).unwrap();

	(server, state)
}

pub fn app(pool: Database) -> TestServer {
	app_with_state(pool).0
}

/// Inserts a user that cannot log in with a password.
pub async fn create_user(pool: &Database, username: &str) -> User {
	sqlx::query_as::<_, User>(
		r#"
			INSERT INTO "user" (id, email, username, password, created_at)
			VALUES (?, ?, ?, ?, ?)
			RETURNING *
		"#,
	)
	.bind(Uuid::new_v4())
	.bind(format!("{}@example.com", username.to_lowercase()))
	.bind(username)
	.bind(vec![0u8; 32])
	.bind(Utc::now())
	.fetch_one(pool)
	.await
	.unwrap()
}

/// Starts a session for `user`, returning its cookie.
pub async fn login(pool: &Database, user: &User) -> cookie::Cookie<'static> {
	let session_id = Uuid::new_v4();

	sqlx::query("INSERT INTO session (id, user_id, created_at) VALUES (?, ?, ?)")
		.bind(session_id)
		.bind(user.id)
		.bind(Utc::now())
		.execute(pool)
		.await
		.unwrap();

	session::create_cookie(session_id)
}

pub async fn create_group(pool: &Database, title: &str, slug: &str) -> i64 {
	sqlx::query_scalar::<_, i64>(
		r#"INSERT INTO "group" (title, slug, description) VALUES (?, ?, ?) RETURNING id"#,
	)
	.bind(title)
	.bind(slug)
	.bind("Test description")
	.fetch_one(pool)
	.await
	.unwrap()
}

pub async fn create_post(pool: &Database, author: &User, text: &str, group: Option<i64>) -> i64 {
	sqlx::query_scalar::<_, i64>(
		"INSERT INTO post (text, created_at, author_id, group_id) VALUES (?, ?, ?, ?) RETURNING id",
	)
	.bind(text)
	.bind(Utc::now())
	.bind(author.id)
	.bind(group)
	.fetch_one(pool)
	.await
	.unwrap()
}

pub async fn post_image(pool: &Database, post_id: i64) -> Option<String> {
	sqlx::query_scalar::<_, Option<String>>("SELECT image FROM post WHERE id = ?")
		.bind(post_id)
		.fetch_one(pool)
		.await
		.unwrap()
}

/// Counts the rows of a table.
pub async fn count(pool: &Database, table: &str) -> i64 {
	sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
		.fetch_one(pool)
		.await
		.unwrap()
}
