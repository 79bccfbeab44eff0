use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub use crate::route::model::{Page, PageQuery};

use crate::{route::post::model::Post, Database};

/// The public face of a user.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Author {
	pub id: Uuid,
	pub username: String,
}

impl Author {
	pub async fn find_by_username(
		database: &Database,
		username: &str,
	) -> Result<Option<Self>, sqlx::Error> {
		sqlx::query_as::<_, Self>(r#"SELECT id, username FROM "user" WHERE username = ?"#)
			.bind(username)
			.fetch_optional(database)
			.await
	}

	/// Whether `user_id` follows this author.
	pub async fn is_followed_by(&self, database: &Database, user_id: Uuid) -> Result<bool, sqlx::Error> {
		let count = sqlx::query_scalar::<_, i64>(
			"SELECT COUNT(*) FROM follow WHERE user_id = ? AND author_id = ?",
		)
		.bind(user_id)
		.bind(self.id)
		.fetch_one(database)
		.await?;

		Ok(count > 0)
	}
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct UsernamePath {
	pub username: String,
}

#[derive(Serialize, JsonSchema)]
pub struct ProfilePage {
	pub author: Author,
	/// Whether the current user follows the author. Always false when
	/// logged out.
	pub following: bool,
	pub page: Page<Post>,
}

#[derive(Serialize, JsonSchema)]
pub struct FollowPage {
	pub page: Page<Post>,
}
