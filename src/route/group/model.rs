use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use crate::route::model::{Page, PageQuery};

use crate::{route::post::model::Post, Database};

/// A named category that posts can optionally belong to.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Group {
	pub id: i64,
	pub title: String,
	/// Unique, URL-safe identifier of the group.
	pub slug: String,
	pub description: String,
}

impl Group {
	pub async fn find_by_slug(database: &Database, slug: &str) -> Result<Option<Self>, sqlx::Error> {
		sqlx::query_as::<_, Self>(r#"SELECT * FROM "group" WHERE slug = ?"#)
			.bind(slug)
			.fetch_optional(database)
			.await
	}

	pub async fn exists(database: &Database, id: i64) -> Result<bool, sqlx::Error> {
		let count = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM "group" WHERE id = ?"#)
			.bind(id)
			.fetch_one(database)
			.await?;

		Ok(count > 0)
	}

	/// Every group, for choosing one in the post form.
	pub async fn all(database: &Database) -> Result<Vec<Self>, sqlx::Error> {
		sqlx::query_as::<_, Self>(r#"SELECT * FROM "group" ORDER BY title"#)
			.fetch_all(database)
			.await
	}
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct SlugPath {
	pub slug: String,
}

#[derive(Serialize, JsonSchema)]
pub struct GroupPage {
	pub group: Group,
	pub page: Page<Post>,
}
