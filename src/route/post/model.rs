use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;
use validator::Validate;

pub use crate::route::model::{Page, PageQuery, Paginator};

use crate::{
	extract::{FormData, Upload},
	form::{self, FieldErrors, Form},
	media,
	route::group::model::Group,
	Database,
};

const SELECT_POST: &str = r#"
	SELECT
		post.id, post.text, post.created_at, post.image,
		post.author_id, author.username AS author_username,
		post.group_id, "group".slug AS group_slug, "group".title AS group_title
	FROM post
	JOIN "user" AS author ON author.id = post.author_id
	LEFT JOIN "group" ON "group".id = post.group_id
"#;

/// A single post, joined with its author and group.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Post {
	pub id: i64,
	pub text: String,
	/// The publication time of the post.
	pub created_at: DateTime<Utc>,
	/// Path of the attached image, relative to the media root.
	pub image: Option<String>,
	pub author_id: Uuid,
	pub author_username: String,
	pub group_id: Option<i64>,
	pub group_slug: Option<String>,
	pub group_title: Option<String>,
}

impl Post {
	pub async fn find(database: &Database, id: i64) -> Result<Option<Self>, sqlx::Error> {
		let mut query = QueryBuilder::<Sqlite>::new(SELECT_POST);

		query.push(" WHERE post.id = ").push_bind(id);
		query.build_query_as::<Self>().fetch_optional(database).await
	}

	pub async fn exists(database: &Database, id: i64) -> Result<bool, sqlx::Error> {
		let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post WHERE id = ?")
			.bind(id)
			.fetch_one(database)
			.await?;

		Ok(count > 0)
	}
}

/// The posts shown by a listing page.
#[derive(Debug, Clone, Copy)]
pub enum Feed {
	All,
	Group(i64),
	Author(Uuid),
	/// Posts by every author the user follows.
	FollowedBy(Uuid),
}

impl Feed {
	fn push_filter(self, query: &mut QueryBuilder<'_, Sqlite>) {
		match self {
			Self::All => {}
			Self::Group(group_id) => {
				query.push(" WHERE post.group_id = ").push_bind(group_id);
			}
			Self::Author(author_id) => {
				query.push(" WHERE post.author_id = ").push_bind(author_id);
			}
			Self::FollowedBy(user_id) => {
				query
					.push(" WHERE post.author_id IN (SELECT author_id FROM follow WHERE user_id = ")
					.push_bind(user_id)
					.push(")");
			}
		}
	}

	/// Fetches one page of the feed, newest first.
	pub async fn page(
		self,
		database: &Database,
		per_page: i64,
		page: Option<&str>,
	) -> Result<Page<Post>, sqlx::Error> {
		let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM post");

		self.push_filter(&mut count);

		let count = count
			.build_query_scalar::<i64>()
			.fetch_one(database)
			.await?;

		let paginator = Paginator::new(count, per_page);
		let number = paginator.page_number(page);

		let mut select = QueryBuilder::<Sqlite>::new(SELECT_POST);

		self.push_filter(&mut select);
		select
			.push(" ORDER BY post.created_at DESC, post.id DESC LIMIT ")
			.push_bind(paginator.limit())
			.push(" OFFSET ")
			.push_bind(paginator.offset(number));

		let items = select.build_query_as::<Post>().fetch_all(database).await?;

		Ok(Page::new(&paginator, number, items))
	}
}

/// A comment on a post, joined with its author.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Comment {
	pub id: i64,
	pub post_id: i64,
	pub author_id: Uuid,
	pub author_username: String,
	pub text: String,
	pub created_at: DateTime<Utc>,
}

impl Comment {
	/// Comments on a post, oldest first.
	pub async fn for_post(database: &Database, post_id: i64) -> Result<Vec<Self>, sqlx::Error> {
		sqlx::query_as::<_, Self>(
			r#"
				SELECT
					comment.id, comment.post_id, comment.author_id,
					author.username AS author_username, comment.text, comment.created_at
				FROM comment
				JOIN "user" AS author ON author.id = comment.author_id
				WHERE comment.post_id = ?
				ORDER BY comment.created_at, comment.id
			"#,
		)
		.bind(post_id)
		.fetch_all(database)
		.await
	}
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct PostPath {
	pub post_id: i64,
}

/// Fields of the post form.
#[derive(Debug, Default, Serialize, Validate, JsonSchema)]
pub struct PostInput {
	/// The text of the post.
	#[validate(custom(function = "form::required"))]
	pub text: String,
	/// The group the post belongs to, if any.
	pub group: Option<i64>,
	/// Path of the current image, relative to the media root.
	pub image: Option<String>,
}

impl From<Post> for PostInput {
	fn from(post: Post) -> Self {
		Self {
			text: post.text,
			group: post.group_id,
			image: post.image,
		}
	}
}

/// A submitted post form, bound and validated.
pub struct PostSubmission {
	pub form: Form<PostInput>,
	pub image: Option<Upload>,
	/// Whether the current image should be removed.
	pub clear_image: bool,
}

impl PostSubmission {
	pub async fn bind(database: &Database, mut data: FormData) -> Result<Self, sqlx::Error> {
		let mut errors = FieldErrors::new();

		let text = data.text("text").unwrap_or_default().trim().to_owned();
		let group = match data.text("group").map(str::trim).filter(|raw| !raw.is_empty()) {
			None => None,
			Some(raw) => {
				let id = raw.parse::<i64>().ok();
				let exists = match id {
					Some(id) => Group::exists(database, id).await?,
					None => false,
				};

				if !exists {
					form::add_error(&mut errors, "group", form::INVALID_CHOICE);
				}

				id.filter(|_| exists)
			}
		};

		let image = data.take_file("image");

		if image.as_ref().is_some_and(|image| !media::is_image(image)) {
			form::add_error(&mut errors, "image", form::INVALID_IMAGE);
		}

		let input = PostInput {
			text,
			group,
			image: None,
		};

		Ok(Self {
			form: form::bind(input, errors),
			image,
			clear_image: data.flag("image-clear"),
		})
	}
}

/// Fields of the comment form.
#[derive(Debug, Default, Serialize, Validate, JsonSchema)]
pub struct CommentInput {
	#[validate(custom(function = "form::required"))]
	pub text: String,
}

impl CommentInput {
	pub fn from_form(data: &FormData) -> Self {
		Self {
			text: data.text("text").unwrap_or_default().trim().to_owned(),
		}
	}
}

#[derive(Serialize, JsonSchema)]
pub struct PostList {
	pub page: Page<Post>,
}

#[derive(Serialize, JsonSchema)]
pub struct PostDetail {
	pub post: Post,
	pub comments: Vec<Comment>,
	pub form: Form<CommentInput>,
}

/// Context of the post creation and editing page.
#[derive(Serialize, JsonSchema)]
pub struct PostFormPage {
	pub form: Form<PostInput>,
	/// The groups a post can be assigned to.
	pub groups: Vec<Group>,
	/// Whether an existing post is being edited.
	pub is_edit: bool,
}
