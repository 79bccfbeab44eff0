use aide::transform::TransformOperation;
use axum::{body::Bytes, extract::State};
use chrono::Utc;

use crate::{
	cache::CachedJson,
	extract::{FormData, Json, Path, Query, Session},
	form::{self, FieldErrors, Form},
	media,
	openapi::tag,
	reply::Reply,
	route::{group::model::Group, url},
	AppState,
};

use super::{model, Error, RouteError};

pub fn index_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get all posts")
		.description(
			"Returns a paginated response of all posts, newest first. \
			The response is cached, so recent changes may not be visible yet.",
		)
		.tag(tag::POST)
		.response::<200, axum::Json<model::PostList>>()
}

/// The cache key of a home page. Requests that resolve to the same page
/// number share a key, so junk `page` values cannot grow the cache.
fn index_cache_key(page: Option<&str>) -> String {
	match page.and_then(|page| page.trim().parse::<i64>().ok()) {
		None | Some(1) => "index_page:".to_owned(),
		// Every number below 1 selects the last page.
		Some(number) => format!("index_page:{}", number.max(0)),
	}
}

/// Deletes a freshly stored image when the post referencing it could not
/// be saved.
async fn discard_image_on_error<T>(
	state: &AppState,
	stored: Option<&str>,
	result: Result<T, sqlx::Error>,
) -> Result<T, sqlx::Error> {
	if let (Err(..), Some(image)) = (&result, stored) {
		media::remove_image(&state.config.media_root, image).await;
	}

	result
}

/// Returns a paginated response of all posts, newest first.
pub async fn index(
	State(state): State<AppState>,
	Query(query): Query<model::PageQuery>,
) -> Result<CachedJson, RouteError> {
	let key = index_cache_key(query.page.as_deref());
	let database = &state.database;
	let per_page = state.config.posts_per_page;
	let page = query.page.as_deref();

	let body = state
		.cache
		.get_or_try_insert(key, state.config.index_cache_ttl, || async move {
			let page = model::Feed::All.page(database, per_page, page).await?;

			Ok::<_, RouteError>(Bytes::from(serde_json::to_vec(&model::PostList {
				page,
			})?))
		})
		.await?;

	Ok(CachedJson(body))
}

pub fn post_detail_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get single post")
		.description("Returns a single post with its comments, oldest first.")
		.tag(tag::POST)
}

/// Returns a single post with its comments, oldest first.
pub async fn post_detail(
	State(state): State<AppState>,
	Path(path): Path<model::PostPath>,
) -> Result<Json<model::PostDetail>, RouteError> {
	let post = model::Post::find(&state.database, path.post_id)
		.await?
		.ok_or(Error::UnknownPost(path.post_id))?;

	let comments = model::Comment::for_post(&state.database, post.id).await?;

	Ok(Json(model::PostDetail {
		post,
		comments,
		form: Form::unbound(model::CommentInput::default()),
	}))
}

pub fn new_post_docs(op: TransformOperation) -> TransformOperation {
	op.summary("New post page")
		.description("Returns the context of an empty post form.")
		.tag(tag::POST)
}

/// Returns the context of an empty post form.
pub async fn new_post(
	State(state): State<AppState>,
	_session: Session,
) -> Result<Json<model::PostFormPage>, RouteError> {
	Ok(Json(model::PostFormPage {
		form: Form::unbound(model::PostInput::default()),
		groups: Group::all(&state.database).await?,
		is_edit: false,
	}))
}

pub fn create_post_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Create post")
		.description(
			"Creates a new post authored by the current user and redirects to their profile. \
			An invalid form is returned with its errors instead.",
		)
		.tag(tag::POST)
}

/// Creates a new post authored by the current user.
pub async fn create_post(
	State(state): State<AppState>,
	session: Session,
	data: FormData,
) -> Result<Reply<model::PostFormPage>, RouteError> {
	let submission = model::PostSubmission::bind(&state.database, data).await?;

	if !submission.form.is_valid() {
		return Ok(Reply::render(model::PostFormPage {
			form: submission.form,
			groups: Group::all(&state.database).await?,
			is_edit: false,
		}));
	}

	let image = match &submission.image {
		Some(upload) => Some(media::store_image(&state.config.media_root, upload).await?),
		None => None,
	};

	let input = submission.form.data;
	let result = sqlx::query_scalar::<_, i64>(
		r#"
			INSERT INTO post (text, created_at, author_id, group_id, image)
			VALUES (?, ?, ?, ?, ?)
			RETURNING id
		"#,
	)
	.bind(&input.text)
	.bind(Utc::now())
	.bind(session.user.id)
	.bind(input.group)
	.bind(&image)
	.fetch_one(&state.database)
	.await;

	let post_id = discard_image_on_error(&state, image.as_deref(), result).await?;

	tracing::info!(post_id, author = %session.user.username, "created post");

	Ok(Reply::redirect(url::profile(&session.user.username)))
}

pub fn edit_post_page_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Edit post page")
		.description(
			"Returns the post form filled with the current post. \
			Users other than the author are redirected to the post.",
		)
		.tag(tag::POST)
}

/// Returns the post form filled with the current post.
pub async fn edit_post_page(
	State(state): State<AppState>,
	session: Session,
	Path(path): Path<model::PostPath>,
) -> Result<Reply<model::PostFormPage>, RouteError> {
	let post = model::Post::find(&state.database, path.post_id)
		.await?
		.ok_or(Error::UnknownPost(path.post_id))?;

	if post.author_id != session.user.id {
		return Ok(Reply::redirect(url::post_detail(post.id)));
	}

	Ok(Reply::render(model::PostFormPage {
		form: Form::unbound(post.into()),
		groups: Group::all(&state.database).await?,
		is_edit: true,
	}))
}

pub fn edit_post_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Update post")
		.description(
			"Updates an existing post and redirects to it. Only the author can \
			edit a post; anyone else is redirected to the post unchanged.",
		)
		.tag(tag::POST)
}

/// Updates an existing post in place.
pub async fn edit_post(
	State(state): State<AppState>,
	session: Session,
	Path(path): Path<model::PostPath>,
	data: FormData,
) -> Result<Reply<model::PostFormPage>, RouteError> {
	let post = model::Post::find(&state.database, path.post_id)
		.await?
		.ok_or(Error::UnknownPost(path.post_id))?;

	if post.author_id != session.user.id {
		return Ok(Reply::redirect(url::post_detail(post.id)));
	}

	let mut submission = model::PostSubmission::bind(&state.database, data).await?;

	if !submission.form.is_valid() {
		submission.form.data.image = post.image;

		return Ok(Reply::render(model::PostFormPage {
			form: submission.form,
			groups: Group::all(&state.database).await?,
			is_edit: true,
		}));
	}

	let stored = match &submission.image {
		Some(upload) => Some(media::store_image(&state.config.media_root, upload).await?),
		None => None,
	};
	let image = match &stored {
		Some(image) => Some(image.clone()),
		None if submission.clear_image => None,
		None => post.image,
	};

	let input = submission.form.data;
	let result = sqlx::query("UPDATE post SET text = ?, group_id = ?, image = ? WHERE id = ?")
		.bind(&input.text)
		.bind(input.group)
		.bind(image)
		.bind(post.id)
		.execute(&state.database)
		.await;

	discard_image_on_error(&state, stored.as_deref(), result).await?;

	tracing::info!(post_id = post.id, "updated post");

	Ok(Reply::redirect(url::post_detail(post.id)))
}

pub fn add_comment_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Add comment")
		.description(
			"Adds a comment by the current user to a post and redirects to the post. \
			An empty comment is silently discarded.",
		)
		.tag(tag::POST)
}

/// Adds a comment to a post.
pub async fn add_comment(
	State(state): State<AppState>,
	session: Session,
	Path(path): Path<model::PostPath>,
	data: FormData,
) -> Result<Reply<()>, RouteError> {
	if !model::Post::exists(&state.database, path.post_id).await? {
		return Err(Error::UnknownPost(path.post_id).into());
	}

	let form = form::bind(model::CommentInput::from_form(&data), FieldErrors::new());

	if form.is_valid() {
		sqlx::query(
			"INSERT INTO comment (post_id, author_id, text, created_at) VALUES (?, ?, ?, ?)",
		)
		.bind(path.post_id)
		.bind(session.user.id)
		.bind(&form.data.text)
		.bind(Utc::now())
		.execute(&state.database)
		.await?;
	}

	Ok(Reply::redirect(url::post_detail(path.post_id)))
}
