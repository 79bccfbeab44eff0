use aide::transform::TransformOperation;
use axum::extract::State;

use crate::{
	extract::{Json, Path, Query, Session, Viewer},
	openapi::tag,
	reply::Reply,
	route::{post::model::Feed, url},
	AppState,
};

use super::{model, Error, RouteError};

pub fn profile_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get profile")
		.description("Returns a user with a paginated response of their posts, newest first.")
		.tag(tag::PROFILE)
}

/// Returns a user with a paginated response of their posts, newest first.
pub async fn profile(
	State(state): State<AppState>,
	Viewer(viewer): Viewer,
	Path(path): Path<model::UsernamePath>,
	Query(query): Query<model::PageQuery>,
) -> Result<Json<model::ProfilePage>, RouteError> {
	let author = model::Author::find_by_username(&state.database, &path.username)
		.await?
		.ok_or(Error::UnknownUser(path.username))?;

	let following = match viewer {
		Some(user) => author.is_followed_by(&state.database, user.id).await?,
		None => false,
	};

	let page = Feed::Author(author.id)
		.page(
			&state.database,
			state.config.posts_per_page,
			query.page.as_deref(),
		)
		.await?;

	Ok(Json(model::ProfilePage {
		author,
		following,
		page,
	}))
}

pub fn follow_index_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get followed posts")
		.description(
			"Returns a paginated response of the posts by every author you follow, newest first.",
		)
		.tag(tag::PROFILE)
}

/// Returns a paginated response of the posts by every author you follow.
pub async fn follow_index(
	State(state): State<AppState>,
	session: Session,
	Query(query): Query<model::PageQuery>,
) -> Result<Json<model::FollowPage>, RouteError> {
	let page = Feed::FollowedBy(session.user.id)
		.page(
			&state.database,
			state.config.posts_per_page,
			query.page.as_deref(),
		)
		.await?;

	Ok(Json(model::FollowPage { page }))
}

pub fn follow_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Follow author")
		.description(
			"Follows an author and redirects to their profile. \
			Following yourself or an author you already follow does nothing.",
		)
		.tag(tag::PROFILE)
}

/// Follows an author.
pub async fn follow(
	State(state): State<AppState>,
	session: Session,
	Path(path): Path<model::UsernamePath>,
) -> Result<Reply<()>, RouteError> {
	let author = model::Author::find_by_username(&state.database, &path.username)
		.await?
		.ok_or(Error::UnknownUser(path.username))?;

	if author.id != session.user.id {
		let result = sqlx::query(
			"INSERT INTO follow (user_id, author_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
		)
		.bind(session.user.id)
		.bind(author.id)
		.execute(&state.database)
		.await?;

		if result.rows_affected() > 0 {
			tracing::info!(user = %session.user.username, author = %author.username, "followed author");
		}
	}

	Ok(Reply::redirect(url::profile(&author.username)))
}

pub fn unfollow_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Unfollow author")
		.description("Stops following an author, if you did, and redirects to their profile.")
		.tag(tag::PROFILE)
}

/// Stops following an author.
pub async fn unfollow(
	State(state): State<AppState>,
	session: Session,
	Path(path): Path<model::UsernamePath>,
) -> Result<Reply<()>, RouteError> {
	let author = model::Author::find_by_username(&state.database, &path.username)
		.await?
		.ok_or(Error::UnknownUser(path.username))?;

	sqlx::query("DELETE FROM follow WHERE user_id = ? AND author_id = ?")
		.bind(session.user.id)
		.bind(author.id)
		.execute(&state.database)
		.await?;

	Ok(Reply::redirect(url::profile(&author.username)))
}
