use aide::transform::TransformOperation;
use axum::extract::State;

use crate::{
	extract::{Json, Path, Query},
	openapi::tag,
	route::post::model::Feed,
	AppState,
};

use super::{model, Error, RouteError};

pub fn group_posts_docs(op: TransformOperation) -> TransformOperation {
	op.summary("Get group posts")
		.description("Returns a paginated response of the posts in a group, newest first.")
		.tag(tag::GROUP)
}

/// Returns a paginated response of the posts in a group, newest first.
pub async fn group_posts(
	State(state): State<AppState>,
	Path(path): Path<model::SlugPath>,
	Query(query): Query<model::PageQuery>,
) -> Result<Json<model::GroupPage>, RouteError> {
	let group = model::Group::find_by_slug(&state.database, &path.slug)
		.await?
		.ok_or(Error::UnknownGroup(path.slug))?;

	let page = Feed::Group(group.id)
		.page(
			&state.database,
			state.config.posts_per_page,
			query.page.as_deref(),
		)
		.await?;

	Ok(Json(model::GroupPage { group, page }))
}
