use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(i64),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(index, index_docs))
		.api_route(
			"/create/",
			get_with(new_post, new_post_docs).post_with(create_post, create_post_docs),
		)
		.api_route("/posts/:post_id/", get_with(post_detail, post_detail_docs))
		.api_route(
			"/posts/:post_id/edit/",
			get_with(edit_post_page, edit_post_page_docs).post_with(edit_post, edit_post_docs),
		)
		.api_route(
			"/posts/:post_id/comment/",
			post_with(add_comment, add_comment_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", *post)
				.into_vec(),
		}
	}
}
