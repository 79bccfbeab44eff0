use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown user {0}")]
	UnknownUser(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/follow/", get_with(follow_index, follow_index_docs))
		.api_route("/profile/:username/", get_with(profile, profile_docs))
		.api_route("/profile/:username/follow/", get_with(follow, follow_docs))
		.api_route(
			"/profile/:username/unfollow/",
			get_with(unfollow, unfollow_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message> {
		match self {
			Self::UnknownUser(username) => error::Message::new("unknown_user")
				.detail("username", username.as_str())
				.into_vec(),
		}
	}
}
