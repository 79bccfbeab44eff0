mod form;
mod session;

pub use form::{FormData, Upload};
pub use session::{Session, Viewer};

use aide::OperationIo;
use axum::{
	body::Body,
	extract::{FromRequest, FromRequestParts, Request},
	http::{request, Response},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

use crate::error::AppError;

fn validated<T: Validate>(value: T) -> Result<T, AppError> {
	value.validate()?;

	Ok(value)
}

/// A JSON page context in responses, or a validated JSON body in requests.
///
/// Only the auth routes take JSON bodies (`signup`, `login`); pages with
/// forms read [`FormData`] instead.
#[derive(OperationIo)]
#[aide(
	input_with = "axum::Json<T>",
	output_with = "axum::Json<T>",
	json_schema
)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
	fn into_response(self) -> Response<Body> {
		axum::Json(self.0).into_response()
	}
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
	T: DeserializeOwned + Validate + JsonSchema + 'static,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;

		validated(value).map(Self)
	}
}

/// Validated query parameters, such as `?page=` on the feeds and `?next=`
/// on the login page.
#[derive(OperationIo)]
#[aide(
	input_with = "axum::extract::Query<T>",
	output_with = "axum::Json<T>",
	json_schema
)]
pub struct Query<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
	T: DeserializeOwned + Validate,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let axum::extract::Query(value) =
			axum::extract::Query::<T>::from_request_parts(parts, state).await?;

		validated(value).map(Self)
	}
}

/// Path parameters: a post id, a group slug or a username.
///
/// A segment that does not deserialize (`/posts/abc/`) cannot name an
/// existing post, so the rejection renders as `404 not_found` rather than
/// a bad request.
#[derive(OperationIo)]
#[aide(
	input_with = "axum::extract::Path<T>",
	output_with = "axum::Json<T>",
	json_schema
)]
pub struct Path<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
	T: DeserializeOwned + Validate + Send,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let axum::extract::Path(value) =
			axum::extract::Path::<T>::from_request_parts(parts, state).await?;

		validated(value).map(Self)
	}
}
