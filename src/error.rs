use std::{borrow::Cow, convert::Infallible};

use aide::OperationOutput;
use axum::{
	body::Body,
	extract::{
		multipart::{MultipartError, MultipartRejection},
		rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
	},
	http::{Response, StatusCode},
	response::{IntoResponse, Redirect},
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single message presented to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message {
	/// A short, machine-readable description of the error.
	pub content: Cow<'static, str>,
	/// The input field that caused the error, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'static, str>>,
	/// Additional context about the error.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Map>,
}

impl Message {
	pub fn new(content: impl Into<Cow<'static, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	pub fn field(mut self, field: impl Into<Cow<'static, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(Map::new)
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse {
	pub success: bool,
	pub errors: Vec<Message>,
}

/// Describes how a route-specific error is presented to the client.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn errors(&self) -> Vec<Message>;

	/// When set, the client is redirected here instead of receiving an error body.
	fn location(&self) -> Option<String> {
		None
	}
}

impl ErrorShape for Infallible {
	fn status(&self) -> StatusCode {
		match *self {}
	}

	fn errors(&self) -> Vec<Message> {
		match *self {}
	}
}

/// Error type returned by every route.
///
/// `T` holds the errors specific to a group of routes, while the remaining
/// variants cover failures shared by all of them. The Display trait is not
/// sent to the client, so it can show sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum RouteError<T> {
	#[error("{0}")]
	Route(T),
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] JsonRejection),
	#[error("query error: {0}")]
	Query(#[from] QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] PathRejection),
	#[error("form error: {0}")]
	Form(#[from] FormRejection),
	#[error("multipart error: {0}")]
	Multipart(#[from] MultipartRejection),
	#[error("multipart field error: {0}")]
	MultipartField(#[from] MultipartError),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
	#[error("serialization error: {0}")]
	Serialize(#[from] serde_json::Error),
}

/// Rejection used by extractors that have no errors of their own.
pub type AppError = RouteError<Infallible>;

impl<T: ErrorShape> From<T> for RouteError<T> {
	fn from(error: T) -> Self {
		Self::Route(error)
	}
}

impl<T> OperationOutput for RouteError<T> {
	type Inner = ErrorResponse;
}

fn rejection(status: StatusCode, body: String) -> (StatusCode, Vec<Message>) {
	(status, Message::new(body).into_vec())
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response<Body> {
		let (status, errors) = match self {
			Self::Route(error) => {
				if let Some(location) = error.location() {
					return Redirect::to(&location).into_response();
				}

				(error.status(), error.errors())
			}
			Self::Validation(errors) => (
				StatusCode::BAD_REQUEST,
				errors
					.field_errors()
					.into_iter()
					.flat_map(|(field, errors)| {
						let field = field.to_string();

						errors.iter().map(move |error| {
							let content = error
								.message
								.clone()
								.unwrap_or_else(|| error.code.clone());

							Message::new(content).field(field.clone())
						})
					})
					.collect(),
			),
			Self::Json(error) => rejection(error.status(), error.body_text()),
			Self::Query(error) => rejection(error.status(), error.body_text()),
			Self::Form(error) => rejection(error.status(), error.body_text()),
			Self::Multipart(error) => rejection(error.status(), error.body_text()),
			Self::MultipartField(error) => rejection(error.status(), error.body_text()),
			// A path segment that does not parse cannot name an existing resource.
			Self::Path(..) => (StatusCode::NOT_FOUND, Message::new("not_found").into_vec()),
			Self::Database(error) => {
				tracing::error!(%error, "database error");

				(StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
			}
			Self::Io(error) => {
				tracing::error!(%error, "io error");

				(StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
			}
			Self::Serialize(error) => {
				tracing::error!(%error, "serialization error");

				(StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
			}
		};

		(
			status,
			Json(ErrorResponse {
				success: false,
				errors,
			}),
		)
			.into_response()
	}
}

/// Fallback for routes that do not exist.
pub async fn not_found() -> impl IntoResponse {
	(
		StatusCode::NOT_FOUND,
		Json(ErrorResponse {
			success: false,
			errors: Message::new("not_found").into_vec(),
		}),
	)
}
