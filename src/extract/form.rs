use std::collections::HashMap;

use aide::OperationInput;
use axum::{
	body::Bytes,
	extract::{Form, FromRequest, Multipart, Request},
	http::header,
};

use crate::error::AppError;

/// A file sent with a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
	pub file_name: String,
	pub content_type: Option<String>,
	pub bytes: Bytes,
}

/// Extractor for submitted HTML-style forms.
///
/// Accepts both `multipart/form-data` and `application/x-www-form-urlencoded`
/// bodies. Only the former can carry files.
#[derive(Debug, Default)]
pub struct FormData {
	fields: HashMap<String, String>,
	files: HashMap<String, Upload>,
}

impl FormData {
	/// Returns the value of a text field.
	pub fn text(&self, name: &str) -> Option<&str> {
		self.fields.get(name).map(String::as_str)
	}

	/// Returns whether a checkbox field was ticked.
	pub fn flag(&self, name: &str) -> bool {
		self.text(name)
			.is_some_and(|value| !matches!(value, "" | "0" | "false" | "off"))
	}

	pub fn take_file(&mut self, name: &str) -> Option<Upload> {
		self.files.remove(name)
	}
}

impl From<HashMap<String, String>> for FormData {
	fn from(fields: HashMap<String, String>) -> Self {
		Self {
			fields,
			files: HashMap::new(),
		}
	}
}

#[axum::async_trait]
impl<S> FromRequest<S> for FormData
where
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let is_multipart = req
			.headers()
			.get(header::CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.is_some_and(|value| value.starts_with("multipart/form-data"));

		if !is_multipart {
			let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state).await?;

			return Ok(fields.into());
		}

		let mut multipart = Multipart::from_request(req, state).await?;
		let mut form = Self::default();

		while let Some(field) = multipart.next_field().await? {
			let Some(name) = field.name().map(str::to_owned) else {
				continue;
			};

			let Some(file_name) = field.file_name().map(str::to_owned) else {
				form.fields.insert(name, field.text().await?);
				continue;
			};

			let content_type = field.content_type().map(str::to_owned);
			let bytes = field.bytes().await?;

			// Browsers send an empty part for a file input left blank.
			if file_name.is_empty() && bytes.is_empty() {
				continue;
			}

			form.files.insert(
				name,
				Upload {
					file_name,
					content_type,
					bytes,
				},
			);
		}

		Ok(form)
	}
}

impl OperationInput for FormData {}
