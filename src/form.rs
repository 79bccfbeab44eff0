use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::Serialize;

/// Field name to the messages describing what is wrong with it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str = "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// A form as presented to the client: its current values and any errors
/// from the last submission.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Form<T> {
	pub data: T,
	pub errors: FieldErrors,
}

impl<T> Form<T> {
	/// A form that has not been submitted yet.
	pub fn unbound(data: T) -> Self {
		Self {
			data,
			errors: FieldErrors::new(),
		}
	}

	pub fn is_valid(&self) -> bool {
		self.errors.is_empty()
	}
}

/// Validator for fields that must not be empty.
pub fn required(value: &str) -> Result<(), validator::ValidationError> {
	if value.is_empty() {
		return Err(validator::ValidationError::new("required").with_message(REQUIRED.into()));
	}

	Ok(())
}

pub fn add_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
	errors.entry(field.to_owned()).or_default().push(message.into());
}

/// Binds `data`, running its validators and collecting their messages per field.
pub fn bind<T: validator::Validate>(data: T, mut errors: FieldErrors) -> Form<T> {
	if let Err(validation) = data.validate() {
		for (field, field_errors) in validation.field_errors() {
			for error in field_errors {
				let message = error.message.as_ref().unwrap_or(&error.code);

				add_error(&mut errors, &field, message.to_string());
			}
		}
	}

	Form { data, errors }
}
