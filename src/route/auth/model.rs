use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username.chars().any(|c| !c.is_alphanumeric()) {
		return Err(ValidationError::new("username must be alphanumeric"));
	}

	Ok(())
}

/// A single user.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The user's primary email address.
	#[serde(skip_serializing)]
	#[allow(dead_code)]
	pub email: String,
	/// The hashed password.
	#[serde(skip)]
	pub password: Vec<u8>,
	/// The username that is displayed to the public.
	pub username: String,
	/// The creation time of the user.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Session {
	/// The session id.
	#[serde(rename = "session_id")]
	pub id: Uuid,
	/// The user that owns the session.
	#[serde(skip)]
	#[allow(dead_code)]
	pub user_id: Uuid,
	/// The creation time of the session.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct LoginInput {
	#[validate(length(min = 1, max = 150))]
	pub username: String,
	#[validate(length(min = 1, max = 128))]
	pub password: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct RegisterInput {
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
	/// The username that is displayed to the public.
	#[validate(length(min = 3, max = 16), custom(function = "validate_username"))]
	pub username: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct NextQuery {
	/// Where to go after logging in.
	pub next: Option<String>,
}

/// Context of the login page.
#[derive(Serialize, JsonSchema)]
pub struct LoginPage {
	pub next: Option<String>,
}
