use aide::{
	openapi::{ApiKeyLocation, SecurityScheme, Tag},
	transform::TransformOpenApi,
};

use crate::{error, extract::Json, session};

pub const SECURITY_SCHEME_SESSION: &str = "Session";

pub mod tag {
	pub const AUTH: &str = "Auth";
	pub const POST: &str = "Post";
	pub const GROUP: &str = "Group";
	pub const PROFILE: &str = "Profile";
}

fn tag(name: &str, description: &str) -> Tag {
	Tag {
		name: name.into(),
		description: Some(description.into()),
		..Default::default()
	}
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Yatube")
		.summary("A blog platform with groups, comments and subscriptions")
		.description(include_str!("../README.md"))
		.tag(tag(tag::AUTH, "User authentication"))
		.tag(tag(tag::POST, "Posts and their comments"))
		.tag(tag(tag::GROUP, "Post groups"))
		.tag(tag(tag::PROFILE, "Author profiles and subscriptions"))
		.security_scheme(
			SECURITY_SCHEME_SESSION,
			SecurityScheme::ApiKey {
				location: ApiKeyLocation::Cookie,
				name: session::COOKIE_NAME.into(),
				description: Some("A user session cookie".into()),
				extensions: Default::default(),
			},
		)
		.default_response_with::<Json<error::ErrorResponse>, _>(|res| {
			res.example(error::ErrorResponse {
				success: false,
				errors: error::Message::new("error message")
					.field("optional field")
					.detail("key", "value")
					.into_vec(),
			})
		})
}
