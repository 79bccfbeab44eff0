#![warn(clippy::pedantic)]

mod cache;
mod config;
mod error;
mod extract;
mod form;
mod media;
mod openapi;
mod reply;
mod route;
mod session;
#[cfg(test)]
mod test;
mod trace;

use std::{str::FromStr, sync::Arc};

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{extract::DefaultBodyLimit, Extension, Router};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use crate::{cache::PageCache, config::Config};

pub type Database = sqlx::SqlitePool;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as a database connection pool, a hash configuration (if it's expensive to create),
/// or a cache.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	pub config: Arc<Config>,
	pub cache: PageCache,
}

impl State {
	pub fn new(database: Database, config: Config) -> Self {
		Self {
			database,
			hasher: Argon2::default(),
			config: Arc::new(config),
			cache: PageCache::new(),
		}
	}
}

/// Builds the router with every route, its documentation and middleware.
pub fn app(state: State) -> Router {
	let mut api = OpenApi::default();
	let body_limit = state.config.max_upload_bytes;

	ApiRouter::new()
		.merge(route::post::routes())
		.merge(route::group::routes())
		.merge(route::profile::routes())
		.nest("/auth", route::auth::routes())
		.merge(route::docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.fallback(error::not_found)
		.layer(Extension(Arc::new(api)))
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(TraceLayer::new_for_http())
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(CompressionLayer::new())
				.layer(DefaultBodyLimit::max(body_limit)),
		)
		.with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	dotenvy::dotenv().ok();

	let config = Config::load()?;
	let _guard = trace::init_tracing_subscriber(&config)?;

	let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
	let database = SqlitePoolOptions::new().connect_with(options).await?;

	sqlx::migrate!().run(&database).await?;

	let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;

	tracing::info!(address = %listener.local_addr()?, "listening");

	axum::serve(listener, app(State::new(database, config))).await?;

	Ok(())
}
