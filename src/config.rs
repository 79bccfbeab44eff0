use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::level_filters::LevelFilter;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("invalid value {value:?} for {key}: {reason}")]
	Invalid {
		key: &'static str,
		value: String,
		reason: String,
	},
}

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
	pub database_url: String,
	pub host: String,
	pub port: u16,
	/// Number of posts on every paginated listing.
	pub posts_per_page: i64,
	/// How long a rendered home page is served from the cache.
	pub index_cache_ttl: Duration,
	/// Directory that uploaded images are written under.
	pub media_root: PathBuf,
	pub max_upload_bytes: usize,
	pub log_level: LevelFilter,
	pub otlp_endpoint: Option<String>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			database_url: "sqlite://yatube.db?mode=rwc".into(),
			host: "127.0.0.1".into(),
			port: 3000,
			posts_per_page: 10,
			index_cache_ttl: Duration::from_secs(20),
			media_root: PathBuf::from("media"),
			max_upload_bytes: 5 * 1024 * 1024,
			log_level: LevelFilter::INFO,
			otlp_endpoint: None,
		}
	}
}

impl Config {
	/// Reads the configuration from the environment, falling back to
	/// [`Config::default`] for every variable that is not set.
	pub fn load() -> Result<Self, Error> {
		let default = Self::default();

		Ok(Self {
			database_url: var("DATABASE_URL").unwrap_or(default.database_url),
			host: var("HOST").unwrap_or(default.host),
			port: parse("PORT")?.unwrap_or(default.port),
			posts_per_page: parse("POSTS_IN_PAGE")?.unwrap_or(default.posts_per_page),
			index_cache_ttl: parse("INDEX_CACHE_SECONDS")?
				.map_or(default.index_cache_ttl, Duration::from_secs),
			media_root: var("MEDIA_ROOT").map_or(default.media_root, PathBuf::from),
			max_upload_bytes: parse("MAX_UPLOAD_BYTES")?.unwrap_or(default.max_upload_bytes),
			log_level: parse("LOG_LEVEL")?.unwrap_or(default.log_level),
			otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
		})
	}
}

fn var(key: &'static str) -> Option<String> {
	env::var(key).ok().filter(|value| !value.is_empty())
}

fn parse<T>(key: &'static str) -> Result<Option<T>, Error>
where
	T: FromStr,
	T::Err: Display,
{
	var(key)
		.map(|value| {
			value.parse().map_err(|e: T::Err| Error::Invalid {
				key,
				reason: e.to_string(),
				value,
			})
		})
		.transpose()
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_parse_reports_key() {
		env::set_var("YATUBE_TEST_PORT", "not-a-port");

		let error = parse::<u16>("YATUBE_TEST_PORT").unwrap_err();

		assert!(error.to_string().contains("YATUBE_TEST_PORT"));

		env::remove_var("YATUBE_TEST_PORT");
	}

	#[test]
	fn test_unset_is_none() {
		assert!(parse::<u16>("YATUBE_TEST_UNSET").unwrap().is_none());
	}
}
