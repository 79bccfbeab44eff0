use std::{
	collections::HashMap,
	future::Future,
	sync::Arc,
	time::{Duration, Instant},
};

use axum::{
	body::{Body, Bytes},
	http::{header, Response},
	response::IntoResponse,
};
use tokio::sync::RwLock;

struct Entry {
	body: Bytes,
	expires_at: Instant,
}

/// A whole-response cache with a fixed lifetime per entry.
///
/// Entries are served verbatim until they expire or the cache is cleared,
/// so readers may observe data that has since changed.
#[derive(Clone, Default)]
pub struct PageCache {
	entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl PageCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached body for `key` if it has not expired yet.
	pub async fn get(&self, key: &str) -> Option<Bytes> {
		let entries = self.entries.read().await;
		let entry = entries.get(key)?;

		(entry.expires_at > Instant::now()).then(|| entry.body.clone())
	}

	pub async fn insert(&self, key: String, body: Bytes, ttl: Duration) {
		let now = Instant::now();
		let mut entries = self.entries.write().await;

		entries.retain(|_, entry| entry.expires_at > now);
		entries.insert(
			key,
			Entry {
				body,
				expires_at: now + ttl,
			},
		);
	}

	/// Returns the cached body for `key`, rendering and storing a new one
	/// when it is missing or expired.
	pub async fn get_or_try_insert<F, Fut, E>(
		&self,
		key: String,
		ttl: Duration,
		render: F,
	) -> Result<Bytes, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<Bytes, E>>,
	{
		if let Some(body) = self.get(&key).await {
			tracing::debug!(%key, "page cache hit");

			return Ok(body);
		}

		let body = render().await?;

		self.insert(key, body.clone(), ttl).await;

		Ok(body)
	}

	/// Drops every entry.
	pub async fn clear(&self) {
		self.entries.write().await.clear();
	}
}

/// A JSON body served straight from the [`PageCache`].
pub struct CachedJson(pub Bytes);

impl IntoResponse for CachedJson {
	fn into_response(self) -> Response<Body> {
		([(header::CONTENT_TYPE, "application/json")], self.0).into_response()
	}
}

impl aide::OperationOutput for CachedJson {
	type Inner = Bytes;
}

#[cfg(test)]
mod test {
	use std::convert::Infallible;

	use super::*;

	#[tokio::test]
	async fn test_serves_stale_until_cleared() {
		let cache = PageCache::new();
		let ttl = Duration::from_secs(60);

		let first = cache
			.get_or_try_insert("index_page:".into(), ttl, || async {
				Ok::<_, Infallible>(Bytes::from_static(b"first"))
			})
			.await
			.unwrap();

		let second = cache
			.get_or_try_insert("index_page:".into(), ttl, || async {
				Ok::<_, Infallible>(Bytes::from_static(b"second"))
			})
			.await
			.unwrap();

		assert_eq!(first, second);

		cache.clear().await;

		let third = cache
			.get_or_try_insert("index_page:".into(), ttl, || async {
				Ok::<_, Infallible>(Bytes::from_static(b"third"))
			})
			.await
			.unwrap();

		assert_eq!(third, Bytes::from_static(b"third"));
	}

	#[tokio::test]
	async fn test_expired_entry_is_regenerated() {
		let cache = PageCache::new();

		cache
			.insert("key".into(), Bytes::from_static(b"old"), Duration::ZERO)
			.await;

		assert!(cache.get("key").await.is_none());
	}

	#[tokio::test]
	async fn test_keys_are_independent() {
		let cache = PageCache::new();
		let ttl = Duration::from_secs(60);

		cache.insert("a".into(), Bytes::from_static(b"a"), ttl).await;
		cache.insert("b".into(), Bytes::from_static(b"b"), ttl).await;

		assert_eq!(cache.get("a").await, Some(Bytes::from_static(b"a")));
		assert_eq!(cache.get("b").await, Some(Bytes::from_static(b"b")));
	}
}
