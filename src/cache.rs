//! Fragment cache with request coalescing.
//!
//! Rapid navigation can ask for the same fragment several times before the
//! first response lands (every container re-scan walks every container). The
//! cache keys in-flight and recently resolved fetches by
//! `(namespace, path)` and hands the same shared future to every caller
//! inside a short idle window, so a burst of identical requests costs one
//! network round trip. Failed fetches stay cached for the same window, which
//! coalesces retries during a burst instead of hammering a broken endpoint.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};

use crate::error::{RouterError, RouterResult};
use crate::platform;

/// A coalesced fragment fetch: pending or resolved, shared between callers.
pub type FragmentFuture = Shared<LocalBoxFuture<'static, RouterResult<String>>>;

/// Transport capability for fragment retrieval.
///
/// Implementations issue a `GET` for the given URL and resolve to the body
/// text, rejecting with [`RouterError::Fetch`] on a non-2xx response and
/// [`RouterError::Network`] when no response arrives at all.
pub trait FragmentFetcher {
	/// Fetches the fragment at `url`.
	fn fetch(&self, url: &str) -> LocalBoxFuture<'static, RouterResult<String>>;
}

/// Cache key: which fragment collection, which (normalized) path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FragmentKey {
	/// The fragment collection the container loads from.
	pub namespace: String,
	/// The normalized request path (no leading slash).
	pub path: String,
}

struct CacheSlot {
	fragment: FragmentFuture,
	touched_at: f64,
}

/// Deduplicating fragment store with idle expiry.
///
/// Every [`FragmentCache::get`] re-arms the entry's idle window; an entry
/// that has not been asked for within the window is dropped and the next
/// request fetches fresh.
pub struct FragmentCache {
	fetcher: Rc<dyn FragmentFetcher>,
	idle_window: Duration,
	slots: RefCell<HashMap<FragmentKey, CacheSlot>>,
}

impl FragmentCache {
	/// Creates a cache that fetches through `fetcher` and retains idle
	/// entries for `idle_window`.
	pub fn new(fetcher: Rc<dyn FragmentFetcher>, idle_window: Duration) -> Self {
		Self {
			fetcher,
			idle_window,
			slots: RefCell::new(HashMap::new()),
		}
	}

	/// Returns the shared fetch for `(namespace, path)`.
	///
	/// A live entry is returned unchanged (no new request); otherwise the
	/// fetch is issued and cached. Either way the entry's idle window
	/// restarts now.
	pub fn get(&self, namespace: &str, path: &str) -> FragmentFuture {
		let key = FragmentKey {
			namespace: namespace.to_string(),
			path: normalize_path(path),
		};
		let now = platform::now_ms();
		let idle_millis = self.idle_window.as_secs_f64() * 1000.0;

		let mut slots = self.slots.borrow_mut();
		slots.retain(|_, slot| now - slot.touched_at <= idle_millis);

		if let Some(slot) = slots.get_mut(&key) {
			slot.touched_at = now;
			return slot.fragment.clone();
		}

		let url = fragment_url(&key.namespace, &key.path);
		let fragment = self.fetcher.fetch(&url).shared();
		slots.insert(
			key,
			CacheSlot {
				fragment: fragment.clone(),
				touched_at: now,
			},
		);
		fragment
	}

	/// Number of live cache entries.
	pub fn len(&self) -> usize {
		self.slots.borrow().len()
	}

	/// Whether the cache currently holds no entries.
	pub fn is_empty(&self) -> bool {
		self.slots.borrow().is_empty()
	}

	/// Drops every entry, pending or resolved.
	pub fn clear(&self) {
		self.slots.borrow_mut().clear();
	}
}

/// Trims whitespace and at most one leading slash from a request path.
fn normalize_path(path: &str) -> String {
	let trimmed = path.trim();
	trimmed.strip_prefix('/').unwrap_or(trimmed).to_string()
}

/// Builds the fetch target for a normalized path: `/{namespace}/{path}.html`.
fn fragment_url(namespace: &str, path: &str) -> String {
	format!("/{namespace}/{path}.html")
}

/// Fragment transport over HTTP.
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
impl FragmentFetcher for HttpFetcher {
	fn fetch(&self, url: &str) -> LocalBoxFuture<'static, RouterResult<String>> {
		let url = url.to_string();
		async move {
			let response = reqwest::get(&url).await.map_err(|error| RouterError::Network {
				url: url.clone(),
				message: error.to_string(),
			})?;

			let status = response.status();
			if !status.is_success() {
				return Err(RouterError::Fetch {
					url: url.clone(),
					status: status.as_u16(),
					status_text: status.canonical_reason().unwrap_or_default().to_string(),
				});
			}

			response.text().await.map_err(|error| RouterError::Network {
				url,
				message: error.to_string(),
			})
		}
		.boxed_local()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::MockFetcher;

	fn cache_with(fetcher: &MockFetcher, idle: Duration) -> FragmentCache {
		FragmentCache::new(Rc::new(fetcher.clone()), idle)
	}

	#[test]
	fn test_normalize_path() {
		assert_eq!(normalize_path("/about"), "about");
		assert_eq!(normalize_path("  /about  "), "about");
		assert_eq!(normalize_path("about"), "about");
		assert_eq!(normalize_path("/nested/page"), "nested/page");
	}

	#[test]
	fn test_fragment_url() {
		assert_eq!(fragment_url("content", "about"), "/content/about.html");
		assert_eq!(
			fragment_url("docs", "guide/install"),
			"/docs/guide/install.html"
		);
	}

	#[tokio::test]
	async fn test_coalesces_identical_requests() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/about.html", "<p>About</p>");
		let cache = cache_with(&fetcher, Duration::from_millis(100));

		let first = cache.get("content", "/about");
		let second = cache.get("content", "/about");

		assert_eq!(first.await.unwrap(), "<p>About</p>");
		assert_eq!(second.await.unwrap(), "<p>About</p>");
		assert_eq!(fetcher.call_count(), 1);
	}

	#[tokio::test]
	async fn test_distinct_keys_fetch_independently() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/a.html", "A");
		fetcher.respond("/shop/a.html", "B");
		let cache = cache_with(&fetcher, Duration::from_millis(100));

		assert_eq!(cache.get("content", "a").await.unwrap(), "A");
		assert_eq!(cache.get("shop", "a").await.unwrap(), "B");
		assert_eq!(fetcher.call_count(), 2);
	}

	#[tokio::test]
	async fn test_refetches_after_idle_window() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/about.html", "<p>About</p>");
		let cache = cache_with(&fetcher, Duration::from_millis(30));

		cache.get("content", "about").await.unwrap();
		platform::sleep(Duration::from_millis(60)).await;
		cache.get("content", "about").await.unwrap();

		assert_eq!(fetcher.call_count(), 2);
	}

	#[tokio::test]
	async fn test_hit_rearms_idle_window() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/about.html", "<p>About</p>");
		let cache = cache_with(&fetcher, Duration::from_millis(50));

		cache.get("content", "about").await.unwrap();
		platform::sleep(Duration::from_millis(30)).await;
		// Still inside the window: re-arms it instead of refetching.
		cache.get("content", "about").await.unwrap();
		platform::sleep(Duration::from_millis(30)).await;
		cache.get("content", "about").await.unwrap();

		assert_eq!(fetcher.call_count(), 1);
	}

	#[tokio::test]
	async fn test_failure_stays_cached_until_expiry() {
		let fetcher = MockFetcher::new();
		let cache = cache_with(&fetcher, Duration::from_millis(100));

		let first = cache.get("content", "missing").await;
		let second = cache.get("content", "missing").await;

		assert!(matches!(first, Err(RouterError::Fetch { status: 404, .. })));
		assert_eq!(first, second);
		assert_eq!(fetcher.call_count(), 1);
	}

	#[tokio::test]
	async fn test_clear_drops_entries() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/about.html", "x");
		let cache = cache_with(&fetcher, Duration::from_millis(100));

		cache.get("content", "about").await.unwrap();
		assert_eq!(cache.len(), 1);

		cache.clear();
		assert!(cache.is_empty());

		cache.get("content", "about").await.unwrap();
		assert_eq!(fetcher.call_count(), 2);
	}
}
