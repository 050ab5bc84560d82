//! Route-load coordinator.
//!
//! One [`RouteLoader::load`] call drives one container through a path
//! change: decide fetch vs. restore-default vs. no-op, hold the fade
//! transition, swap the markup, trigger a host re-scan, and restore
//! visibility. Loads for different containers run concurrently and
//! independently.
//!
//! Re-entrancy is handled by committing the target path to the container's
//! record before the first suspension point: a second load triggered
//! mid-flight for the same target sees the commit and no-ops. Loads for a
//! *newer* target additionally bump the record's generation; a superseded
//! load notices the newer generation at each later step and discards its
//! result instead of overwriting newer content (a deliberate change from
//! the classic fire-and-forget swap, which let a slow stale response win).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::cache::FragmentCache;
use crate::dom::{Container, TRANSITION_ATTR, TRANSITION_FADE};
use crate::error::RouterResult;
use crate::error_log;
use crate::host::HostFramework;
use crate::navigation::Navigator;
use crate::platform;
use crate::runtime::RouterOptions;
use crate::transition::opacity_fade_duration;

/// Markup swapped in when a fragment fails to load.
pub const NOT_FOUND_FRAGMENT: &str = "<h2>404 - Not Found</h2>";

const ROOT_PATH: &str = "/";

/// Per-container routing state.
///
/// Lives in a table owned by the loader, keyed by the container's identity;
/// records are created on first sight of a container and never destroyed
/// (page-lifetime, bounded by container count).
#[derive(Debug, Clone)]
pub struct ContainerRecord {
	/// Identity assigned to the container on first load.
	pub identity: u64,
	/// Path whose fragment currently occupies the container; `None` until
	/// the first load commits.
	pub last_loaded_path: Option<String>,
	/// The container's original markup, captured once before any swap.
	pub default_content: Option<String>,
	/// Token of the most recently committed load for this container.
	pub generation: u64,
}

impl ContainerRecord {
	fn new(identity: u64) -> Self {
		Self {
			identity,
			last_loaded_path: None,
			default_content: None,
			generation: 0,
		}
	}
}

/// Per-container load state machine.
pub struct RouteLoader<C: Container> {
	cache: FragmentCache,
	navigator: Rc<dyn Navigator>,
	host: Rc<dyn HostFramework<Container = C>>,
	options: RouterOptions,
	records: RefCell<HashMap<u64, ContainerRecord>>,
	next_identity: Cell<u64>,
}

impl<C: Container> RouteLoader<C> {
	/// Creates a loader over the given cache, navigator, and host.
	pub fn new(
		cache: FragmentCache,
		navigator: Rc<dyn Navigator>,
		host: Rc<dyn HostFramework<Container = C>>,
		options: RouterOptions,
	) -> Self {
		Self {
			cache,
			navigator,
			host,
			options,
			records: RefCell::new(HashMap::new()),
			next_identity: Cell::new(0),
		}
	}

	/// Loads the fragment for the current path into `container`.
	///
	/// Never fails from the caller's perspective: fetch errors downgrade to
	/// the not-found fallback, anything else is logged and swallowed here.
	pub async fn load(&self, container: &C, namespace: &str) {
		if let Err(error) = self.try_load(container, namespace).await {
			error_log!("router: unexpected error while loading route: {error}");
		}
	}

	async fn try_load(&self, container: &C, namespace: &str) -> RouterResult<()> {
		let path = self.navigator.pathname();
		let identity = self.ensure_identity(container);

		// Commit before the first suspension point: concurrent re-entrant
		// calls for the same target must see the new path and no-op.
		let (first_load, generation) = {
			let mut records = self.records.borrow_mut();
			let record = records
				.entry(identity)
				.or_insert_with(|| ContainerRecord::new(identity));

			if record.last_loaded_path.as_deref() == Some(path.as_str()) {
				return Ok(());
			}

			let first_load = record.last_loaded_path.is_none();
			if first_load {
				record.default_content = Some(container.inner_html());
			}
			record.last_loaded_path = Some(path.clone());
			record.generation += 1;
			(first_load, record.generation)
		};

		// A container's initial markup already is its default content.
		if first_load && path == ROOT_PATH {
			return Ok(());
		}

		if container.attribute(TRANSITION_ATTR).as_deref() == Some(TRANSITION_FADE) {
			container.set_opacity(0.0);
			let hold = opacity_fade_duration(&container.computed_transition());
			if !hold.is_zero() {
				platform::sleep(hold).await;
			}
		}

		let outcome = self.swap(container, namespace, &path, identity, generation).await;

		// Visibility is restored no matter how the swap went; a superseded
		// load leaves it to the newer one.
		platform::sleep(self.options.reveal_delay).await;
		if self.is_current(identity, generation) {
			container.set_opacity(1.0);
		}

		outcome
	}

	async fn swap(
		&self,
		container: &C,
		namespace: &str,
		path: &str,
		identity: u64,
		generation: u64,
	) -> RouterResult<()> {
		if path == ROOT_PATH {
			if !self.is_current(identity, generation) {
				return Ok(());
			}
			let markup = self
				.records
				.borrow()
				.get(&identity)
				.and_then(|record| record.default_content.clone())
				.unwrap_or_default();
			container.set_inner_html(&markup);
			return self.host.rescan_subtree(container);
		}

		let fragment = self.cache.get(namespace, path).await;
		if !self.is_current(identity, generation) {
			return Ok(());
		}

		match fragment {
			Ok(html) => {
				container.set_inner_html(&html);
				self.host.rescan_subtree(container)
			}
			Err(error) => {
				error_log!("router: error loading route {path}: {error}");
				container.set_inner_html(NOT_FOUND_FRAGMENT);
				Ok(())
			}
		}
	}

	/// Returns the container's identity, assigning one on first sight.
	fn ensure_identity(&self, container: &C) -> u64 {
		if let Some(id) = container.stable_id() {
			return id;
		}

		let id = self.next_identity.get() + 1;
		self.next_identity.set(id);
		container.mark_stable_id(id);
		id
	}

	fn is_current(&self, identity: u64, generation: u64) -> bool {
		self.records
			.borrow()
			.get(&identity)
			.is_some_and(|record| record.generation == generation)
	}

	/// Returns a snapshot of the record for `identity`, if one exists.
	pub fn record(&self, identity: u64) -> Option<ContainerRecord> {
		self.records.borrow().get(&identity).cloned()
	}

	/// Drops all per-container state and cached fragments.
	pub fn clear(&self) {
		self.records.borrow_mut().clear();
		self.cache.clear();
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;
	use crate::error::RouterError;
	use crate::testing::{MockContainer, MockFetcher, MockHost, MockNavigator};

	fn loader(
		fetcher: &MockFetcher,
		navigator: &MockNavigator,
		host: &MockHost,
	) -> RouteLoader<MockContainer> {
		let options = RouterOptions {
			reveal_delay: Duration::from_millis(1),
			..RouterOptions::default()
		};
		let cache = FragmentCache::new(Rc::new(fetcher.clone()), options.idle_window);
		RouteLoader::new(cache, Rc::new(navigator.clone()), Rc::new(host.clone()), options)
	}

	#[tokio::test]
	async fn test_first_load_at_root_is_a_no_op() {
		let fetcher = MockFetcher::new();
		let navigator = MockNavigator::new("/");
		let host = MockHost::new();
		let loader = loader(&fetcher, &navigator, &host);
		let container = MockContainer::with_namespace("content", "<p>Default</p>");

		loader.load(&container, "content").await;

		assert_eq!(container.html(), "<p>Default</p>");
		assert_eq!(fetcher.call_count(), 0);
		assert_eq!(host.rescan_count(), 0);

		let record = loader.record(1).unwrap();
		assert_eq!(record.last_loaded_path.as_deref(), Some("/"));
		assert_eq!(record.default_content.as_deref(), Some("<p>Default</p>"));
	}

	#[tokio::test]
	async fn test_load_fetches_and_swaps() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/about.html", "<p>About</p>");
		let navigator = MockNavigator::new("/about");
		let host = MockHost::new();
		let loader = loader(&fetcher, &navigator, &host);
		let container = MockContainer::with_namespace("content", "<p>Default</p>");

		loader.load(&container, "content").await;

		assert_eq!(container.html(), "<p>About</p>");
		assert_eq!(host.rescan_count(), 1);
		assert_eq!(
			loader.record(1).unwrap().last_loaded_path.as_deref(),
			Some("/about")
		);
	}

	#[tokio::test]
	async fn test_repeated_load_same_path_is_idempotent() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/about.html", "<p>About</p>");
		let navigator = MockNavigator::new("/about");
		let host = MockHost::new();
		let loader = loader(&fetcher, &navigator, &host);
		let container = MockContainer::with_namespace("content", "<p>Default</p>");

		loader.load(&container, "content").await;
		loader.load(&container, "content").await;

		assert_eq!(fetcher.call_count(), 1);
		assert_eq!(host.rescan_count(), 1);
	}

	#[tokio::test]
	async fn test_default_content_restored_at_root() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/about.html", "<p>About</p>");
		let navigator = MockNavigator::new("/about");
		let host = MockHost::new();
		let loader = loader(&fetcher, &navigator, &host);
		let container = MockContainer::with_namespace("content", "<p>Default</p>");

		loader.load(&container, "content").await;
		assert_eq!(container.html(), "<p>About</p>");

		navigator.replace("/");
		loader.load(&container, "content").await;

		assert_eq!(container.html(), "<p>Default</p>");
		// Root restores never hit the network.
		assert_eq!(fetcher.call_count(), 1);
		assert_eq!(host.rescan_count(), 2);
	}

	#[tokio::test]
	async fn test_default_content_captured_only_once() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/a.html", "<p>A</p>");
		fetcher.respond("/content/b.html", "<p>B</p>");
		let navigator = MockNavigator::new("/a");
		let host = MockHost::new();
		let loader = loader(&fetcher, &navigator, &host);
		let container = MockContainer::with_namespace("content", "<p>Original</p>");

		loader.load(&container, "content").await;
		navigator.replace("/b");
		loader.load(&container, "content").await;

		assert_eq!(
			loader.record(1).unwrap().default_content.as_deref(),
			Some("<p>Original</p>")
		);
	}

	#[tokio::test]
	async fn test_fetch_failure_renders_fallback_and_commits_path() {
		let fetcher = MockFetcher::new();
		let navigator = MockNavigator::new("/missing");
		let host = MockHost::new();
		let loader = loader(&fetcher, &navigator, &host);
		let container = MockContainer::with_namespace("content", "<p>Default</p>");

		loader.load(&container, "content").await;

		assert_eq!(container.html(), NOT_FOUND_FRAGMENT);
		assert_eq!(host.rescan_count(), 0);
		// The path is committed, so a re-scan does not retry.
		assert_eq!(
			loader.record(1).unwrap().last_loaded_path.as_deref(),
			Some("/missing")
		);

		loader.load(&container, "content").await;
		assert_eq!(fetcher.call_count(), 1);
	}

	#[tokio::test]
	async fn test_network_failure_renders_fallback() {
		let fetcher = MockFetcher::new();
		fetcher.fail(
			"/content/flaky.html",
			RouterError::Network {
				url: "/content/flaky.html".to_string(),
				message: "offline".to_string(),
			},
		);
		let navigator = MockNavigator::new("/flaky");
		let host = MockHost::new();
		let loader = loader(&fetcher, &navigator, &host);
		let container = MockContainer::with_namespace("content", "<p>Default</p>");

		loader.load(&container, "content").await;

		assert_eq!(container.html(), NOT_FOUND_FRAGMENT);
	}

	#[tokio::test]
	async fn test_fade_container_is_revealed_after_swap() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/about.html", "<p>About</p>");
		let navigator = MockNavigator::new("/about");
		let host = MockHost::new();
		let loader = loader(&fetcher, &navigator, &host);
		let container = MockContainer::with_namespace("content", "<p>Default</p>");
		container.set_attribute(TRANSITION_ATTR, TRANSITION_FADE);
		container.set_transition("opacity", "0.01s");

		loader.load(&container, "content").await;

		assert_eq!(container.html(), "<p>About</p>");
		assert_eq!(container.opacity(), 1.0);
	}

	#[tokio::test]
	async fn test_stale_load_discards_its_result() {
		let task = tokio::task::LocalSet::new();
		task.run_until(async {
			let fetcher = MockFetcher::new();
			fetcher.respond("/content/slow.html", "<p>Slow</p>");
			fetcher.respond("/content/fast.html", "<p>Fast</p>");
			fetcher.set_delay(Duration::from_millis(40));
			let navigator = MockNavigator::new("/slow");
			let host = MockHost::new();
			let loader = Rc::new(loader(&fetcher, &navigator, &host));
			let container = MockContainer::with_namespace("content", "<p>Default</p>");

			let slow = {
				let loader = Rc::clone(&loader);
				let container = container.clone();
				tokio::task::spawn_local(async move {
					loader.load(&container, "content").await;
				})
			};

			// Let the slow load commit and suspend in its fetch.
			platform::sleep(Duration::from_millis(5)).await;
			fetcher.set_delay(Duration::ZERO);
			navigator.replace("/fast");
			loader.load(&container, "content").await;
			assert_eq!(container.html(), "<p>Fast</p>");

			slow.await.unwrap();

			// The slow response landed afterwards but was discarded.
			assert_eq!(container.html(), "<p>Fast</p>");
			assert_eq!(
				loader.record(1).unwrap().last_loaded_path.as_deref(),
				Some("/fast")
			);
		})
		.await;
	}
}
