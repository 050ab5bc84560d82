//! Document-wide container scanning.
//!
//! A scan walks every element carrying the router attribute, skips inert
//! ones (inside the default-route template, or with an empty namespace),
//! and runs the route loader for the rest concurrently. A `scanning` flag
//! drops scans that arrive while one is in flight — they are not queued;
//! the next navigation or mutation trigger starts a fresh one.

use std::cell::Cell;
use std::rc::Rc;

use futures::future;

use crate::dom::{Container, DocumentRoot};
use crate::loader::RouteLoader;
use crate::warn_log;

/// Drives the route loader across every container in the document.
pub struct RouterOrchestrator<C: Container> {
	document: Rc<dyn DocumentRoot<Container = C>>,
	loader: Rc<RouteLoader<C>>,
	scanning: Cell<bool>,
}

impl<C: Container> RouterOrchestrator<C> {
	/// Creates an orchestrator over `document` driving `loader`.
	pub fn new(document: Rc<dyn DocumentRoot<Container = C>>, loader: Rc<RouteLoader<C>>) -> Self {
		Self {
			document,
			loader,
			scanning: Cell::new(false),
		}
	}

	/// The loader this orchestrator drives.
	pub fn loader(&self) -> &Rc<RouteLoader<C>> {
		&self.loader
	}

	/// Loads the current route into every live container.
	///
	/// Returns immediately when a scan is already in flight; the guard is
	/// released once every loader from the running scan has finished.
	pub async fn scan(&self) {
		if self.scanning.replace(true) {
			return;
		}

		let mut loads = Vec::new();
		for container in self.document.router_containers() {
			if container.within_default_template() {
				warn_log!("router: skipping container inside the default route template");
				continue;
			}
			let Some(namespace) = container.namespace().filter(|name| !name.is_empty()) else {
				continue;
			};

			let loader = Rc::clone(&self.loader);
			loads.push(async move { loader.load(&container, &namespace).await });
		}
		future::join_all(loads).await;

		self.scanning.set(false);
	}
}

#[cfg(test)]
mod tests {
	use std::rc::Rc;
	use std::time::Duration;

	use super::*;
	use crate::cache::FragmentCache;
	use crate::navigation::Navigator;
	use crate::platform;
	use crate::runtime::RouterOptions;
	use crate::testing::{MockContainer, MockDocument, MockFetcher, MockHost, MockNavigator};

	fn orchestrator(
		fetcher: &MockFetcher,
		navigator: &MockNavigator,
		document: &MockDocument,
	) -> RouterOrchestrator<MockContainer> {
		let options = RouterOptions {
			reveal_delay: Duration::from_millis(1),
			..RouterOptions::default()
		};
		let cache = FragmentCache::new(Rc::new(fetcher.clone()), options.idle_window);
		let loader = Rc::new(RouteLoader::new(
			cache,
			Rc::new(navigator.clone()),
			Rc::new(MockHost::new()),
			options,
		));
		RouterOrchestrator::new(Rc::new(document.clone()), loader)
	}

	#[tokio::test]
	async fn test_scan_loads_every_container() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/page.html", "<p>Main</p>");
		fetcher.respond("/sidebar/page.html", "<p>Side</p>");
		let navigator = MockNavigator::new("/page");
		let document = MockDocument::new();
		let main = MockContainer::with_namespace("content", "");
		let side = MockContainer::with_namespace("sidebar", "");
		document.add_container(main.clone());
		document.add_container(side.clone());

		orchestrator(&fetcher, &navigator, &document).scan().await;

		assert_eq!(main.html(), "<p>Main</p>");
		assert_eq!(side.html(), "<p>Side</p>");
	}

	#[tokio::test]
	async fn test_scan_skips_inert_and_unnamed_containers() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/page.html", "<p>Main</p>");
		let navigator = MockNavigator::new("/page");
		let document = MockDocument::new();

		let live = MockContainer::with_namespace("content", "");
		let inert = MockContainer::with_namespace("content", "<p>Template</p>");
		inert.set_inert(true);
		let unnamed = MockContainer::new("<p>Plain</p>");
		document.add_container(live.clone());
		document.add_container(inert.clone());
		document.add_container(unnamed.clone());

		orchestrator(&fetcher, &navigator, &document).scan().await;

		assert_eq!(live.html(), "<p>Main</p>");
		assert_eq!(inert.html(), "<p>Template</p>");
		assert_eq!(unnamed.html(), "<p>Plain</p>");
		assert_eq!(fetcher.call_count(), 1);
	}

	#[tokio::test]
	async fn test_overlapping_scan_is_dropped() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/page.html", "<p>Main</p>");
		fetcher.set_delay(Duration::from_millis(30));
		let navigator = MockNavigator::new("/page");
		let document = MockDocument::new();
		document.add_container(MockContainer::with_namespace("content", ""));

		let orchestrator = orchestrator(&fetcher, &navigator, &document);
		// The second scan starts while the first is suspended in its fetch
		// and must return without loading anything.
		futures::join!(orchestrator.scan(), orchestrator.scan());

		assert_eq!(fetcher.call_count(), 1);
	}

	#[tokio::test]
	async fn test_guard_released_after_scan_completes() {
		let fetcher = MockFetcher::new();
		fetcher.respond("/content/a.html", "<p>A</p>");
		fetcher.respond("/content/b.html", "<p>B</p>");
		let navigator = MockNavigator::new("/a");
		let document = MockDocument::new();
		let container = MockContainer::with_namespace("content", "");
		document.add_container(container.clone());

		let orchestrator = orchestrator(&fetcher, &navigator, &document);
		orchestrator.scan().await;
		assert_eq!(container.html(), "<p>A</p>");

		navigator.replace("/b");
		orchestrator.scan().await;
		assert_eq!(container.html(), "<p>B</p>");

		// A dropped mid-flight scan is not queued: nothing re-runs it.
		platform::sleep(Duration::from_millis(10)).await;
		assert_eq!(fetcher.call_count(), 2);
	}
}
