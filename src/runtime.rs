//! Router runtime: construction, wiring, lifecycle.
//!
//! All router state that the classic plugin kept in module-level globals —
//! the fragment cache, the per-container records, the identity counter, the
//! reactive store — is owned by an explicitly constructed [`RouterRuntime`].
//! It is created once at application start and in practice never torn down,
//! but [`RouterRuntime::dispose`] exists so tests can run isolated
//! instances side by side.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::cache::{FragmentCache, FragmentFetcher};
use crate::dom::{Container, DocumentRoot};
use crate::host::{HostFramework, RouterStore};
use crate::loader::RouteLoader;
use crate::navigation::{Navigator, RouterHandle, parse_query};
use crate::orchestrator::RouterOrchestrator;
use crate::platform;

/// Tunable router constants and registration names.
#[derive(Debug, Clone)]
pub struct RouterOptions {
	/// How long an idle fragment cache entry is retained.
	pub idle_window: Duration,
	/// Delay before a swapped container is made fully visible again.
	pub reveal_delay: Duration,
	/// Name the reactive store is registered under.
	pub store_name: String,
	/// Name the magic helper is registered under.
	pub magic_name: String,
}

impl Default for RouterOptions {
	fn default() -> Self {
		Self {
			idle_window: Duration::from_millis(100),
			reveal_delay: Duration::from_millis(14),
			store_name: "router".to_string(),
			magic_name: "router".to_string(),
		}
	}
}

/// Owner of all router state and wiring.
pub struct RouterRuntime<C: Container> {
	document: Rc<dyn DocumentRoot<Container = C>>,
	navigator: Rc<dyn Navigator>,
	host: Rc<dyn HostFramework<Container = C>>,
	store: RouterStore,
	handle: RouterHandle,
	orchestrator: Rc<RouterOrchestrator<C>>,
	options: RouterOptions,
	disposed: Rc<Cell<bool>>,
}

impl<C: Container> RouterRuntime<C> {
	/// Builds the full router object graph over the given capabilities.
	///
	/// Nothing is wired to the outside world until
	/// [`RouterRuntime::install`] runs.
	pub fn new(
		document: Rc<dyn DocumentRoot<Container = C>>,
		navigator: Rc<dyn Navigator>,
		fetcher: Rc<dyn FragmentFetcher>,
		host: Rc<dyn HostFramework<Container = C>>,
		options: RouterOptions,
	) -> Self {
		let store = RouterStore::new(navigator.pathname(), parse_query(&navigator.search()));
		let handle = RouterHandle::new(Rc::clone(&navigator), store.clone());
		let cache = FragmentCache::new(fetcher, options.idle_window);
		let loader = Rc::new(RouteLoader::new(
			cache,
			Rc::clone(&navigator),
			Rc::clone(&host),
			options.clone(),
		));
		let orchestrator = Rc::new(RouterOrchestrator::new(Rc::clone(&document), loader));

		Self {
			document,
			navigator,
			host,
			store,
			handle,
			orchestrator,
			options,
			disposed: Rc::new(Cell::new(false)),
		}
	}

	/// Wires the router into the host framework and loads the initial
	/// route.
	///
	/// Registers the store and the magic helper, subscribes to navigation
	/// events and document mutations, schedules the initial scan, and
	/// finally starts the host framework.
	pub fn install(&self) {
		self.host.register_store(&self.options.store_name, &self.store);
		self.host.register_magic(&self.options.magic_name, &self.handle);

		let store = self.store.clone();
		let navigator = Rc::clone(&self.navigator);
		let orchestrator = Rc::clone(&self.orchestrator);
		let disposed = Rc::clone(&self.disposed);
		self.navigator.on_navigate(Rc::new(move || {
			if disposed.get() {
				return;
			}
			store.path.set(navigator.pathname());
			store.query.set(parse_query(&navigator.search()));
			schedule_scan(&orchestrator, &disposed);
		}));

		let orchestrator = Rc::clone(&self.orchestrator);
		let disposed = Rc::clone(&self.disposed);
		self.document.on_subtree_change(Rc::new(move || {
			schedule_scan(&orchestrator, &disposed);
		}));

		schedule_scan(&self.orchestrator, &self.disposed);
		self.host.start();
	}

	/// The navigation API handed to the host framework.
	pub fn handle(&self) -> RouterHandle {
		self.handle.clone()
	}

	/// The reactive store mirroring path and query.
	pub fn store(&self) -> &RouterStore {
		&self.store
	}

	/// The orchestrator driving scans.
	pub fn orchestrator(&self) -> &Rc<RouterOrchestrator<C>> {
		&self.orchestrator
	}

	/// Makes the runtime inert: further scans are dropped, pending loads
	/// become stale no-ops, and all cached state is released.
	pub fn dispose(&self) {
		self.disposed.set(true);
		self.orchestrator.loader().clear();
	}
}

fn schedule_scan<C: Container>(
	orchestrator: &Rc<RouterOrchestrator<C>>,
	disposed: &Rc<Cell<bool>>,
) {
	if disposed.get() {
		return;
	}
	let orchestrator = Rc::clone(orchestrator);
	let disposed = Rc::clone(disposed);
	platform::spawn_local(async move {
		// Re-checked at run time: the runtime may have been disposed
		// between scheduling and execution.
		if disposed.get() {
			return;
		}
		orchestrator.scan().await;
	});
}

/// Assembles and installs a router over the browser environment.
///
/// Uses the window's document, history, and an HTTP fragment fetcher with
/// default options. Returns the runtime, or `None` outside a browsing
/// context.
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub fn init<H>(host: H) -> Option<RouterRuntime<crate::dom::BrowserContainer>>
where
	H: HostFramework<Container = crate::dom::BrowserContainer> + 'static,
{
	let document = crate::dom::BrowserDocument::new()?;
	let runtime = RouterRuntime::new(
		Rc::new(document),
		Rc::new(crate::navigation::BrowserNavigator::new()),
		Rc::new(crate::cache::HttpFetcher),
		Rc::new(host),
		RouterOptions::default(),
	);
	runtime.install();
	Some(runtime)
}
