//! Mock implementations of the router's capability traits.
//!
//! These run on any target and let the whole routing stack execute under a
//! plain test runtime: canned fragment responses with optional latency, an
//! in-memory history stack, a scriptable document, and a host that records
//! every registration and re-scan.
//!
//! # Example
//!
//! ```ignore
//! use musette::testing::{MockContainer, MockFetcher, MockNavigator};
//!
//! let fetcher = MockFetcher::new();
//! fetcher.respond("/content/about.html", "<p>About</p>");
//!
//! let navigator = MockNavigator::new("/about");
//! let container = MockContainer::with_namespace("content", "<p>Home</p>");
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::cache::FragmentFetcher;
use crate::dom::{Container, DocumentRoot, NAMESPACE_ATTR};
use crate::error::{RouterError, RouterResult};
use crate::host::{HostFramework, RouterStore};
use crate::navigation::{Navigator, RouterHandle};
use crate::platform;
use crate::transition::ComputedTransition;

// ---------------------------------------------------------------------------
// MockContainer

#[derive(Debug)]
struct MockContainerState {
	attributes: RefCell<HashMap<String, String>>,
	html: RefCell<String>,
	opacity: Cell<f64>,
	stable_id: Cell<Option<u64>>,
	inert: Cell<bool>,
	transition: RefCell<ComputedTransition>,
}

/// An in-memory routed container.
///
/// Clones share the same state, mirroring how DOM element handles share the
/// same element.
#[derive(Debug, Clone)]
pub struct MockContainer {
	state: Rc<MockContainerState>,
}

impl MockContainer {
	/// Creates a container with the given initial markup and no attributes.
	pub fn new(html: &str) -> Self {
		Self {
			state: Rc::new(MockContainerState {
				attributes: RefCell::new(HashMap::new()),
				html: RefCell::new(html.to_string()),
				opacity: Cell::new(1.0),
				stable_id: Cell::new(None),
				inert: Cell::new(false),
				transition: RefCell::new(ComputedTransition::default()),
			}),
		}
	}

	/// Creates a container declaring the given fragment namespace.
	pub fn with_namespace(namespace: &str, html: &str) -> Self {
		let container = Self::new(html);
		container.set_attribute(NAMESPACE_ATTR, namespace);
		container
	}

	/// Sets an attribute on the container.
	pub fn set_attribute(&self, name: &str, value: &str) {
		self.state
			.attributes
			.borrow_mut()
			.insert(name.to_string(), value.to_string());
	}

	/// Current markup of the container.
	pub fn html(&self) -> String {
		self.state.html.borrow().clone()
	}

	/// Current opacity of the container (`1.0` until a loader changes it).
	pub fn opacity(&self) -> f64 {
		self.state.opacity.get()
	}

	/// Declares the computed transition lists reported by this container.
	pub fn set_transition(&self, properties: &str, durations: &str) {
		*self.state.transition.borrow_mut() = ComputedTransition::new(properties, durations);
	}

	/// Marks the container as sitting inside the default-route template.
	pub fn set_inert(&self, inert: bool) {
		self.state.inert.set(inert);
	}
}

impl Container for MockContainer {
	fn attribute(&self, name: &str) -> Option<String> {
		self.state.attributes.borrow().get(name).cloned()
	}

	fn inner_html(&self) -> String {
		self.html()
	}

	fn set_inner_html(&self, html: &str) {
		*self.state.html.borrow_mut() = html.to_string();
	}

	fn set_opacity(&self, opacity: f64) {
		self.state.opacity.set(opacity);
	}

	fn computed_transition(&self) -> ComputedTransition {
		self.state.transition.borrow().clone()
	}

	fn stable_id(&self) -> Option<u64> {
		self.state.stable_id.get()
	}

	fn mark_stable_id(&self, id: u64) {
		self.state.stable_id.set(Some(id));
	}

	fn within_default_template(&self) -> bool {
		self.state.inert.get()
	}
}

// ---------------------------------------------------------------------------
// MockDocument

#[derive(Default)]
struct MockDocumentState {
	containers: RefCell<Vec<MockContainer>>,
	observers: RefCell<Vec<Rc<dyn Fn()>>>,
}

/// A scriptable document: containers are registered by hand and subtree
/// mutations are fired with [`MockDocument::mutate`].
#[derive(Clone, Default)]
pub struct MockDocument {
	state: Rc<MockDocumentState>,
}

impl MockDocument {
	/// Creates an empty document.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a container, as if it were inserted into the page.
	pub fn add_container(&self, container: MockContainer) {
		self.state.containers.borrow_mut().push(container);
	}

	/// Fires every subtree-change callback, as a DOM mutation would.
	pub fn mutate(&self) {
		let observers = self.state.observers.borrow().clone();
		for observer in observers {
			observer();
		}
	}
}

impl DocumentRoot for MockDocument {
	type Container = MockContainer;

	fn router_containers(&self) -> Vec<MockContainer> {
		self.state
			.containers
			.borrow()
			.iter()
			.filter(|container| container.namespace().is_some())
			.cloned()
			.collect()
	}

	fn on_subtree_change(&self, callback: Rc<dyn Fn()>) {
		self.state.observers.borrow_mut().push(callback);
	}
}

// ---------------------------------------------------------------------------
// MockNavigator

struct MockNavigatorState {
	stack: RefCell<Vec<String>>,
	listeners: RefCell<Vec<Rc<dyn Fn()>>>,
}

/// An in-memory history stack.
///
/// Unlike a browser, [`MockNavigator::back`] delivers its navigation event
/// synchronously before returning.
#[derive(Clone)]
pub struct MockNavigator {
	state: Rc<MockNavigatorState>,
}

impl MockNavigator {
	/// Creates a navigator whose history contains only `initial`
	/// (a path with optional query string, e.g. `"/shop?item=7"`).
	pub fn new(initial: &str) -> Self {
		Self {
			state: Rc::new(MockNavigatorState {
				stack: RefCell::new(vec![initial.to_string()]),
				listeners: RefCell::new(Vec::new()),
			}),
		}
	}

	/// The full current URL (path plus query string).
	pub fn current_url(&self) -> String {
		self.state
			.stack
			.borrow()
			.last()
			.cloned()
			.unwrap_or_else(|| "/".to_string())
	}

	/// Number of entries on the history stack.
	pub fn history_depth(&self) -> usize {
		self.state.stack.borrow().len()
	}

	fn notify(&self) {
		let listeners = self.state.listeners.borrow().clone();
		for listener in listeners {
			listener();
		}
	}
}

impl Default for MockNavigator {
	fn default() -> Self {
		Self::new("/")
	}
}

impl Navigator for MockNavigator {
	fn pathname(&self) -> String {
		let url = self.current_url();
		url.split_once('?')
			.map_or(url.clone(), |(path, _)| path.to_string())
	}

	fn search(&self) -> String {
		let url = self.current_url();
		url.split_once('?')
			.map_or_else(String::new, |(_, query)| format!("?{query}"))
	}

	fn push(&self, url: &str) {
		self.state.stack.borrow_mut().push(url.to_string());
		self.notify();
	}

	fn replace(&self, url: &str) {
		let mut stack = self.state.stack.borrow_mut();
		stack.pop();
		stack.push(url.to_string());
		drop(stack);
		self.notify();
	}

	fn back(&self) {
		let mut stack = self.state.stack.borrow_mut();
		if stack.len() > 1 {
			stack.pop();
		}
		drop(stack);
		self.notify();
	}

	fn on_navigate(&self, callback: Rc<dyn Fn()>) {
		self.state.listeners.borrow_mut().push(callback);
	}
}

// ---------------------------------------------------------------------------
// MockFetcher

#[derive(Default)]
struct MockFetcherState {
	responses: RefCell<HashMap<String, RouterResult<String>>>,
	calls: RefCell<Vec<String>>,
	delay: Cell<Duration>,
}

/// A fragment fetcher with canned responses and optional latency.
///
/// URLs without a canned response reject with a 404 fetch error. Every
/// request is recorded for assertions.
#[derive(Clone, Default)]
pub struct MockFetcher {
	state: Rc<MockFetcherState>,
}

impl MockFetcher {
	/// Creates a fetcher with no canned responses.
	pub fn new() -> Self {
		Self::default()
	}

	/// Cans a successful response for `url`.
	pub fn respond(&self, url: &str, body: &str) {
		self.state
			.responses
			.borrow_mut()
			.insert(url.to_string(), Ok(body.to_string()));
	}

	/// Cans a failure for `url`.
	pub fn fail(&self, url: &str, error: RouterError) {
		self.state
			.responses
			.borrow_mut()
			.insert(url.to_string(), Err(error));
	}

	/// Delays every subsequent request by `delay`.
	pub fn set_delay(&self, delay: Duration) {
		self.state.delay.set(delay);
	}

	/// Every requested URL, in order.
	pub fn calls(&self) -> Vec<String> {
		self.state.calls.borrow().clone()
	}

	/// Number of requests issued so far.
	pub fn call_count(&self) -> usize {
		self.state.calls.borrow().len()
	}
}

impl FragmentFetcher for MockFetcher {
	fn fetch(&self, url: &str) -> LocalBoxFuture<'static, RouterResult<String>> {
		let state = Rc::clone(&self.state);
		let url = url.to_string();
		async move {
			state.calls.borrow_mut().push(url.clone());
			let delay = state.delay.get();
			if !delay.is_zero() {
				platform::sleep(delay).await;
			}
			state
				.responses
				.borrow()
				.get(&url)
				.cloned()
				.unwrap_or_else(|| {
					Err(RouterError::Fetch {
						url: url.clone(),
						status: 404,
						status_text: "Not Found".to_string(),
					})
				})
		}
		.boxed_local()
	}
}

// ---------------------------------------------------------------------------
// MockHost

#[derive(Default)]
struct MockHostState {
	stores: RefCell<HashMap<String, RouterStore>>,
	magics: RefCell<HashMap<String, RouterHandle>>,
	rescans: RefCell<Vec<MockContainer>>,
	started: Cell<bool>,
}

/// A host framework that records registrations and re-scans.
#[derive(Clone, Default)]
pub struct MockHost {
	state: Rc<MockHostState>,
}

impl MockHost {
	/// Creates a host with nothing registered.
	pub fn new() -> Self {
		Self::default()
	}

	/// The store registered under `name`, if any.
	pub fn store(&self, name: &str) -> Option<RouterStore> {
		self.state.stores.borrow().get(name).cloned()
	}

	/// The magic helper registered under `name`, if any.
	pub fn magic(&self, name: &str) -> Option<RouterHandle> {
		self.state.magics.borrow().get(name).cloned()
	}

	/// Number of subtree re-scans requested so far.
	pub fn rescan_count(&self) -> usize {
		self.state.rescans.borrow().len()
	}

	/// Whether the host framework was started.
	pub fn started(&self) -> bool {
		self.state.started.get()
	}
}

impl HostFramework for MockHost {
	type Container = MockContainer;

	fn register_store(&self, name: &str, store: &RouterStore) {
		self.state
			.stores
			.borrow_mut()
			.insert(name.to_string(), store.clone());
	}

	fn register_magic(&self, name: &str, router: &RouterHandle) {
		self.state
			.magics
			.borrow_mut()
			.insert(name.to_string(), router.clone());
	}

	fn rescan_subtree(&self, container: &MockContainer) -> RouterResult<()> {
		self.state.rescans.borrow_mut().push(container.clone());
		Ok(())
	}

	fn start(&self) {
		self.state.started.set(true);
	}
}
