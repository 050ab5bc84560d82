//! Host framework capability surface.
//!
//! The router does not depend on any particular reactive frontend; it
//! consumes four capabilities from whatever framework hosts it: register a
//! named store, expose a magic helper, re-scan a subtree for bindings after
//! a swap, and start. Adapters implement [`HostFramework`] for their
//! framework of choice.

use std::collections::HashMap;

use crate::dom::Container;
use crate::error::RouterResult;
use crate::navigation::RouterHandle;
use crate::reactive::Signal;

/// Reactive mirror of the current navigation state.
///
/// Mutated only by the router runtime in response to navigation events;
/// everything else observes.
#[derive(Debug, Clone)]
pub struct RouterStore {
	/// Current URL path.
	pub path: Signal<String>,
	/// Current query parameters (unique keys, last occurrence wins).
	pub query: Signal<HashMap<String, String>>,
}

impl RouterStore {
	/// Creates a store seeded with the given navigation state.
	pub fn new(path: String, query: HashMap<String, String>) -> Self {
		Self {
			path: Signal::new(path),
			query: Signal::new(query),
		}
	}
}

/// Capabilities the router consumes from the host reactive framework.
pub trait HostFramework {
	/// The container type this host hands to the router.
	type Container: Container;

	/// Registers the reactive router store under `name`.
	fn register_store(&self, name: &str, store: &RouterStore);

	/// Exposes the router handle as a magic helper under `name`.
	fn register_magic(&self, name: &str, router: &RouterHandle);

	/// Re-scans a container's subtree for reactive bindings after its
	/// markup changed.
	fn rescan_subtree(&self, container: &Self::Container) -> RouterResult<()>;

	/// Starts the host framework once the router is wired up.
	fn start(&self);
}
