//! Navigation facade over browser history.
//!
//! [`Navigator`] is the capability trait for history and location access;
//! [`RouterHandle`] is the process-wide API handed to the host framework:
//! `push`/`replace`/`back`, the `query` getter, and a reactive `path`
//! getter backed by the router store so templates observe navigation
//! without re-reading the URL.

use std::collections::HashMap;
use std::rc::Rc;

use crate::host::RouterStore;

/// History and location capability.
///
/// Implementations must broadcast the navigation event to registered
/// callbacks after `push`/`replace` (the browser does not fire `popstate`
/// for programmatic history writes); `back` relies on the environment's own
/// history-change notification instead.
pub trait Navigator {
	/// Current path component of the URL.
	fn pathname(&self) -> String;

	/// Current query component, with its leading `?` (empty when absent).
	fn search(&self) -> String;

	/// Pushes a new history entry for `url` and broadcasts the navigation
	/// event.
	fn push(&self, url: &str);

	/// Replaces the current history entry with `url` and broadcasts the
	/// navigation event.
	fn replace(&self, url: &str);

	/// Navigates one entry back in history.
	fn back(&self);

	/// Registers a callback fired on every navigation event.
	fn on_navigate(&self, callback: Rc<dyn Fn()>);
}

/// Process-wide navigation API.
///
/// Cheap to clone; every clone shares the same navigator and store. This is
/// also the object registered with the host framework as the router magic
/// helper.
#[derive(Clone)]
pub struct RouterHandle {
	navigator: Rc<dyn Navigator>,
	store: RouterStore,
}

impl RouterHandle {
	pub(crate) fn new(navigator: Rc<dyn Navigator>, store: RouterStore) -> Self {
		Self { navigator, store }
	}

	/// Navigates to `path`, adding a history entry.
	///
	/// The URL is built fresh from `path` and the explicit `query` entries;
	/// the current query string is not merged in. Later duplicate keys
	/// overwrite earlier ones in place.
	pub fn push(&self, path: &str, query: &[(&str, &str)]) {
		self.navigator.push(&build_url(path, query));
	}

	/// Navigates to `path` without adding a history entry.
	///
	/// Query semantics match [`RouterHandle::push`].
	pub fn replace(&self, path: &str, query: &[(&str, &str)]) {
		self.navigator.replace(&build_url(path, query));
	}

	/// Navigates one entry back in history.
	///
	/// The navigation event arrives through the environment's own
	/// history-change notification, not synchronously from this call.
	pub fn back(&self) {
		self.navigator.back();
	}

	/// Parses the current URL's query string; the last occurrence of a key
	/// wins.
	pub fn query(&self) -> HashMap<String, String> {
		parse_query(&self.navigator.search())
	}

	/// The current path, read from the reactive store.
	pub fn path(&self) -> String {
		self.store.path.get()
	}

	/// The reactive store mirroring path and query.
	pub fn store(&self) -> &RouterStore {
		&self.store
	}
}

impl std::fmt::Debug for RouterHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RouterHandle")
			.field("path", &self.store.path)
			.finish()
	}
}

/// Builds a relative URL from a path and explicit query entries.
///
/// Duplicate keys keep the position of their first occurrence but take the
/// last value, mirroring URL search-parameter assignment.
pub fn build_url(path: &str, query: &[(&str, &str)]) -> String {
	if query.is_empty() {
		return path.to_string();
	}

	let mut pairs: Vec<(String, String)> = Vec::with_capacity(query.len());
	for (key, value) in query {
		match pairs.iter_mut().find(|(existing, _)| existing == key) {
			Some(pair) => pair.1 = (*value).to_string(),
			None => pairs.push(((*key).to_string(), (*value).to_string())),
		}
	}

	match serde_urlencoded::to_string(&pairs) {
		Ok(encoded) => format!("{path}?{encoded}"),
		Err(_) => path.to_string(),
	}
}

/// Parses a query string (with or without its leading `?`) into a map; the
/// last occurrence of a key wins.
pub fn parse_query(search: &str) -> HashMap<String, String> {
	let trimmed = search.strip_prefix('?').unwrap_or(search);
	serde_urlencoded::from_str::<Vec<(String, String)>>(trimmed)
		.unwrap_or_default()
		.into_iter()
		.collect()
}

#[cfg(target_arch = "wasm32")]
mod browser {
	use std::rc::Rc;

	use wasm_bindgen::JsCast;
	use wasm_bindgen::closure::Closure;

	use super::Navigator;
	use crate::warn_log;

	/// History access backed by the browser window.
	#[derive(Debug, Clone, Copy, Default)]
	pub struct BrowserNavigator;

	impl BrowserNavigator {
		/// Creates a navigator over the window's history and location.
		pub fn new() -> Self {
			Self
		}

		fn write_history(&self, url: &str, replace: bool) {
			let Some(window) = web_sys::window() else {
				return;
			};
			let Ok(history) = window.history() else {
				warn_log!("router: history API unavailable");
				return;
			};

			let outcome = if replace {
				history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url))
			} else {
				history.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url))
			};
			if outcome.is_err() {
				warn_log!("router: history write failed for {url}");
				return;
			}

			// pushState/replaceState do not fire popstate; broadcast it.
			if let Ok(event) = web_sys::Event::new("popstate") {
				let _ = window.dispatch_event(&event);
			}
		}
	}

	impl Navigator for BrowserNavigator {
		fn pathname(&self) -> String {
			web_sys::window()
				.and_then(|window| window.location().pathname().ok())
				.unwrap_or_else(|| "/".to_string())
		}

		fn search(&self) -> String {
			web_sys::window()
				.and_then(|window| window.location().search().ok())
				.unwrap_or_default()
		}

		fn push(&self, url: &str) {
			self.write_history(url, false);
		}

		fn replace(&self, url: &str) {
			self.write_history(url, true);
		}

		fn back(&self) {
			let Some(window) = web_sys::window() else {
				return;
			};
			if window.history().and_then(|history| history.back()).is_err() {
				warn_log!("router: history back failed");
			}
		}

		fn on_navigate(&self, callback: Rc<dyn Fn()>) {
			let Some(window) = web_sys::window() else {
				return;
			};

			let handler = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event| callback());
			if window
				.add_event_listener_with_callback("popstate", handler.as_ref().unchecked_ref())
				.is_err()
			{
				warn_log!("router: failed to subscribe to popstate");
				return;
			}

			// The subscription lives for the rest of the page.
			handler.forget();
		}
	}
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserNavigator;
