//! Container and document capabilities.
//!
//! The router talks to the page through two narrow traits: [`Container`]
//! (one routed element) and [`DocumentRoot`] (container discovery and
//! mutation watching). The browser implementations live behind
//! `target_arch = "wasm32"`; native code runs against the mocks in
//! [`crate::testing`].

use std::rc::Rc;

use crate::transition::ComputedTransition;

/// Attribute that designates a routed container and names its fragment
/// namespace.
pub const NAMESPACE_ATTR: &str = "router";

/// Attribute selecting the visual transition applied while swapping.
pub const TRANSITION_ATTR: &str = "router-transition";

/// [`TRANSITION_ATTR`] value enabling the fade transition.
pub const TRANSITION_FADE: &str = "fade";

/// Element id marking the default-route template; containers nested inside
/// it are inert markup and never auto-routed.
pub const DEFAULT_ROUTE_ID: &str = "default-route";

/// Identity marker kept on the element so a container found again by a
/// later scan maps back to its record.
pub const IDENTITY_ATTR: &str = "data-router-id";

/// One routed container element.
///
/// Clones must refer to the same underlying element.
pub trait Container: Clone + 'static {
	/// Reads an attribute from the element.
	fn attribute(&self, name: &str) -> Option<String>;

	/// Returns the container's current inner markup.
	fn inner_html(&self) -> String;

	/// Replaces the container's inner markup.
	fn set_inner_html(&self, html: &str);

	/// Sets the container's opacity (`1.0` is fully visible).
	fn set_opacity(&self, opacity: f64);

	/// Returns the element's computed transition lists.
	fn computed_transition(&self) -> ComputedTransition;

	/// Returns the identity previously marked on this element, if any.
	fn stable_id(&self) -> Option<u64>;

	/// Marks an identity on the element so later scans recognize it.
	fn mark_stable_id(&self, id: u64);

	/// Whether the element sits inside the default-route template.
	fn within_default_template(&self) -> bool;

	/// The fragment namespace this container declares, if any.
	fn namespace(&self) -> Option<String> {
		self.attribute(NAMESPACE_ATTR)
	}
}

/// Discovery surface over the document.
pub trait DocumentRoot {
	/// The container type this document yields.
	type Container: Container;

	/// Every element currently carrying the router attribute, in document
	/// order.
	fn router_containers(&self) -> Vec<Self::Container>;

	/// Registers a callback fired whenever child elements are added or
	/// removed anywhere under the document body.
	fn on_subtree_change(&self, callback: Rc<dyn Fn()>);
}

#[cfg(target_arch = "wasm32")]
mod browser {
	use std::rc::Rc;

	use wasm_bindgen::JsCast;
	use wasm_bindgen::closure::Closure;

	use super::{Container, DEFAULT_ROUTE_ID, DocumentRoot, IDENTITY_ATTR};
	use crate::transition::ComputedTransition;
	use crate::warn_log;

	/// A routed container backed by a live DOM element.
	#[derive(Debug, Clone)]
	pub struct BrowserContainer {
		element: web_sys::Element,
	}

	impl BrowserContainer {
		/// Wraps a DOM element.
		pub fn new(element: web_sys::Element) -> Self {
			Self { element }
		}

		/// The underlying DOM element.
		pub fn element(&self) -> &web_sys::Element {
			&self.element
		}
	}

	impl Container for BrowserContainer {
		fn attribute(&self, name: &str) -> Option<String> {
			self.element.get_attribute(name)
		}

		fn inner_html(&self) -> String {
			self.element.inner_html()
		}

		fn set_inner_html(&self, html: &str) {
			self.element.set_inner_html(html);
		}

		fn set_opacity(&self, opacity: f64) {
			let Some(element) = self.element.dyn_ref::<web_sys::HtmlElement>() else {
				return;
			};
			if element
				.style()
				.set_property("opacity", &opacity.to_string())
				.is_err()
			{
				warn_log!("router: failed to set container opacity");
			}
		}

		fn computed_transition(&self) -> ComputedTransition {
			let Some(style) = web_sys::window()
				.and_then(|window| window.get_computed_style(&self.element).ok())
				.flatten()
			else {
				return ComputedTransition::default();
			};

			ComputedTransition::new(
				style
					.get_property_value("transition-property")
					.unwrap_or_default(),
				style
					.get_property_value("transition-duration")
					.unwrap_or_default(),
			)
		}

		fn stable_id(&self) -> Option<u64> {
			self.element
				.get_attribute(IDENTITY_ATTR)
				.and_then(|value| value.parse().ok())
		}

		fn mark_stable_id(&self, id: u64) {
			if self
				.element
				.set_attribute(IDENTITY_ATTR, &id.to_string())
				.is_err()
			{
				warn_log!("router: failed to mark container identity");
			}
		}

		fn within_default_template(&self) -> bool {
			matches!(
				self.element.closest(&format!("#{DEFAULT_ROUTE_ID}")),
				Ok(Some(_))
			)
		}
	}

	/// Container discovery over the browser document.
	#[derive(Debug, Clone)]
	pub struct BrowserDocument {
		document: web_sys::Document,
	}

	impl BrowserDocument {
		/// Captures the window's document.
		///
		/// Returns `None` outside a browsing context.
		pub fn new() -> Option<Self> {
			let document = web_sys::window()?.document()?;
			Some(Self { document })
		}
	}

	impl DocumentRoot for BrowserDocument {
		type Container = BrowserContainer;

		fn router_containers(&self) -> Vec<BrowserContainer> {
			let selector = format!("[{}]", super::NAMESPACE_ATTR);
			let Ok(nodes) = self.document.query_selector_all(&selector) else {
				return Vec::new();
			};

			let mut containers = Vec::with_capacity(nodes.length() as usize);
			for index in 0..nodes.length() {
				if let Some(element) = nodes
					.get(index)
					.and_then(|node| node.dyn_into::<web_sys::Element>().ok())
				{
					containers.push(BrowserContainer::new(element));
				}
			}
			containers
		}

		fn on_subtree_change(&self, callback: Rc<dyn Fn()>) {
			let handler = Closure::<dyn FnMut(js_sys::Array, web_sys::MutationObserver)>::new(
				move |mutations: js_sys::Array, _observer: web_sys::MutationObserver| {
					for mutation in mutations.iter() {
						let record = mutation.unchecked_into::<web_sys::MutationRecord>();
						if record.type_() == "childList" {
							callback();
							break;
						}
					}
				},
			);

			let Ok(observer) = web_sys::MutationObserver::new(handler.as_ref().unchecked_ref())
			else {
				warn_log!("router: failed to create mutation observer");
				return;
			};

			let Some(body) = self.document.body() else {
				warn_log!("router: document has no body to observe");
				return;
			};

			let options = web_sys::MutationObserverInit::new();
			options.set_child_list(true);
			options.set_subtree(true);
			if observer.observe_with_options(&body, &options).is_err() {
				warn_log!("router: failed to observe document mutations");
				return;
			}

			// The observer lives for the rest of the page.
			handler.forget();
		}
	}
}

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserContainer, BrowserDocument};
