//! Musette - Partial-Page Fragment Router
//!
//! A lightweight client-side router for reactive WASM frontends. Instead of
//! rendering routes from components, it fetches HTML fragments for the
//! current path, swaps them into designated container elements, and asks the
//! host framework to re-initialize reactive bindings on the new content.
//!
//! ## How it routes
//!
//! Any element carrying a `router` attribute is a container; the attribute
//! value names the fragment collection (namespace) it loads from. On every
//! navigation the router fetches `/{namespace}/{path}.html` per container
//! and swaps the response in. The root path `/` is special: it restores the
//! container's original markup, captured before the first swap. Containers
//! with `router-transition="fade"` fade out for their declared CSS opacity
//! transition before the swap.
//!
//! ## Architecture
//!
//! - [`cache`]: fragment fetch coalescing with idle expiry
//! - [`transition`]: fade duration derivation from computed style
//! - [`loader`]: the per-container route-load state machine
//! - [`navigation`]: history facade and the router handle
//! - [`orchestrator`]: document-wide container scanning
//! - [`runtime`]: owned router state, wiring, and lifecycle
//! - [`host`]: the capability surface a host framework implements
//! - [`dom`]: container and document capabilities (browser-backed on WASM)
//! - [`reactive`]: the minimal observable cell backing the router store
//! - [`testing`]: mock capability implementations for native tests
//!
//! ## Example
//!
//! ```ignore
//! use musette::{HostFramework, init};
//!
//! // Implement HostFramework for your reactive frontend, then:
//! let runtime = init(MyHost::new()).expect("browser context");
//!
//! // Navigate programmatically through the handle:
//! runtime.handle().push("/guide", &[("section", "intro")]);
//! ```

#![warn(missing_docs)]

// Core modules
pub mod cache;
pub mod dom;
pub mod error;
pub mod host;
pub mod loader;
pub mod logging;
pub mod navigation;
pub mod orchestrator;
pub mod platform;
pub mod reactive;
pub mod runtime;
pub mod transition;

// Unified prelude for simplified imports
pub mod prelude;

// Mock capability implementations (available on both WASM and native)
pub mod testing;

// Re-export commonly used types
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use cache::HttpFetcher;
pub use cache::{FragmentCache, FragmentFetcher, FragmentFuture, FragmentKey};
pub use dom::{
	Container, DEFAULT_ROUTE_ID, DocumentRoot, NAMESPACE_ATTR, TRANSITION_ATTR, TRANSITION_FADE,
};
#[cfg(target_arch = "wasm32")]
pub use dom::{BrowserContainer, BrowserDocument};
pub use error::{RouterError, RouterResult};
pub use host::{HostFramework, RouterStore};
pub use loader::{ContainerRecord, NOT_FOUND_FRAGMENT, RouteLoader};
#[cfg(target_arch = "wasm32")]
pub use navigation::BrowserNavigator;
pub use navigation::{Navigator, RouterHandle};
pub use orchestrator::RouterOrchestrator;
pub use reactive::Signal;
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use runtime::init;
pub use runtime::{RouterOptions, RouterRuntime};
pub use transition::{ComputedTransition, opacity_fade_duration};

// Logging macros are exported via #[macro_export]:
// debug_log!, info_log!, warn_log!, error_log!.
