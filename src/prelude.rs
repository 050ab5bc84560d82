//! Unified prelude for simplified imports.
//!
//! ```ignore
//! use musette::prelude::*;
//! ```

pub use crate::cache::{FragmentCache, FragmentFetcher};
pub use crate::dom::{Container, DocumentRoot};
pub use crate::error::{RouterError, RouterResult};
pub use crate::host::{HostFramework, RouterStore};
pub use crate::loader::RouteLoader;
pub use crate::navigation::{Navigator, RouterHandle};
pub use crate::orchestrator::RouterOrchestrator;
pub use crate::reactive::Signal;
pub use crate::runtime::{RouterOptions, RouterRuntime};

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use crate::runtime::init;
