//! Platform abstraction for task spawning and timers.
//!
//! The router runs on the single-threaded browser event loop in production
//! and on a current-thread tokio runtime in native tests. This module hides
//! that split behind three primitives: `spawn_local`, `sleep`, and a
//! monotonic millisecond clock.

use std::future::Future;
use std::time::Duration;

/// Spawns a `!Send` future onto the current-thread executor.
#[cfg(target_arch = "wasm32")]
pub fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	wasm_bindgen_futures::spawn_local(future);
}

/// Spawns a `!Send` future onto the current-thread executor.
///
/// On native targets this requires a running [`tokio::task::LocalSet`]
/// context, which the test suites provide.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	drop(tokio::task::spawn_local(future));
}

/// Suspends the current task for `duration`.
#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
	gloo_timers::future::TimeoutFuture::new(duration.as_millis() as u32).await;
}

/// Suspends the current task for `duration`.
#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
	tokio::time::sleep(duration).await;
}

/// Returns a monotonic timestamp in milliseconds.
///
/// Only differences between two readings are meaningful; the epoch is
/// unspecified and differs between targets.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
	js_sys::Date::now()
}

/// Returns a monotonic timestamp in milliseconds.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
	use std::time::Instant;

	thread_local! {
		static EPOCH: Instant = Instant::now();
	}

	EPOCH.with(|epoch| epoch.elapsed().as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_now_ms_is_monotonic() {
		let first = now_ms();
		let second = now_ms();
		assert!(second >= first);
	}

	#[tokio::test]
	async fn test_sleep_elapses() {
		let before = now_ms();
		sleep(Duration::from_millis(20)).await;
		assert!(now_ms() - before >= 15.0);
	}
}
