//! Router error types.
//!
//! The router distinguishes HTTP-level fragment failures from transport
//! failures and from everything else. Fetch-path errors are downgraded to a
//! user-visible fallback by the route loader; they never escape a load.

use thiserror::Error;

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Errors raised while resolving and loading route fragments.
///
/// Cloneable because in-flight fragment fetches are shared between
/// coalesced callers, each of which receives its own copy of the outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouterError {
	/// The fragment endpoint answered with a non-2xx status.
	#[error("failed to fetch {url}: {status} {status_text}")]
	Fetch {
		/// The fragment URL that was requested.
		url: String,
		/// HTTP status code of the response.
		status: u16,
		/// Canonical status text, empty when unknown.
		status_text: String,
	},

	/// The fetch itself failed before a response arrived.
	#[error("network error while fetching {url}: {message}")]
	Network {
		/// The fragment URL that was requested.
		url: String,
		/// Transport-level failure description.
		message: String,
	},

	/// Anything else that went wrong inside the loader.
	#[error("unexpected router error: {0}")]
	Unexpected(String),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fetch_error_display() {
		let error = RouterError::Fetch {
			url: "/content/about.html".to_string(),
			status: 404,
			status_text: "Not Found".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"failed to fetch /content/about.html: 404 Not Found"
		);
	}

	#[test]
	fn test_network_error_display() {
		let error = RouterError::Network {
			url: "/content/about.html".to_string(),
			message: "connection refused".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"network error while fetching /content/about.html: connection refused"
		);
	}

	#[test]
	fn test_unexpected_error_display() {
		let error = RouterError::Unexpected("container vanished".to_string());
		assert_eq!(error.to_string(), "unexpected router error: container vanished");
	}
}
