//! Error types shared across transport, navigation, and resolution.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// The three kinds the resolution protocol depends on stay distinct:
/// [`Error::Resolution`] is fatal and never retried, a
/// [`NavigationError::RelationNotFound`] is a benign probe outcome consumed
/// internally by the dialect fallback, and [`Error::Transport`] carries
/// connectivity faults through unmodified.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A response advertised JSON but its body could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Hypermedia navigation failure.
	#[error(transparent)]
	Navigation(#[from] NavigationError),
	/// The broker index fetch returned a non-success status.
	#[error("Fetching the index resource from the pact broker failed with status {status}: {body}")]
	Resolution {
		/// HTTP status returned by the broker index.
		status: u16,
		/// Verbatim response body text.
		body: String,
	},
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Configuration and validation failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// No broker base URL was supplied.
	#[error("Please provide a pact broker base URL.")]
	MissingBrokerBaseUrl,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// A response body that could not be decoded as the JSON its content type advertised.
#[derive(Debug, ThisError)]
#[error("Response body could not be decoded as JSON.")]
pub struct DecodeError {
	/// Structured decode failure, including the path that failed.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
	/// HTTP status of the response whose body failed to decode.
	pub status: u16,
}

/// Hypermedia navigation failures.
#[derive(Debug, ThisError)]
pub enum NavigationError {
	/// Navigation was attempted from a resource representing a failed HTTP exchange.
	#[error("Cannot navigate from the error response (status {status}): {body}")]
	ErrorResponse {
		/// HTTP status of the failed exchange.
		status: u16,
		/// Verbatim response body of the failed exchange.
		body: String,
	},
	/// A named relation is absent from a resource's link map.
	#[error("Relation `{relation}` was not found in the resource at {href}.")]
	RelationNotFound {
		/// Relation name that was requested.
		relation: String,
		/// Href of the resource that was searched.
		href: String,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the pact broker.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the pact broker.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
	fn from(e: reqwest::Error) -> Self {
		Self::network(e)
	}
}
