//! Transport boundary between the HAL layer and the wire.
//!
//! [`Transport`] is the crate's only dependency on an HTTP stack: two
//! blocking operations returning a [`Response`]. Everything above it
//! (links, entities, resolution) is transport-agnostic, and everything
//! below it (sockets, TLS, redirects, timeouts) belongs to the
//! implementation. [`ReqwestTransport`] is the default implementation,
//! enabled through the `reqwest` feature.

// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{
	blocking::RequestBuilder,
	header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
// self
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, obs};
use crate::{
	_prelude::*,
	error::{DecodeError, TransportError},
	uri::Credentials,
};

/// Abstraction over HTTP transports used to talk to the pact broker.
///
/// Implementations perform one blocking exchange per call and surface
/// connectivity faults as [`TransportError`]; an HTTP-level failure is not a
/// fault and must be returned as a [`Response`] so the caller can keep the
/// broker's diagnostics. Handles are shared via `Arc`, so implementations
/// must be `Send + Sync`.
pub trait Transport
where
	Self: Send + Sync,
{
	/// Issues a GET request with the given query parameters and headers.
	fn get(
		&self,
		url: &str,
		params: &[(&str, &str)],
		headers: &[(&str, &str)],
	) -> Result<Response, TransportError>;

	/// Issues a POST request with an optional JSON body and the given headers.
	fn post(
		&self,
		url: &str,
		body: Option<&str>,
		headers: &[(&str, &str)],
	) -> Result<Response, TransportError>;
}

/// Response returned by a [`Transport`].
#[derive(Clone, Debug)]
pub struct Response {
	status: u16,
	content_type: Option<String>,
	raw_body: String,
}
impl Response {
	/// Builds a response from its wire parts.
	pub fn new(status: u16, content_type: Option<String>, raw_body: impl Into<String>) -> Self {
		Self { status, content_type, raw_body: raw_body.into() }
	}

	/// True iff the HTTP status is in the 2xx range.
	pub fn success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// HTTP status code.
	pub fn status(&self) -> u16 {
		self.status
	}

	/// Content type reported by the server, if any.
	pub fn content_type(&self) -> Option<&str> {
		self.content_type.as_deref()
	}

	/// Exact wire payload, always available.
	pub fn raw_body(&self) -> &str {
		&self.raw_body
	}

	/// True when the reported content type indicates a JSON document.
	pub fn is_json(&self) -> bool {
		self.content_type.as_deref().map(|value| value.contains("json")).unwrap_or(false)
	}

	/// Structured view of the body.
	///
	/// A JSON content type decodes to a [`Value`] (an empty body decodes to
	/// null); any other content type is returned as a JSON string wrapping
	/// the raw text.
	pub fn body(&self) -> Result<Value, DecodeError> {
		if !self.is_json() {
			return Ok(Value::String(self.raw_body.clone()));
		}
		if self.raw_body.trim().is_empty() {
			return Ok(Value::Null);
		}

		let mut deserializer = serde_json::Deserializer::from_str(&self.raw_body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| DecodeError { source, status: self.status })
	}
}

/// Options applied to every request a transport sends to the broker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportOptions {
	/// HTTP Basic username.
	pub username: Option<String>,
	/// HTTP Basic password.
	pub password: Option<String>,
	/// Enables wire-level logging of each exchange.
	pub verbose: bool,
}
impl TransportOptions {
	/// Options carrying an HTTP Basic username/password pair.
	pub fn basic_auth(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self { username: Some(username.into()), password: Some(password.into()), verbose: false }
	}

	/// Credentials view used when stamping pact locations.
	pub fn credentials(&self) -> Option<Credentials> {
		self.username.as_ref().filter(|username| !username.is_empty()).map(|username| {
			Credentials { username: username.clone(), password: self.password.clone() }
		})
	}
}

/// Default [`Transport`] backed by reqwest's blocking client.
///
/// Sends a HAL `Accept` header on every request and applies the configured
/// Basic credentials; POST bodies are JSON.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	options: TransportOptions,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport for the given options.
	pub fn new(options: TransportOptions) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().default_headers(default_headers()).build()?;

		Ok(Self { client, options })
	}

	/// Wraps an existing blocking client, keeping the shared options.
	pub fn with_client(client: ReqwestClient, options: TransportOptions) -> Self {
		Self { client, options }
	}

	fn execute(&self, builder: RequestBuilder) -> Result<Response, TransportError> {
		let builder = match (&self.options.username, &self.options.password) {
			(Some(username), password) => builder.basic_auth(username, password.as_ref()),
			_ => builder,
		};
		let response = builder.send()?;
		let status = response.status().as_u16();
		let content_type = response
			.headers()
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.map(ToOwned::to_owned);
		let url = response.url().to_string();
		let response = Response::new(status, content_type, response.text()?);

		obs::wire(self.options.verbose, || format!("{url} -> {status} {}", response.raw_body()));

		Ok(response)
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn get(
		&self,
		url: &str,
		params: &[(&str, &str)],
		headers: &[(&str, &str)],
	) -> Result<Response, TransportError> {
		let mut builder = self.client.get(url);

		if !params.is_empty() {
			builder = builder.query(params);
		}

		self.execute(apply_headers(builder, headers))
	}

	fn post(
		&self,
		url: &str,
		body: Option<&str>,
		headers: &[(&str, &str)],
	) -> Result<Response, TransportError> {
		let mut builder = self.client.post(url).header(CONTENT_TYPE, "application/json");

		if let Some(body) = body {
			builder = builder.body(body.to_owned());
		}

		self.execute(apply_headers(builder, headers))
	}
}

#[cfg(feature = "reqwest")]
fn apply_headers(mut builder: RequestBuilder, headers: &[(&str, &str)]) -> RequestBuilder {
	for (name, value) in headers {
		builder = builder.header(*name, *value);
	}

	builder
}

#[cfg(feature = "reqwest")]
fn default_headers() -> HeaderMap {
	let mut headers = HeaderMap::new();

	headers.insert(ACCEPT, HeaderValue::from_static("application/hal+json, application/json"));

	headers
}

#[cfg(any(test, feature = "test"))]
pub mod testing {
	//! In-memory [`Transport`] implementations for tests.

	// std
	use std::sync::Mutex;
	// self
	use super::{Response, Transport};
	use crate::error::TransportError;

	/// Record of one request captured by [`StaticTransport`].
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub struct Recorded {
		/// HTTP verb.
		pub method: &'static str,
		/// Target URL.
		pub url: String,
		/// Query parameters sent with a GET.
		pub params: Vec<(String, String)>,
		/// JSON body sent with a POST, when any.
		pub body: Option<String>,
		/// Extra headers.
		pub headers: Vec<(String, String)>,
	}

	/// Replays scripted outcomes in order and records every request.
	#[derive(Debug, Default)]
	pub struct StaticTransport {
		outcomes: Mutex<Vec<Result<Response, TransportError>>>,
		requests: Mutex<Vec<Recorded>>,
	}
	impl StaticTransport {
		/// Queues a response to replay.
		pub fn respond(self, response: Response) -> Self {
			self.outcomes.lock().expect("Outcome queue should not be poisoned.").push(Ok(response));

			self
		}

		/// Queues a JSON success response to replay.
		pub fn respond_json(self, status: u16, body: &str) -> Self {
			self.respond(Response::new(status, Some("application/hal+json".into()), body))
		}

		/// Queues a transport fault to replay.
		pub fn fail(self, error: TransportError) -> Self {
			self.outcomes.lock().expect("Outcome queue should not be poisoned.").push(Err(error));

			self
		}

		/// Every request seen so far, in order.
		pub fn requests(&self) -> Vec<Recorded> {
			self.requests.lock().expect("Request log should not be poisoned.").clone()
		}

		fn next(&self) -> Result<Response, TransportError> {
			let mut outcomes = self.outcomes.lock().expect("Outcome queue should not be poisoned.");

			assert!(!outcomes.is_empty(), "StaticTransport ran out of scripted outcomes.");

			outcomes.remove(0)
		}

		fn record(&self, entry: Recorded) {
			self.requests.lock().expect("Request log should not be poisoned.").push(entry);
		}
	}
	impl Transport for StaticTransport {
		fn get(
			&self,
			url: &str,
			params: &[(&str, &str)],
			headers: &[(&str, &str)],
		) -> Result<Response, TransportError> {
			self.record(Recorded {
				method: "GET",
				url: url.to_owned(),
				params: own_pairs(params),
				body: None,
				headers: own_pairs(headers),
			});

			self.next()
		}

		fn post(
			&self,
			url: &str,
			body: Option<&str>,
			headers: &[(&str, &str)],
		) -> Result<Response, TransportError> {
			self.record(Recorded {
				method: "POST",
				url: url.to_owned(),
				params: Vec::new(),
				body: body.map(ToOwned::to_owned),
				headers: own_pairs(headers),
			});

			self.next()
		}
	}

	fn own_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
		pairs.iter().map(|(name, value)| ((*name).to_owned(), (*value).to_owned())).collect()
	}
}
