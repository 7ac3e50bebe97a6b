//! Parsed hypermedia resources and the outcome of executing a link.

// self
use crate::{
	_prelude::*,
	error::NavigationError,
	hal::link::Link,
	http::{Response, Transport},
};

const LINKS_FIELD: &str = "_links";
const EMBEDDED_FIELD: &str = "_embedded";

/// Outcome of executing a [`Link`]: the broker either returned a navigable
/// resource or an HTTP-level failure whose diagnostics are preserved as data.
#[derive(Clone, Debug)]
pub enum Resource {
	/// 2xx response with a structured body.
	Success(Entity),
	/// Non-2xx response, body kept verbatim.
	Failure(ErrorEntity),
}
impl Resource {
	/// True when the exchange failed at the HTTP level.
	pub fn is_error(&self) -> bool {
		matches!(self, Self::Failure(_))
	}

	/// Underlying wire response.
	pub fn response(&self) -> &Response {
		match self {
			Self::Success(entity) => entity.response(),
			Self::Failure(failure) => failure.response(),
		}
	}

	/// Follows a named relation on the underlying resource.
	pub fn follow(&self, relation: &str) -> Result<Link, NavigationError> {
		match self {
			Self::Success(entity) => entity.follow(relation),
			Self::Failure(failure) => failure.follow(relation),
		}
	}

	/// Unwraps the success variant.
	pub fn success(self) -> Option<Entity> {
		match self {
			Self::Success(entity) => Some(entity),
			Self::Failure(_) => None,
		}
	}

	/// Unwraps the failure variant.
	pub fn failure(self) -> Option<ErrorEntity> {
		match self {
			Self::Success(_) => None,
			Self::Failure(failure) => Some(failure),
		}
	}
}

/// A parsed HAL resource able to expose further links.
#[derive(Clone)]
pub struct Entity {
	href: String,
	body: Value,
	transport: Arc<dyn Transport>,
	response: Response,
}
impl Entity {
	/// Wraps a parsed body fetched from `href`.
	pub fn new(
		href: impl Into<String>,
		body: Value,
		transport: Arc<dyn Transport>,
		response: Response,
	) -> Self {
		Self { href: href.into(), body, transport, response }
	}

	/// Href this resource was fetched from.
	pub fn href(&self) -> &str {
		&self.href
	}

	/// Parsed resource body.
	pub fn body(&self) -> &Value {
		&self.body
	}

	/// Underlying wire response.
	pub fn response(&self) -> &Response {
		&self.response
	}

	/// Transport the resource was fetched through; links constructed from
	/// this resource share it.
	pub fn transport(&self) -> &Arc<dyn Transport> {
		&self.transport
	}

	/// True when the resource advertises the named relation.
	pub fn can(&self, relation: &str) -> bool {
		self.follow(relation).is_ok()
	}

	/// Follows a named relation, returning a link bound to the same
	/// transport.
	///
	/// A missing link map, an absent relation, and a relation entry without
	/// an `href` all fail identically, so capability probes have a single
	/// case to branch on.
	pub fn follow(&self, relation: &str) -> Result<Link, NavigationError> {
		self.relation_entry(relation)
			.and_then(|entry| Link::from_relation(relation, entry, Arc::clone(&self.transport)))
			.ok_or_else(|| NavigationError::RelationNotFound {
				relation: relation.to_owned(),
				href: self.href.clone(),
			})
	}

	/// Every link under the named relation.
	///
	/// An array-valued relation yields a link per usable entry (an empty
	/// array yields no links); a single-valued relation yields one.
	pub fn follow_each(&self, relation: &str) -> Result<Vec<Link>, NavigationError> {
		let entry = self
			.body
			.get(LINKS_FIELD)
			.and_then(|links| links.get(relation))
			.ok_or_else(|| NavigationError::RelationNotFound {
				relation: relation.to_owned(),
				href: self.href.clone(),
			})?;
		let entries = match entry {
			Value::Array(entries) => entries.iter().collect::<Vec<_>>(),
			single => vec![single],
		};

		Ok(entries
			.into_iter()
			.filter_map(|entry| Link::from_relation(relation, entry, Arc::clone(&self.transport)))
			.collect())
	}

	/// Embedded entries under `_embedded.<name>`; empty when absent.
	pub fn embedded(&self, name: &str) -> &[Value] {
		self.body
			.get(EMBEDDED_FIELD)
			.and_then(|embedded| embedded.get(name))
			.and_then(Value::as_array)
			.map(|entries| entries.as_slice())
			.unwrap_or(&[])
	}

	fn relation_entry(&self, relation: &str) -> Option<&Value> {
		let entry = self.body.get(LINKS_FIELD)?.get(relation)?;

		match entry {
			Value::Array(entries) => entries.first(),
			single => Some(single),
		}
	}
}
impl Debug for Entity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Entity").field("href", &self.href).finish_non_exhaustive()
	}
}

/// Failure variant of a fetched resource: the HTTP exchange did not succeed
/// and the broker's diagnostic body is kept verbatim.
#[derive(Clone)]
pub struct ErrorEntity {
	href: String,
	body: String,
	transport: Arc<dyn Transport>,
	response: Response,
}
impl ErrorEntity {
	/// Wraps the raw body of a failed exchange against `href`.
	pub fn new(
		href: impl Into<String>,
		body: String,
		transport: Arc<dyn Transport>,
		response: Response,
	) -> Self {
		Self { href: href.into(), body, transport, response }
	}

	/// Href the failed exchange targeted.
	pub fn href(&self) -> &str {
		&self.href
	}

	/// Verbatim response body returned by the broker.
	pub fn body(&self) -> &str {
		&self.body
	}

	/// HTTP status of the failed exchange.
	pub fn status(&self) -> u16 {
		self.response.status()
	}

	/// Underlying wire response.
	pub fn response(&self) -> &Response {
		&self.response
	}

	/// Transport the resource was fetched through.
	pub fn transport(&self) -> &Arc<dyn Transport> {
		&self.transport
	}

	/// Always fails: there is nothing further to navigate on an error
	/// resource. The failure embeds the original status and body so the
	/// broker's diagnostic is never lost.
	pub fn follow(&self, _relation: &str) -> Result<Link, NavigationError> {
		Err(NavigationError::ErrorResponse {
			status: self.response.status(),
			body: self.body.clone(),
		})
	}
}
impl Debug for ErrorEntity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ErrorEntity")
			.field("href", &self.href)
			.field("status", &self.response.status())
			.finish_non_exhaustive()
	}
}
