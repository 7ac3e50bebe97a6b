//! Broker resolution: index fetch, capability probe, and dialect fallback.
//!
//! One resolution run performs a single sequential chain (index fetch, an
//! optional relation follow-up, an optional legacy fallback) with no
//! retries. The second request's target always comes from the first
//! response's content, never from a hard-coded URL.

pub mod legacy;
pub mod selectors;
pub mod verification;

pub use selectors::{ConsumerVersionSelector, selectors_from_tags, tags_from_selectors};
pub use verification::{BrokerClient, ResolverConfig, ResolverConfigBuilder};

// self
use crate::{
	_prelude::*,
	hal::{Entity, Link, Resource, Verb},
	http::Transport,
	obs::{ResolveSpan, ResolveStage},
};

/// Fetches and parses the broker index resource.
///
/// This is the sole fatal path of the protocol: a non-success index response
/// fails resolution outright, carrying the status and verbatim body.
pub(crate) fn fetch_index(base_url: &str, transport: Arc<dyn Transport>) -> Result<Entity> {
	let _guard = ResolveSpan::new(ResolveStage::Index).entered();
	let index = Link::new("index", base_url, Verb::Get, transport).get(&[], &[])?;

	match index {
		Resource::Success(entity) => Ok(entity),
		Resource::Failure(failure) =>
			Err(Error::Resolution { status: failure.status(), body: failure.body().to_owned() }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::{Response, testing::StaticTransport};

	#[test]
	fn index_failures_are_fatal_and_carry_the_diagnostics() {
		let transport =
			StaticTransport::default().respond(Response::new(500, Some("text/plain".into()), "foo"));
		let err = fetch_index("http://broker.org", Arc::new(transport))
			.expect_err("A failed index fetch should be fatal.");
		let message = err.to_string();

		assert!(matches!(err, Error::Resolution { status: 500, .. }));
		assert!(message.contains("500"), "Message should name the status: {message}");
		assert!(message.contains("foo"), "Message should carry the body: {message}");
	}

	#[test]
	fn index_successes_parse_into_an_entity() {
		let transport = StaticTransport::default().respond_json(200, r#"{"_links":{}}"#);
		let entity = fetch_index("http://broker.org", Arc::new(transport))
			.expect("A 2xx index fetch should parse.");

		assert_eq!(entity.href(), "http://broker.org");
	}
}
