// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use pact_broker_client::{
	error::Error,
	http::TransportOptions,
	resolve::{BrokerClient, ResolverConfig},
};

const PROVIDER: &str = "Foo";
const AUTHORIZATION: &str = "Basic dmVyaWZpZXI6czNjcmV0";

fn client(server: &MockServer, options: TransportOptions) -> BrokerClient {
	let config = ResolverConfig::builder(PROVIDER)
		.broker_base_url(server.base_url(), options)
		.consumer_version_tag("cmaster")
		.provider_version_tag("pmaster")
		.build()
		.expect("Resolver configuration should build.");

	BrokerClient::new(config).expect("Broker client should build.")
}

#[test]
fn selector_capable_brokers_resolve_through_the_verification_relation() {
	let server = MockServer::start();
	let index = server.mock(|when, then| {
		when.method(GET).path("/");
		then.status(200).header("content-type", "application/hal+json").body(
			json!({
				"_links": {
					"beta:provider-pacts-for-verification": {
						"href": server.url("/pacts/provider/{provider}/for-verification"),
						"title": "Pacts to be verified"
					}
				}
			})
			.to_string(),
		);
	});
	let verification = server.mock(|when, then| {
		when.method(POST).path("/pacts/provider/Foo/for-verification").json_body(json!({
			"consumerVersionSelectors": [{ "tag": "cmaster", "latest": true }],
			"providerVersionTags": ["pmaster"],
			"verbose": false,
		}));
		then.status(200).header("content-type", "application/hal+json").body(
			json!({
				"_embedded": {
					"pacts": [{
						"shortDescription": "latest cmaster",
						"verificationProperties": {
							"pending": false,
							"notices": [{
								"when": "before_verification",
								"text": "The pact at .../pacts/1 is being verified."
							}]
						},
						"_links": {
							"self": {
								"href": server.url("/pacts/1"),
								"name": "Consumer"
							}
						}
					}]
				}
			})
			.to_string(),
		);
	});
	let uris = client(&server, TransportOptions::default())
		.fetch_pact_uris()
		.expect("Resolution should succeed.");

	index.assert();
	verification.assert();

	assert_eq!(uris.len(), 1);
	assert_eq!(uris[0].uri(), server.url("/pacts/1"));
	assert_eq!(uris[0].metadata()["shortDescription"], "latest cmaster");
	assert_eq!(uris[0].metadata()["verificationProperties"]["pending"], false);
}

#[test]
fn basic_auth_credentials_are_sent_and_masked_on_resolved_locations() {
	let server = MockServer::start();
	let index = server.mock(|when, then| {
		when.method(GET).path("/").header("authorization", AUTHORIZATION);
		then.status(200).header("content-type", "application/hal+json").body(
			json!({
				"_links": {
					"beta:provider-pacts-for-verification": {
						"href": server.url("/pacts/provider/{provider}/for-verification")
					}
				}
			})
			.to_string(),
		);
	});
	let verification = server.mock(|when, then| {
		when.method(POST)
			.path("/pacts/provider/Foo/for-verification")
			.header("authorization", AUTHORIZATION);
		then.status(200).header("content-type", "application/hal+json").body(
			json!({
				"_embedded": {
					"pacts": [{ "_links": { "self": { "href": server.url("/pacts/1") } } }]
				}
			})
			.to_string(),
		);
	});
	let uris = client(&server, TransportOptions::basic_auth("verifier", "s3cret"))
		.fetch_pact_uris()
		.expect("Authenticated resolution should succeed.");

	index.assert();
	verification.assert();

	let expected = server.url("/pacts/1").replace("http://", "http://verifier:*****@");

	assert_eq!(uris[0].to_string(), expected);
}

#[test]
fn a_failed_index_fetch_is_fatal_and_reports_the_broker_diagnostics() {
	let server = MockServer::start();
	let index = server.mock(|when, then| {
		when.method(GET).path("/");
		then.status(500).body("foo");
	});
	let err = client(&server, TransportOptions::default())
		.fetch_pact_uris()
		.expect_err("A failed index fetch should be fatal.");

	index.assert();

	let message = err.to_string();

	assert!(matches!(err, Error::Resolution { status: 500, .. }));
	assert!(message.contains("500"), "Message should name the status: {message}");
	assert!(message.contains("foo"), "Message should carry the body: {message}");
}

#[test]
fn brokers_without_the_verification_relation_fall_back_to_the_legacy_dialect() {
	let server = MockServer::start();
	let index = server.mock(|when, then| {
		when.method(GET).path("/");
		then.status(200).header("content-type", "application/hal+json").body(
			json!({
				"_links": {
					"pb:latest-provider-pacts-with-tag": {
						"href": server.url("/pacts/provider/{provider}/latest/{tag}")
					}
				}
			})
			.to_string(),
		);
	});
	// The consumer tag is extracted from the selector and expanded into the template.
	let latest_with_tag = server.mock(|when, then| {
		when.method(GET).path("/pacts/provider/Foo/latest/cmaster");
		then.status(200).header("content-type", "application/hal+json").body(
			json!({
				"_links": {
					"pb:pacts": [
						{ "href": server.url("/pacts/1"), "name": "Consumer1" },
						{ "href": server.url("/pacts/2"), "name": "Consumer2" }
					]
				}
			})
			.to_string(),
		);
	});
	let uris = client(&server, TransportOptions::default())
		.fetch_pact_uris()
		.expect("Fallback resolution should succeed.");

	// Once for the capability probe, once when the legacy routine starts over.
	index.assert_calls(2);
	latest_with_tag.assert();

	assert_eq!(uris.len(), 2);
	assert_eq!(uris[0].uri(), server.url("/pacts/1"));
	assert_eq!(uris[0].metadata()["name"], "Consumer1");
	assert_eq!(uris[1].uri(), server.url("/pacts/2"));
}

#[test]
fn without_selectors_the_broker_applies_its_default_selection() {
	let server = MockServer::start();
	server.mock(|when, then| {
		when.method(GET).path("/");
		then.status(200).header("content-type", "application/hal+json").body(
			json!({
				"_links": {
					"beta:provider-pacts-for-verification": {
						"href": server.url("/pacts/provider/{provider}/for-verification")
					}
				}
			})
			.to_string(),
		);
	});
	let verification = server.mock(|when, then| {
		when.method(POST).path("/pacts/provider/Foo/for-verification").json_body(json!({
			"consumerVersionSelectors": [],
			"providerVersionTags": [],
			"verbose": false,
		}));
		then.status(200)
			.header("content-type", "application/hal+json")
			.body(json!({ "_embedded": { "pacts": [] } }).to_string());
	});
	let config = ResolverConfig::builder(PROVIDER)
		.broker_base_url(server.base_url(), TransportOptions::default())
		.build()
		.expect("Resolver configuration should build.");
	let uris = BrokerClient::new(config)
		.expect("Broker client should build.")
		.fetch_pact_uris()
		.expect("Resolution should succeed.");

	verification.assert();

	assert!(uris.is_empty());
}
