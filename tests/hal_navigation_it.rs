// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use pact_broker_client::{
	error::NavigationError,
	hal::{Link, Resource, Verb},
	http::{ReqwestTransport, Transport, TransportOptions},
};

fn transport() -> Arc<dyn Transport> {
	Arc::new(
		ReqwestTransport::new(TransportOptions::default())
			.expect("Reqwest transport should build."),
	)
}

#[test]
fn entities_navigate_relation_by_relation() {
	let server = MockServer::start();
	let index = server.mock(|when, then| {
		when.method(GET).path("/");
		then.status(200).header("content-type", "application/hal+json").body(
			json!({
				"_links": {
					"pb:provider": { "href": server.url("/providers/Foo"), "method": "GET" }
				}
			})
			.to_string(),
		);
	});
	let provider = server.mock(|when, then| {
		when.method(GET).path("/providers/Foo");
		then.status(200)
			.header("content-type", "application/hal+json")
			.body(json!({ "name": "Foo" }).to_string());
	});
	let root = Link::new("index", server.base_url(), Verb::Get, transport())
		.get(&[], &[])
		.expect("Index fetch should succeed.");
	let entity = root.clone().success().expect("The index should parse into an entity.");
	let followed = entity
		.follow("pb:provider")
		.expect("Advertised relation should resolve.")
		.run(&json!({}), &[])
		.expect("Relation execution should succeed.");
	let provider_entity = followed.success().expect("The relation target should parse.");

	index.assert();
	provider.assert();

	assert_eq!(provider_entity.body()["name"], "Foo");
	assert!(matches!(
		root.follow("pb:absent"),
		Err(NavigationError::RelationNotFound { .. }),
	));
}

#[test]
fn templated_links_are_expanded_before_execution() {
	let server = MockServer::start();
	let run = server.mock(|when, then| {
		when.method(POST).path("/things/42").json_body(json!({ "id": "42" }));
		then.status(200)
			.header("content-type", "application/hal+json")
			.body(json!({ "ok": true }).to_string());
	});
	let link = Link::new("pb:thing", server.url("/things/{id}"), Verb::Post, transport());
	let resource = link.run(&json!({ "id": "42" }), &[]).expect("Run should succeed.");

	run.assert();

	let entity = resource.success().expect("The response should parse.");

	assert_eq!(entity.href(), server.url("/things/42"));
	assert_eq!(entity.body()["ok"], true);
}

#[test]
fn http_level_failures_are_data_and_refuse_further_navigation() {
	let server = MockServer::start();
	server.mock(|when, then| {
		when.method(GET).path("/broken");
		then.status(404).header("content-type", "text/plain").body("it is gone");
	});
	let resource = Link::new("pb:broken", server.url("/broken"), Verb::Get, transport())
		.get(&[], &[])
		.expect("An HTTP-level failure is not an error.");

	assert!(resource.is_error());

	match resource {
		Resource::Failure(failure) => {
			assert_eq!(failure.status(), 404);
			assert_eq!(failure.body(), "it is gone");
			assert!(matches!(
				failure.follow("pb:anything"),
				Err(NavigationError::ErrorResponse { status: 404, ref body })
					if body == "it is gone"
			));
		},
		Resource::Success(_) => panic!("A 404 must not wrap a success entity."),
	}
}
