//! Canonical, serializable HTTP request representation used by matching.

// crates.io
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// Canonical form of a recorded HTTP request.
///
/// `headers`, `body`, and `query` each distinguish *absent* (never supplied)
/// from *present but possibly empty*: serialization always includes `method`
/// and `path` and skips only the fields that were never given, so partial
/// and fully-specified request shapes stay distinguishable downstream.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PactRequest {
	method: String,
	path: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	query: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	headers: Option<Map<String, Value>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	body: Option<Value>,
}
impl PactRequest {
	/// Creates a descriptor for a method and path.
	///
	/// The method is stored upper-cased and exactly one trailing slash is
	/// stripped from the path.
	pub fn new(method: impl AsRef<str>, path: impl AsRef<str>) -> Self {
		let path = path.as_ref();
		let path = path.strip_suffix('/').unwrap_or(path).to_owned();

		Self {
			method: method.as_ref().to_uppercase(),
			path,
			query: None,
			headers: None,
			body: None,
		}
	}

	/// Supplies the query term, marking the field present.
	pub fn with_query(mut self, query: Value) -> Self {
		self.query = Some(query);

		self
	}

	/// Supplies the headers, marking the field present.
	pub fn with_headers(mut self, headers: Map<String, Value>) -> Self {
		self.headers = Some(headers);

		self
	}

	/// Supplies the body, marking the field present.
	pub fn with_body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Upper-cased request method.
	pub fn method(&self) -> &str {
		&self.method
	}

	/// Request path with the trailing slash stripped.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Query term, when one was supplied.
	pub fn query(&self) -> Option<&Value> {
		self.query.as_ref()
	}

	/// Headers, when they were supplied.
	pub fn headers(&self) -> Option<&Map<String, Value>> {
		self.headers.as_ref()
	}

	/// Body, when one was supplied.
	pub fn body(&self) -> Option<&Value> {
		self.body.as_ref()
	}

	/// Renders `"METHOD fullPath"` for verification output.
	pub fn method_and_path(&self) -> String {
		format!("{} {}", self.method, self.full_path())
	}

	/// Display path plus `?<query>` when a non-empty query is present.
	pub fn full_path(&self) -> String {
		match &self.query {
			Some(query) if !query_is_empty(query) =>
				format!("{}?{}", self.display_path(), reify_query(query)),
			_ => self.display_path().to_owned(),
		}
	}

	fn display_path(&self) -> &str {
		if self.path.is_empty() { "/" } else { &self.path }
	}
}

/// Turns a structured query term into its literal wire form.
///
/// String terms are already literal; map terms form-encode their scalar
/// fields. Richer matcher terms are reified by the matching layer before
/// they reach this type.
fn reify_query(query: &Value) -> String {
	match query {
		Value::String(text) => text.clone(),
		Value::Object(map) => form_urlencoded::Serializer::new(String::new())
			.extend_pairs(map.iter().map(|(key, value)| (key, scalar_string(value))))
			.finish(),
		Value::Null => String::new(),
		other => other.to_string(),
	}
}

fn query_is_empty(query: &Value) -> bool {
	match query {
		Value::Null => true,
		Value::String(text) => text.is_empty(),
		Value::Object(map) => map.is_empty(),
		Value::Array(items) => items.is_empty(),
		_ => false,
	}
}

fn scalar_string(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}
