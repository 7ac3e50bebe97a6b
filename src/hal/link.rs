//! Templated, executable hypermedia relations.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	hal::entity::{Entity, ErrorEntity, Resource},
	http::{Response, Transport},
};

/// Escape set for template expansion: everything except ASCII alphanumerics
/// and `-._~`, so a space encodes to `%20` and a forward slash to `%2F`.
/// Values landing in a single path segment must not introduce new segments.
const TEMPLATE_ESCAPE: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// HTTP verb a relation executes with under [`Link::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
	/// Execute as an HTTP GET.
	Get,
	/// Execute as an HTTP POST.
	Post,
}

/// A named, possibly templated relation bound to a transport.
///
/// Immutable: [`Link::expand`] and [`Link::with_query`] return new instances
/// and leave the receiver unchanged, so links can be shared freely across
/// sequential verification runs.
#[derive(Clone)]
pub struct Link {
	relation: String,
	href: String,
	name: Option<String>,
	title: Option<String>,
	verb: Verb,
	transport: Arc<dyn Transport>,
}
impl Link {
	/// Creates a link for a relation with an explicit verb.
	pub fn new(
		relation: impl Into<String>,
		href: impl Into<String>,
		verb: Verb,
		transport: Arc<dyn Transport>,
	) -> Self {
		Self { relation: relation.into(), href: href.into(), name: None, title: None, verb, transport }
	}

	/// Builds a link from a relation entry in a resource's link map.
	///
	/// Entries that do not declare a `method` execute as POST under
	/// [`Link::run`]; the broker's verification relations rely on this.
	/// Entries without an `href` yield no link at all.
	pub(crate) fn from_relation(
		relation: &str,
		entry: &Value,
		transport: Arc<dyn Transport>,
	) -> Option<Self> {
		let href = entry.get("href")?.as_str()?.to_owned();
		let verb = match entry.get("method").and_then(Value::as_str) {
			Some(method) if method.eq_ignore_ascii_case("get") => Verb::Get,
			_ => Verb::Post,
		};
		let name = entry.get("name").and_then(Value::as_str).map(ToOwned::to_owned);
		let title = entry.get("title").and_then(Value::as_str).map(ToOwned::to_owned);

		Some(Self { relation: relation.to_owned(), href, name, title, verb, transport })
	}

	/// Relation name this link was found under.
	pub fn relation(&self) -> &str {
		&self.relation
	}

	/// Target href, possibly still containing `{name}` placeholders.
	pub fn href(&self) -> &str {
		&self.href
	}

	/// `name` attribute of the relation entry, if any.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// `title` attribute of the relation entry, if any.
	pub fn title(&self) -> Option<&str> {
		self.title.as_deref()
	}

	/// Verb used by [`Link::run`].
	pub fn verb(&self) -> Verb {
		self.verb
	}

	/// Returns a new link with every `{key}` placeholder replaced by the
	/// percent-encoded value from `params`.
	pub fn expand(&self, params: &[(&str, &str)]) -> Self {
		let mut href = self.href.clone();

		for (key, value) in params {
			let encoded = utf8_percent_encode(value, TEMPLATE_ESCAPE).to_string();

			href = href.replace(&format!("{{{key}}}"), &encoded);
		}

		Self { href, ..self.clone() }
	}

	/// Returns a new link with `extra` merged into the href's query string.
	///
	/// Existing keys are overwritten in place, untouched keys keep their
	/// value and relative order, and keys not already present are appended
	/// in `extra`'s order.
	pub fn with_query(&self, extra: &[(&str, &str)]) -> Self {
		let (base, mut merged) = match self.href.split_once('?') {
			Some((base, query)) =>
				(base, form_urlencoded::parse(query.as_bytes()).into_owned().collect::<Vec<_>>()),
			None => (self.href.as_str(), Vec::new()),
		};

		for (key, value) in extra.iter().copied() {
			match merged.iter_mut().find(|(existing, _)| existing.as_str() == key) {
				Some((_, existing_value)) => *existing_value = value.to_owned(),
				None => merged.push((key.to_owned(), value.to_owned())),
			}
		}

		let query = form_urlencoded::Serializer::new(String::new()).extend_pairs(merged).finish();

		Self { href: format!("{base}?{query}"), ..self.clone() }
	}

	/// Executes the link with its configured verb.
	///
	/// Placeholders left in the href are expanded from `params` first, so an
	/// unresolved template never reaches the wire. A GET relation sends
	/// `params` as query parameters; anything else posts `params`
	/// JSON-encoded as the body. The outcome is wrapped as a [`Resource`].
	pub fn run(&self, params: &Value, headers: &[(&str, &str)]) -> Result<Resource> {
		let pairs = value_pairs(params);
		let link = if self.href.contains('{') {
			self.expand(&borrow_pairs(&pairs))
		} else {
			self.clone()
		};

		match link.verb {
			Verb::Get => link.get(&borrow_pairs(&pairs), headers),
			Verb::Post => link.post(params, headers),
		}
	}

	/// Issues a GET against the literal href with `params` as query
	/// parameters.
	pub fn get(&self, params: &[(&str, &str)], headers: &[(&str, &str)]) -> Result<Resource> {
		let response = self.transport.get(&self.href, params, headers)?;

		self.wrap(response)
	}

	/// Issues a POST against the literal href with `params` JSON-encoded as
	/// the body, merging any extra headers.
	pub fn post(&self, params: &Value, headers: &[(&str, &str)]) -> Result<Resource> {
		let body = params.to_string();
		let response = self.transport.post(&self.href, Some(&body), headers)?;

		self.wrap(response)
	}

	fn wrap(&self, response: Response) -> Result<Resource> {
		if response.success() {
			let body = response.body()?;

			Ok(Resource::Success(Entity::new(
				self.href.as_str(),
				body,
				Arc::clone(&self.transport),
				response,
			)))
		} else {
			Ok(Resource::Failure(ErrorEntity::new(
				self.href.as_str(),
				response.raw_body().to_owned(),
				Arc::clone(&self.transport),
				response,
			)))
		}
	}
}
impl Debug for Link {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Link")
			.field("relation", &self.relation)
			.field("href", &self.href)
			.field("verb", &self.verb)
			.finish_non_exhaustive()
	}
}

/// String forms of a JSON object's top-level fields, used for template
/// expansion and GET query parameters.
fn value_pairs(params: &Value) -> Vec<(String, String)> {
	params
		.as_object()
		.map(|object| {
			object.iter().map(|(key, value)| (key.clone(), scalar_string(value))).collect()
		})
		.unwrap_or_default()
}

fn borrow_pairs(pairs: &[(String, String)]) -> Vec<(&str, &str)> {
	pairs.iter().map(|(key, value)| (key.as_str(), value.as_str())).collect()
}

fn scalar_string(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}
