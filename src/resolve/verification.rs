//! Selector-based pact discovery with fallback to the legacy dialect.

// crates.io
use serde_json::json;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, NavigationError},
	hal::{Entity, Link, Resource},
	http::{Transport, TransportOptions},
	obs::{self, ResolveSpan, ResolveStage},
	resolve::{
		self, legacy,
		selectors::{ConsumerVersionSelector, selectors_from_tags, tags_from_selectors},
	},
	uri::PactUri,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Relation advertised by brokers that support selector-based bulk
/// verification.
pub const PACTS_FOR_VERIFICATION_RELATION: &str = "beta:provider-pacts-for-verification";

/// Parameters for one resolution run.
///
/// Constructed per run and discarded afterwards; nothing here is read from
/// ambient process state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
	/// Provider whose pacts are being verified.
	pub provider: String,
	/// Which consumer versions to include.
	pub consumer_version_selectors: Vec<ConsumerVersionSelector>,
	/// Tags describing the provider version under verification.
	pub provider_version_tags: Vec<String>,
	/// Broker index URL.
	pub broker_base_url: String,
	/// Credentials and wire options for every broker request.
	pub transport_options: TransportOptions,
}
impl ResolverConfig {
	/// Starts a builder for the given provider name.
	pub fn builder(provider: impl Into<String>) -> ResolverConfigBuilder {
		ResolverConfigBuilder { provider: provider.into(), ..Default::default() }
	}
}

/// Builder enforcing the required fields of [`ResolverConfig`].
#[derive(Clone, Debug, Default)]
pub struct ResolverConfigBuilder {
	provider: String,
	consumer_version_selectors: Vec<ConsumerVersionSelector>,
	provider_version_tags: Vec<String>,
	broker_base_url: Option<String>,
	transport_options: TransportOptions,
}
impl ResolverConfigBuilder {
	/// Sets the broker index URL and the transport options used against it.
	pub fn broker_base_url(mut self, url: impl Into<String>, options: TransportOptions) -> Self {
		self.broker_base_url = Some(url.into());
		self.transport_options = options;

		self
	}

	/// Adds a selector for the latest consumer version with the given tag.
	pub fn consumer_version_tag(mut self, tag: impl Into<String>) -> Self {
		self.consumer_version_selectors.push(ConsumerVersionSelector::latest_for_tag(tag));

		self
	}

	/// Adds a latest-version selector for each given tag.
	pub fn consumer_version_tags<I, T>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = T>,
		T: Into<String>,
	{
		self.consumer_version_selectors.extend(selectors_from_tags(tags));

		self
	}

	/// Adds an explicit selector.
	pub fn consumer_version_selector(mut self, selector: ConsumerVersionSelector) -> Self {
		self.consumer_version_selectors.push(selector);

		self
	}

	/// Adds a provider version tag.
	pub fn provider_version_tag(mut self, tag: impl Into<String>) -> Self {
		self.provider_version_tags.push(tag.into());

		self
	}

	/// Adds provider version tags.
	pub fn provider_version_tags<I, T>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = T>,
		T: Into<String>,
	{
		self.provider_version_tags.extend(tags.into_iter().map(Into::into));

		self
	}

	/// Enables verbose resolution output (defaults to off).
	pub fn verbose(mut self, verbose: bool) -> Self {
		self.transport_options.verbose = verbose;

		self
	}

	/// Validates and produces the configuration.
	pub fn build(self) -> Result<ResolverConfig, ConfigError> {
		let broker_base_url = self.broker_base_url.ok_or(ConfigError::MissingBrokerBaseUrl)?;

		Ok(ResolverConfig {
			provider: self.provider,
			consumer_version_selectors: self.consumer_version_selectors,
			provider_version_tags: self.provider_version_tags,
			broker_base_url,
			transport_options: self.transport_options,
		})
	}
}

/// Resolves the set of pacts a provider must verify, negotiating between the
/// selector-based dialect and the legacy per-tag dialect.
///
/// The client probes the index for the bulk-verification relation and falls
/// back to the legacy routine when the broker does not advertise it, so one
/// client talks to brokers of different ages without the caller knowing the
/// broker's version in advance.
pub struct BrokerClient {
	config: ResolverConfig,
	transport: Arc<dyn Transport>,
}
impl BrokerClient {
	/// Builds a client with the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn new(config: ResolverConfig) -> Result<Self, ConfigError> {
		let transport = Arc::new(ReqwestTransport::new(config.transport_options.clone())?);

		Ok(Self { config, transport })
	}

	/// Builds a client over a custom transport.
	pub fn with_transport(config: ResolverConfig, transport: Arc<dyn Transport>) -> Self {
		Self { config, transport }
	}

	/// Resolution parameters this client was built with.
	pub fn config(&self) -> &ResolverConfig {
		&self.config
	}

	/// Discovers the pact locations to verify.
	pub fn fetch_pact_uris(&self) -> Result<Vec<PactUri>> {
		let index =
			resolve::fetch_index(&self.config.broker_base_url, Arc::clone(&self.transport))?;

		match index.follow(PACTS_FOR_VERIFICATION_RELATION) {
			Ok(link) => self.fetch_for_verification(&link),
			Err(NavigationError::RelationNotFound { .. }) => legacy::fetch_pacts(
				&self.config.provider,
				&tags_from_selectors(&self.config.consumer_version_selectors),
				&self.config.broker_base_url,
				&self.config.transport_options,
				Arc::clone(&self.transport),
			),
			Err(other) => Err(other.into()),
		}
	}

	fn fetch_for_verification(&self, link: &Link) -> Result<Vec<PactUri>> {
		let _guard = ResolveSpan::new(ResolveStage::PactsForVerification).entered();
		let payload = json!({
			"consumerVersionSelectors": &self.config.consumer_version_selectors,
			"providerVersionTags": &self.config.provider_version_tags,
			"verbose": self.config.transport_options.verbose,
		});
		let link = link.expand(&[("provider", &self.config.provider)]);

		match link.run(&payload, &[])? {
			Resource::Success(entity) => Ok(self.pact_uris(&entity)),
			Resource::Failure(failure) => Err(NavigationError::ErrorResponse {
				status: failure.status(),
				body: failure.body().to_owned(),
			}
			.into()),
		}
	}

	fn pact_uris(&self, entity: &Entity) -> Vec<PactUri> {
		let credentials = self.config.transport_options.credentials();

		entity
			.embedded("pacts")
			.iter()
			.filter_map(|pact| {
				let href = pact.get("_links")?.get("self")?.get("href")?.as_str()?;
				let mut metadata = Map::new();

				if let Some(short) = pact.get("shortDescription") {
					metadata.insert("shortDescription".into(), short.clone());
				}
				if let Some(properties) = pact.get("verificationProperties") {
					metadata.insert("verificationProperties".into(), properties.clone());

					if self.config.transport_options.verbose {
						emit_notices(properties);
					}
				}

				let mut uri = PactUri::new(href).with_metadata(metadata);

				if let Some(credentials) = &credentials {
					uri = uri.with_credentials(credentials.clone());
				}

				Some(uri)
			})
			.collect()
	}
}

fn emit_notices(properties: &Value) {
	let Some(notices) = properties.get("notices").and_then(Value::as_array) else {
		return;
	};

	for text in notices.iter().filter_map(|notice| notice.get("text").and_then(Value::as_str)) {
		obs::notice(text);
	}
}
