//! Consumer version selectors and their normalization rules.

// self
use crate::_prelude::*;

/// Identifies which consumer versions' pacts to include in verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerVersionSelector {
	/// Consumer version tag the selector matches.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tag: Option<String>,
	/// Restrict the selection to the latest version per tag.
	pub latest: bool,
}
impl ConsumerVersionSelector {
	/// Selector for the latest consumer version carrying the given tag.
	pub fn latest_for_tag(tag: impl Into<String>) -> Self {
		Self { tag: Some(tag.into()), latest: true }
	}
}
impl From<&str> for ConsumerVersionSelector {
	fn from(tag: &str) -> Self {
		Self::latest_for_tag(tag)
	}
}
impl From<String> for ConsumerVersionSelector {
	fn from(tag: String) -> Self {
		Self::latest_for_tag(tag)
	}
}

/// Normalizes bare tags into selectors.
///
/// Each tag becomes `{ tag, latest: true }`; no tags at all yields an empty
/// list, which tells the broker to apply its default selection.
pub fn selectors_from_tags<I, T>(tags: I) -> Vec<ConsumerVersionSelector>
where
	I: IntoIterator<Item = T>,
	T: Into<String>,
{
	tags.into_iter().map(ConsumerVersionSelector::latest_for_tag).collect()
}

/// Extracts the usable tags from a selector list for the legacy dialect.
///
/// Selectors without a usable tag are dropped.
pub fn tags_from_selectors(selectors: &[ConsumerVersionSelector]) -> Vec<String> {
	selectors
		.iter()
		.filter_map(|selector| selector.tag.clone())
		.filter(|tag| !tag.is_empty())
		.collect()
}
