//! Observability hooks for the resolution protocol; compile to no-ops unless
//! the `tracing` feature is enabled.

// self
use crate::_prelude::*;

/// Resolution stages used to tag spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveStage {
	/// Fetching the broker index resource.
	Index,
	/// Executing the selector-based verification relation.
	PactsForVerification,
	/// Walking the legacy per-tag relations.
	LegacyPacts,
}
impl ResolveStage {
	/// Stable label used in span fields.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Index => "index",
			Self::PactsForVerification => "pacts_for_verification",
			Self::LegacyPacts => "legacy_pacts",
		}
	}
}

/// A span builder used by resolution stages.
#[derive(Clone, Debug)]
pub struct ResolveSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ResolveSpan {
	/// Creates a new span tagged with the resolution stage.
	pub fn new(stage: ResolveStage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("pact_broker_client.resolve", stage = stage.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Enters the span for the lifetime of the returned guard.
	pub fn entered(self) -> ResolveSpanGuard {
		#[cfg(feature = "tracing")]
		{
			ResolveSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			ResolveSpanGuard {}
		}
	}
}

/// RAII guard returned by [`ResolveSpan::entered`].
pub struct ResolveSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for ResolveSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ResolveSpanGuard(..)")
	}
}

/// Emits a broker-supplied verification notice.
pub fn notice(text: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(target: "pact_broker_client", "{text}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = text;
	}
}

/// Emits a wire-level line for one HTTP exchange when verbose mode is on.
pub fn wire<F>(verbose: bool, line: F)
where
	F: FnOnce() -> String,
{
	#[cfg(feature = "tracing")]
	{
		if verbose {
			tracing::debug!(target: "pact_broker_client.wire", "{}", line());
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (verbose, line);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn resolve_span_noop_without_tracing() {
		let _guard = ResolveSpan::new(ResolveStage::Index).entered();
		// Compile-time smoke test ensures the guard exists even when tracing is disabled.
	}

	#[test]
	fn stage_labels_are_stable() {
		assert_eq!(ResolveStage::Index.as_str(), "index");
		assert_eq!(ResolveStage::PactsForVerification.as_str(), "pacts_for_verification");
		assert_eq!(ResolveStage::LegacyPacts.as_str(), "legacy_pacts");
	}
}
