// self
use crate::{_prelude::*, obs::Stage};

/// Future returned by [`StageSpan::instrument`].
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`StageSpan::instrument`]; the input future itself without `tracing`.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// `litauth.strategy` span for one stage of one strategy.
///
/// Without the `tracing` feature this is a zero-sized marker and every method is a passthrough.
#[derive(Clone, Debug)]
pub struct StageSpan {
	#[cfg(feature = "tracing")]
	inner: tracing::Span,
}
#[cfg(feature = "tracing")]
impl StageSpan {
	/// Opens the span for `stage` of the strategy registered as `name`.
	pub fn new(stage: Stage, name: &str) -> Self {
		Self {
			inner: tracing::info_span!("litauth.strategy", stage = stage.as_str(), strategy = name),
		}
	}

	/// Runs a synchronous section inside the span.
	pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
		self.inner.in_scope(f)
	}

	/// Attaches the span to `fut` so it is entered on every poll.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
	where
		Fut: Future,
	{
		tracing::Instrument::instrument(fut, self.inner.clone())
	}
}
#[cfg(not(feature = "tracing"))]
impl StageSpan {
	/// Opens the span for `stage` of the strategy registered as `name`.
	pub fn new(_stage: Stage, _name: &str) -> Self {
		Self {}
	}

	/// Runs a synchronous section inside the span.
	pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
		f()
	}

	/// Attaches the span to `fut` so it is entered on every poll.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
	where
		Fut: Future,
	{
		fut
	}
}

/// Logs a failed stage at `warn` level inside the current span.
pub fn warn_stage_failure(stage: Stage, error: &dyn Display) {
	#[cfg(feature = "tracing")]
	tracing::warn!(stage = stage.as_str(), %error, "Strategy stage failed.");
	#[cfg(not(feature = "tracing"))]
	let _ = (stage, error);
}
