//! Optional observability helpers for strategy stages.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `litauth.strategy` with the `stage` and
//!   `strategy` (identity name) fields.
//! - Enable `metrics` to increment the `litauth_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Strategy stages observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Rendering the provider authorize URL.
	Authorize,
	/// Exchanging an authorization code at the token endpoint.
	Exchange,
	/// Fetching the user profile and scope resources.
	ResolveProfile,
	/// Running the application's verify callback.
	Verify,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Authorize => "authorize",
			Stage::Exchange => "exchange",
			Stage::ResolveProfile => "resolve_profile",
			Stage::Verify => "verify",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}

	/// Maps a stage result onto its outcome label.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { Outcome::Success } else { Outcome::Failure }
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a [`StageSpan`], recording attempt and outcome for `stage`.
pub async fn observe<F, T, E>(stage: Stage, name: &str, fut: F) -> Result<T, E>
where
	F: Future<Output = Result<T, E>>,
	E: Display,
{
	let span = StageSpan::new(stage, name);

	record_stage_outcome(stage, Outcome::Attempt);

	let result = span.instrument(fut).await;

	if let Err(e) = &result {
		warn_stage_failure(stage, e);
	}

	record_stage_outcome(stage, Outcome::of(&result));

	result
}
