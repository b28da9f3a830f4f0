//! Explicit name to strategy mapping, built once at startup and passed to request handlers.

// self
use crate::{_prelude::*, strategy::IdentityStrategy};

/// Shared handle to a registered strategy.
pub type SharedStrategy<U> = Arc<dyn IdentityStrategy<User = U>>;

/// Strategies keyed by identity name.
pub struct StrategyRegistry<U> {
	strategies: HashMap<String, SharedStrategy<U>>,
}
impl<U> StrategyRegistry<U> {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self { strategies: HashMap::new() }
	}

	/// Registers `strategy` under its own name, replacing any previous entry.
	pub fn register<S>(mut self, strategy: S) -> Self
	where
		S: 'static + IdentityStrategy<User = U>,
	{
		self.insert(Arc::new(strategy));

		self
	}

	/// Registers an already shared strategy under its own name.
	///
	/// Returns the strategy previously registered under the same name.
	pub fn insert(&mut self, strategy: SharedStrategy<U>) -> Option<SharedStrategy<U>> {
		self.strategies.insert(strategy.name().to_owned(), strategy)
	}

	/// Looks up the strategy registered under `name`.
	pub fn get(&self, name: &str) -> Option<&SharedStrategy<U>> {
		self.strategies.get(name)
	}

	/// Registered names in sorted order.
	pub fn names(&self) -> Vec<&str> {
		let mut names = self.strategies.keys().map(String::as_str).collect::<Vec<_>>();

		names.sort_unstable();

		names
	}

	/// Number of registered strategies.
	pub fn len(&self) -> usize {
		self.strategies.len()
	}

	/// Returns `true` when no strategy is registered.
	pub fn is_empty(&self) -> bool {
		self.strategies.is_empty()
	}
}
impl<U> Default for StrategyRegistry<U> {
	fn default() -> Self {
		Self::new()
	}
}
impl<U> Clone for StrategyRegistry<U> {
	fn clone(&self) -> Self {
		Self { strategies: self.strategies.clone() }
	}
}
impl<U> Debug for StrategyRegistry<U> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyRegistry").field("names", &self.names()).finish()
	}
}
