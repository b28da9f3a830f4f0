//! Ordered scope lists requested from the provider.

// self
use crate::_prelude::*;

/// Reasons a scope entry is refused.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeValidationError {
	/// An entry was the empty string.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// An entry contained whitespace, which would split it on the wire.
	#[error("Scope `{scope}` contains whitespace.")]
	ContainsWhitespace {
		/// Entry as supplied.
		scope: String,
	},
}

/// Ordered list of OAuth scopes.
///
/// The provider renders the consent screen in request order, so the list keeps the order
/// it was built in and only drops later duplicates. Configuration may spell it as a JSON
/// array or as one whitespace-separated string.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ScopeInput", into = "Vec<String>")]
pub struct ScopeList(Arc<[String]>);
impl ScopeList {
	/// Validates and collects `scopes`.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		scopes
			.into_iter()
			.map(Into::into)
			.try_fold(Vec::<String>::new(), |mut list, scope| {
				validate(&scope)?;

				if !list.contains(&scope) {
					list.push(scope);
				}

				Ok(list)
			})
			.map(|list| Self(list.into()))
	}

	/// Count of distinct entries.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// `true` when nothing was requested.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Whether `scope` was requested.
	pub fn contains(&self, scope: &str) -> bool {
		self.iter().any(|requested| requested == scope)
	}

	/// Entries in request order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Joins the scopes with `delimiter`, returning `None` for an empty list.
	pub fn join(&self, delimiter: &str) -> Option<String> {
		(!self.is_empty()).then(|| self.0.join(delimiter))
	}
}
impl Debug for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_list().entries(self.iter()).finish()
	}
}
impl Display for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0.join(" "))
	}
}
impl FromStr for ScopeList {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"" => Ok(Self::default()),
			blank if blank.trim().is_empty() => Err(ScopeValidationError::Empty),
			joined => Self::new(joined.split_whitespace()),
		}
	}
}
impl TryFrom<ScopeInput> for ScopeList {
	type Error = ScopeValidationError;

	fn try_from(input: ScopeInput) -> Result<Self, Self::Error> {
		match input {
			ScopeInput::Joined(joined) => joined.parse(),
			ScopeInput::List(list) => Self::new(list),
		}
	}
}
impl From<ScopeList> for Vec<String> {
	fn from(scopes: ScopeList) -> Self {
		scopes.0.to_vec()
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScopeInput {
	Joined(String),
	List(Vec<String>),
}

fn validate(scope: &str) -> Result<(), ScopeValidationError> {
	if scope.is_empty() {
		Err(ScopeValidationError::Empty)
	} else if scope.contains(char::is_whitespace) {
		Err(ScopeValidationError::ContainsWhitespace { scope: scope.to_owned() })
	} else {
		Ok(())
	}
}
