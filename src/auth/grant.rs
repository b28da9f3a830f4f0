//! Token-exchange results handed to the profile resolver and verify callback.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Tokens issued by the provider's token endpoint for an authorization code.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenGrant {
	/// Access token used to call the provider API.
	pub access_token: TokenSecret,
	/// Refresh token, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Lifetime reported by the provider, if any.
	pub expires_in: Option<Duration>,
	/// Scopes echoed back by the provider, if any.
	pub scopes: Option<Vec<String>>,
}
impl TokenGrant {
	/// Creates a grant carrying only an access token.
	pub fn new(access_token: impl Into<TokenSecret>) -> Self {
		Self { access_token: access_token.into(), refresh_token: None, expires_in: None, scopes: None }
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<TokenSecret>) -> Self {
		self.refresh_token = Some(refresh_token.into());

		self
	}
}
impl Debug for TokenGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGrant")
			.field("access_token", &"<redacted>")
			.field("refresh_token_set", &self.refresh_token.is_some())
			.field("expires_in", &self.expires_in)
			.field("scopes", &self.scopes)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn debug_output_hides_tokens() {
		let grant = TokenGrant::new("access-123").with_refresh_token("refresh-456");
		let rendered = format!("{grant:?}");

		assert!(!rendered.contains("access-123"));
		assert!(!rendered.contains("refresh-456"));
		assert!(rendered.contains("refresh_token_set: true"));
	}
}
