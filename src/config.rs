//! Strategy configuration: required client credentials plus provider endpoints that fall
//! back to the LITauth defaults.
//!
//! [`StrategyConfigBuilder`] can be assembled field by field or deserialized from
//! camelCase JSON. [`StrategyConfigBuilder::build`] fills every absent optional field
//! exactly once, so the resulting [`StrategyConfig`] never recomputes endpoints.

// self
use crate::{
	_prelude::*,
	auth::{ScopeList, TokenSecret},
	error::ConfigError,
};

/// Default LITauth authorization endpoint.
pub const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "https://auth.litdevs.org/oauth/authorize";
/// Default LITauth token endpoint.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://auth.litdevs.org/api/oauth2/token";
/// Default LITauth primary user resource.
pub const DEFAULT_PROFILE_ENDPOINT: &str = "https://auth.litdevs.org/api/user";
/// Default scope delimiter used when rendering the `scope` parameter.
pub const DEFAULT_SCOPE_DELIMITER: &str = " ";

/// Endpoint set used by the strategy.
///
/// Only [`ProviderEndpoints::new`] constructs one, so the profile URL always has path segments
/// for scope resources to extend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProviderEndpoints {
	authorization: Url,
	token: Url,
	profile: Url,
}
impl ProviderEndpoints {
	/// Validates an endpoint set; a cannot-be-a-base profile URL is rejected.
	pub fn new(authorization: Url, token: Url, profile: Url) -> Result<Self, ConfigError> {
		if profile.cannot_be_a_base() {
			return Err(ConfigError::InvalidEndpoint { endpoint: "profile", source: None });
		}

		Ok(Self { authorization, token, profile })
	}

	/// Authorization endpoint users are redirected to.
	pub fn authorization(&self) -> &Url {
		&self.authorization
	}

	/// Token endpoint used for the code exchange.
	pub fn token(&self) -> &Url {
		&self.token
	}

	/// Primary user resource.
	pub fn profile(&self) -> &Url {
		&self.profile
	}

	/// Resource gated by `scope`, addressed as `{profile}/{scope}`.
	pub fn scope_resource(&self, scope: &str) -> Url {
		let mut url = self.profile.clone();

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().push(scope);
		}

		url
	}
}

/// Immutable strategy configuration produced by [`StrategyConfigBuilder::build`].
#[derive(Clone, PartialEq, Eq)]
pub struct StrategyConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: TokenSecret,
	/// Redirect URI registered with the provider.
	pub callback_url: Url,
	/// Scopes requested at authorization time, in order.
	pub scopes: ScopeList,
	/// Provider endpoints after defaulting.
	pub endpoints: ProviderEndpoints,
	/// Delimiter used to join scopes in the authorization request.
	pub scope_delimiter: String,
	/// Whether authorization sessions carry a PKCE (S256) challenge.
	pub pkce: bool,
}
impl StrategyConfig {
	/// Returns an empty builder.
	pub fn builder() -> StrategyConfigBuilder {
		StrategyConfigBuilder::default()
	}
}
impl Debug for StrategyConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StrategyConfig")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("callback_url", &self.callback_url)
			.field("scopes", &self.scopes)
			.field("endpoints", &self.endpoints)
			.field("scope_delimiter", &self.scope_delimiter)
			.field("pkce", &self.pkce)
			.finish()
	}
}

/// Builder for [`StrategyConfig`] values.
///
/// Field names mirror the JSON keys accepted by the [`Deserialize`] implementation.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StrategyConfigBuilder {
	/// OAuth 2.0 client identifier (required).
	#[serde(rename = "clientID", alias = "clientId")]
	pub client_id: Option<String>,
	/// OAuth 2.0 client secret (required).
	pub client_secret: Option<TokenSecret>,
	/// Redirect URI registered with the provider (required).
	#[serde(rename = "callbackURL", alias = "callbackUrl")]
	pub callback_url: Option<Url>,
	/// Requested scopes (required, non-empty).
	pub scope: Option<ScopeList>,
	/// Authorization endpoint override.
	#[serde(rename = "authorizationURL", alias = "authorizationUrl")]
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint override.
	#[serde(rename = "tokenURL", alias = "tokenUrl")]
	pub token_endpoint: Option<Url>,
	/// Primary user resource override.
	#[serde(rename = "profileURL", alias = "profileUrl")]
	pub profile_endpoint: Option<Url>,
	/// Scope delimiter override; an empty string counts as absent.
	#[serde(rename = "scopeSeparator", alias = "scopeDelimiter")]
	pub scope_delimiter: Option<String>,
	/// Enables PKCE for authorization sessions.
	pub pkce: bool,
}
impl StrategyConfigBuilder {
	/// Sets the client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, client_secret: impl Into<TokenSecret>) -> Self {
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Sets the redirect URI.
	pub fn callback_url(mut self, url: Url) -> Self {
		self.callback_url = Some(url);

		self
	}

	/// Sets the requested scopes.
	pub fn scope(mut self, scope: ScopeList) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Overrides the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Overrides the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Overrides the primary user resource.
	pub fn profile_endpoint(mut self, url: Url) -> Self {
		self.profile_endpoint = Some(url);

		self
	}

	/// Overrides the scope delimiter.
	pub fn scope_delimiter(mut self, delimiter: impl Into<String>) -> Self {
		self.scope_delimiter = Some(delimiter.into());

		self
	}

	/// Toggles PKCE for authorization sessions.
	pub fn pkce(mut self, enabled: bool) -> Self {
		self.pkce = enabled;

		self
	}

	/// Consumes the builder, validates required fields, and fills provider defaults.
	pub fn build(self) -> Result<StrategyConfig, ConfigError> {
		let client_id = self
			.client_id
			.filter(|value| !value.is_empty())
			.ok_or(ConfigError::MissingField { field: "client_id" })?;
		let client_secret =
			self.client_secret.ok_or(ConfigError::MissingField { field: "client_secret" })?;
		let callback_url =
			self.callback_url.ok_or(ConfigError::MissingField { field: "callback_url" })?;
		let scopes = self.scope.ok_or(ConfigError::MissingField { field: "scope" })?;

		if scopes.is_empty() {
			return Err(ConfigError::EmptyScopes);
		}

		let endpoints = ProviderEndpoints::new(
			endpoint_or_default(
				"authorization",
				self.authorization_endpoint,
				DEFAULT_AUTHORIZATION_ENDPOINT,
			)?,
			endpoint_or_default("token", self.token_endpoint, DEFAULT_TOKEN_ENDPOINT)?,
			endpoint_or_default("profile", self.profile_endpoint, DEFAULT_PROFILE_ENDPOINT)?,
		)?;

		let scope_delimiter = self
			.scope_delimiter
			.filter(|value| !value.is_empty())
			.unwrap_or_else(|| DEFAULT_SCOPE_DELIMITER.to_owned());

		Ok(StrategyConfig {
			client_id,
			client_secret,
			callback_url,
			scopes,
			endpoints,
			scope_delimiter,
			pkce: self.pkce,
		})
	}
}

fn endpoint_or_default(
	endpoint: &'static str,
	explicit: Option<Url>,
	default: &str,
) -> Result<Url, ConfigError> {
	match explicit {
		Some(url) => Ok(url),
		None => Url::parse(default)
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint, source: Some(source) }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse config test URL.")
	}

	fn required() -> StrategyConfigBuilder {
		StrategyConfig::builder()
			.client_id("123")
			.client_secret("123")
			.callback_url(url("http://localhost:5000/callback"))
			.scope(ScopeList::new(["identify", "email"]).expect("Scope fixture should be valid."))
	}

	#[test]
	fn absent_optional_fields_take_provider_defaults() {
		let config = required().build().expect("Config with required fields should build.");

		assert_eq!(config.endpoints.authorization().as_str(), DEFAULT_AUTHORIZATION_ENDPOINT);
		assert_eq!(config.endpoints.token().as_str(), DEFAULT_TOKEN_ENDPOINT);
		assert_eq!(config.endpoints.profile().as_str(), DEFAULT_PROFILE_ENDPOINT);
		assert_eq!(config.scope_delimiter, " ");
		assert!(!config.pkce);
	}

	#[test]
	fn explicit_fields_are_kept_unchanged() {
		let config = required()
			.authorization_endpoint(url("https://sso.example.com/authorize"))
			.token_endpoint(url("https://sso.example.com/token"))
			.profile_endpoint(url("https://sso.example.com/me"))
			.scope_delimiter(",")
			.build()
			.expect("Config with overrides should build.");

		assert_eq!(config.endpoints.authorization().as_str(), "https://sso.example.com/authorize");
		assert_eq!(config.endpoints.token().as_str(), "https://sso.example.com/token");
		assert_eq!(config.endpoints.profile().as_str(), "https://sso.example.com/me");
		assert_eq!(config.scope_delimiter, ",");
	}

	#[test]
	fn empty_delimiter_falls_back_to_default() {
		let config = required().scope_delimiter("").build().expect("Config should build.");

		assert_eq!(config.scope_delimiter, DEFAULT_SCOPE_DELIMITER);
	}

	#[test]
	fn missing_required_fields_fail_fast() {
		let err = StrategyConfig::builder()
			.client_secret("123")
			.build()
			.expect_err("Missing client id must be rejected.");

		assert!(matches!(err, ConfigError::MissingField { field: "client_id" }));

		let err = required()
			.scope(ScopeList::default())
			.build()
			.expect_err("Empty scope list must be rejected.");

		assert!(matches!(err, ConfigError::EmptyScopes));

		let mut builder = required();

		builder.callback_url = None;

		let err = builder.build().expect_err("Missing callback must be rejected.");

		assert!(matches!(err, ConfigError::MissingField { field: "callback_url" }));
	}

	#[test]
	fn scope_resources_extend_the_profile_path() {
		let config = required().build().expect("Config should build.");

		assert_eq!(
			config.endpoints.scope_resource("email").as_str(),
			"https://auth.litdevs.org/api/user/email"
		);

		let config = required()
			.profile_endpoint(url("https://sso.example.com/api/user/"))
			.build()
			.expect("Config should build.");

		assert_eq!(
			config.endpoints.scope_resource("email").as_str(),
			"https://sso.example.com/api/user/email"
		);
	}

	#[test]
	fn builder_deserializes_from_camel_case_json() {
		let builder: StrategyConfigBuilder = serde_json::from_str(
			r#"{
				"clientID": "123",
				"clientSecret": "123",
				"callbackURL": "http://localhost:5000/callback",
				"scope": ["identify", "email"],
				"tokenURL": "https://sso.example.com/token"
			}"#,
		)
		.expect("Builder JSON should deserialize.");
		let config = builder.build().expect("Deserialized builder should build.");

		assert_eq!(config.client_id, "123");
		assert_eq!(config.client_secret.expose(), "123");
		assert_eq!(config.scopes.iter().collect::<Vec<_>>(), vec!["identify", "email"]);
		assert_eq!(config.endpoints.token().as_str(), "https://sso.example.com/token");
		assert_eq!(config.endpoints.authorization().as_str(), DEFAULT_AUTHORIZATION_ENDPOINT);
	}

	#[test]
	fn debug_output_redacts_client_secret() {
		let config = required().client_secret("hunter2").build().expect("Config should build.");

		assert!(!format!("{config:?}").contains("hunter2"));
	}

	#[test]
	fn endpoints_reject_opaque_profile_urls() {
		let err = ProviderEndpoints::new(
			url(DEFAULT_AUTHORIZATION_ENDPOINT),
			url(DEFAULT_TOKEN_ENDPOINT),
			url("mailto:profile@example.com"),
		)
		.expect_err("Opaque profile URL must be rejected.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { endpoint: "profile", source: None }));

		let err = required()
			.profile_endpoint(url("data:text/plain,profile"))
			.build()
			.expect_err("Builder must reject an opaque profile URL.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { endpoint: "profile", .. }));
	}
}
