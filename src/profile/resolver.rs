//! Access token to [`Profile`] resolution.
//!
//! Resolution is a linear two-step sequence: the primary user resource is fetched and parsed,
//! then, when the `email` scope was configured, the scoped email resource is fetched and merged.
//! The first failure ends the sequence, so every call produces exactly one result.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{ScopeList, TokenSecret},
	config::{ProviderEndpoints, StrategyConfig},
	engine::OAuth2Engine,
	error::{BodyParseError, ProfileResource, ResolutionError},
	http::ApiHttpClient,
	obs::{self, Stage},
	profile::Profile,
};

/// Scope whose resource is merged into the profile.
pub const EMAIL_SCOPE: &str = "email";

#[derive(Deserialize)]
struct EmailResource {
	#[serde(default)]
	email: Option<String>,
}
impl EmailResource {
	/// Reads the resource out of an already parsed object; `email` must be a string or null.
	fn from_object(object: Map<String, Value>) -> Result<Self, BodyParseError> {
		Ok(serde_path_to_error::deserialize(Value::Object(object))?)
	}
}

/// Resolves access tokens into normalized profiles.
pub struct ProfileResolver<C>
where
	C: ?Sized + ApiHttpClient,
{
	provider: String,
	engine: Arc<OAuth2Engine<C>>,
	endpoints: ProviderEndpoints,
	scopes: ScopeList,
}
impl<C> ProfileResolver<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a resolver tagging profiles with `provider` and reading endpoints and scopes
	/// from `config`.
	pub fn new(
		provider: impl Into<String>,
		engine: Arc<OAuth2Engine<C>>,
		config: &StrategyConfig,
	) -> Self {
		Self {
			provider: provider.into(),
			engine,
			endpoints: config.endpoints.clone(),
			scopes: config.scopes.clone(),
		}
	}

	/// Identity name written into every resolved profile.
	pub fn provider(&self) -> &str {
		&self.provider
	}

	/// Whether resolution fetches the scoped email resource.
	pub fn fetches_email(&self) -> bool {
		self.scopes.contains(EMAIL_SCOPE)
	}

	/// Resolves `access_token` into a [`Profile`].
	pub async fn resolve(&self, access_token: &TokenSecret) -> Result<Profile, ResolutionError> {
		obs::observe(Stage::ResolveProfile, &self.provider, self.resolve_inner(access_token)).await
	}

	/// Resolves `access_token` and hands the result to `done`.
	///
	/// `done` is consumed by the call, so it runs exactly once per resolution.
	pub async fn resolve_with<F>(&self, access_token: &TokenSecret, done: F)
	where
		F: FnOnce(Result<Profile, ResolutionError>),
	{
		done(self.resolve(access_token).await);
	}

	async fn resolve_inner(&self, access_token: &TokenSecret) -> Result<Profile, ResolutionError> {
		let user = self
			.fetch_object(self.endpoints.profile(), access_token, ProfileResource::UserProfile)
			.await?;
		let mut profile = Profile::from_user_object(&self.provider, access_token.clone(), user);

		if self.fetches_email() {
			let resource = ProfileResource::Scope(EMAIL_SCOPE.into());
			let url = self.endpoints.scope_resource(EMAIL_SCOPE);
			let object = self.fetch_object(&url, access_token, resource.clone()).await?;
			let email = EmailResource::from_object(object)
				.map_err(|source| ResolutionError::MalformedResponse { resource, source })?
				.email;

			// Empty strings count as "no email", leaving any primary value in place.
			if let Some(email) = email.filter(|email| !email.is_empty()) {
				profile.set_email(email);
			}
		}

		profile.fetched_at = OffsetDateTime::now_utc();

		Ok(profile)
	}

	/// GETs `url` and parses the whole body as one JSON object.
	async fn fetch_object(
		&self,
		url: &Url,
		access_token: &TokenSecret,
		resource: ProfileResource,
	) -> Result<Map<String, Value>, ResolutionError> {
		let body = match self.engine.get(url, access_token).await {
			Ok(body) => body,
			Err(source) => return Err(ResolutionError::TransportFailure { resource, source }),
		};

		parse_object(&body).map_err(|source| ResolutionError::MalformedResponse { resource, source })
	}
}
impl<C> Debug for ProfileResolver<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProfileResolver")
			.field("provider", &self.provider)
			.field("profile_endpoint", self.endpoints.profile())
			.field("scopes", &self.scopes)
			.finish()
	}
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, BodyParseError> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let object: Map<String, Value> = serde_path_to_error::deserialize(&mut deserializer)?;

	deserializer.end().map_err(BodyParseError::TrailingInput)?;

	Ok(object)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parse_object_rejects_trailing_input_and_non_objects() {
		let object = parse_object(b" {\"id\":\"42\"} \n").expect("Padded object should parse.");

		assert_eq!(object.get("id"), Some(&Value::String("42".into())));
		assert!(matches!(
			parse_object(b"{\"id\":\"42\"} <html>oops</html>"),
			Err(BodyParseError::TrailingInput(_))
		));
		assert!(matches!(parse_object(b"[\"x@y\"]"), Err(BodyParseError::Json(_))));
		assert!(matches!(parse_object(b"null"), Err(BodyParseError::Json(_))));
	}

	#[test]
	fn email_resource_accepts_null_and_rejects_other_types() {
		let object = |value: Value| match value {
			Value::Object(map) => map,
			other => panic!("Fixture must be a JSON object, got {other}."),
		};

		assert_eq!(
			EmailResource::from_object(object(serde_json::json!({ "email": null })))
				.expect("Null email should parse.")
				.email,
			None
		);
		assert_eq!(
			EmailResource::from_object(object(serde_json::json!({})))
				.expect("Missing email should parse.")
				.email,
			None
		);
		assert!(EmailResource::from_object(object(serde_json::json!({ "email": ["x@y"] }))).is_err());
	}
}
