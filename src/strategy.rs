//! LITauth identity strategy.
//!
//! [`LitauthStrategy`] composes the generic [`OAuth2Engine`] with a [`ProfileResolver`] and an
//! application-supplied [`Verify`] callback. A login runs in two requests:
//!
//! 1. [`LitauthStrategy::start_authorization`] renders the provider authorize URL and returns an
//!    [`AuthorizationSession`] the application keeps until the provider redirects back.
//! 2. [`LitauthStrategy::authenticate`] validates the callback, exchanges the code, resolves the
//!    profile, and asks [`Verify`] to map it onto an application user.

// self
use crate::{
	_prelude::*,
	auth::{ScopeList, TokenGrant, TokenSecret},
	config::StrategyConfig,
	engine::{AuthorizationSession, OAuth2Engine},
	error::{BoxError, ResolutionError},
	http::ApiHttpClient,
	obs::{self, Outcome, Stage, StageSpan},
	profile::{Profile, ProfileResolver},
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, http::ReqwestHttpClient};

/// Identity name of the LITauth strategy.
pub const STRATEGY_NAME: &str = "litauth";

/// Future returned by [`Verify::verify`].
pub type VerifyFuture<U> = Pin<Box<dyn Future<Output = Result<Option<U>, BoxError>> + Send>>;

/// Future returned by [`IdentityStrategy::authenticate`].
pub type AuthFuture<'a, U> = Pin<Box<dyn Future<Output = Result<AuthOutcome<U>>> + 'a + Send>>;

/// Application hook that maps a resolved identity onto an application user.
///
/// Return `Ok(None)` to reject the login without raising an error.
pub trait Verify
where
	Self: 'static + Send + Sync,
{
	/// Application user produced by a successful login.
	type User: 'static + Send;

	/// Maps `grant` and `profile` onto an application user.
	fn verify(&self, grant: TokenGrant, profile: Profile) -> VerifyFuture<Self::User>;
}
impl<F, Fut, U> Verify for F
where
	F: 'static + Send + Sync + Fn(TokenGrant, Profile) -> Fut,
	Fut: 'static + Send + Future<Output = Result<Option<U>, BoxError>>,
	U: 'static + Send,
{
	type User = U;

	fn verify(&self, grant: TokenGrant, profile: Profile) -> VerifyFuture<Self::User> {
		Box::pin(self(grant, profile))
	}
}

/// Request-scoped options for starting an authorization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorizationOptions {
	/// Overrides the configured scopes for this request.
	pub scope: Option<ScopeList>,
}
impl AuthorizationOptions {
	/// Requests `scope` instead of the configured scopes.
	pub fn with_scope(mut self, scope: ScopeList) -> Self {
		self.scope = Some(scope);

		self
	}
}

/// Query parameters delivered to the redirect URI.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackParams {
	/// Authorization code.
	#[serde(default)]
	pub code: Option<String>,
	/// Returned CSRF state.
	#[serde(default)]
	pub state: Option<String>,
	/// OAuth error code, when the user or provider denied the request.
	#[serde(default)]
	pub error: Option<String>,
	/// Human-readable error description accompanying `error`.
	#[serde(default)]
	pub error_description: Option<String>,
}

/// Result of a completed callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome<U> {
	/// Login succeeded and produced an application user.
	Success(U),
	/// Login ended without a user.
	Failure(FailureReason),
}
impl<U> AuthOutcome<U> {
	/// Returns the user on success.
	pub fn user(self) -> Option<U> {
		match self {
			Self::Success(user) => Some(user),
			Self::Failure(_) => None,
		}
	}
}

/// Why a callback produced no user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
	/// The provider redirected back with an OAuth error.
	ProviderDenied {
		/// OAuth error code.
		error: String,
		/// Optional description.
		description: Option<String>,
	},
	/// The returned state did not match the session.
	StateMismatch,
	/// The callback carried no authorization code.
	MissingCode,
	/// [`Verify`] declined the identity.
	Rejected,
}
impl Display for FailureReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::ProviderDenied { error, description: Some(description) } =>
				write!(f, "Provider denied the request: {error} ({description})."),
			Self::ProviderDenied { error, description: None } =>
				write!(f, "Provider denied the request: {error}."),
			Self::StateMismatch => f.write_str("Returned state does not match the session."),
			Self::MissingCode => f.write_str("Callback is missing the authorization code."),
			Self::Rejected => f.write_str("Verify callback rejected the identity."),
		}
	}
}

/// Object-safe view of an identity strategy.
///
/// [`StrategyRegistry`](crate::registry::StrategyRegistry) stores strategies behind this trait.
pub trait IdentityStrategy
where
	Self: Send + Sync,
{
	/// Application user produced by a successful login.
	type User;

	/// Identity name the strategy is registered under.
	fn name(&self) -> &str;

	/// Starts an authorization, returning the session to keep until the callback.
	fn start_authorization(&self, options: &AuthorizationOptions) -> AuthorizationSession;

	/// Completes an authorization from the callback parameters.
	fn authenticate<'a>(
		&'a self,
		session: &'a AuthorizationSession,
		params: CallbackParams,
	) -> AuthFuture<'a, Self::User>;
}

/// Identity strategy for the LITauth provider.
pub struct LitauthStrategy<C, V>
where
	C: ?Sized + ApiHttpClient,
	V: Verify,
{
	config: StrategyConfig,
	engine: Arc<OAuth2Engine<C>>,
	resolver: ProfileResolver<C>,
	verify: V,
}
impl<C, V> LitauthStrategy<C, V>
where
	C: ?Sized + ApiHttpClient,
	V: Verify,
{
	/// Identity name of the strategy.
	pub const NAME: &'static str = STRATEGY_NAME;

	/// Creates a strategy that issues requests through `http_client`.
	///
	/// Profile requests carry the access token in the `Authorization` header.
	pub fn with_http_client(
		config: StrategyConfig,
		verify: V,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let engine = Arc::new(
			OAuth2Engine::new(&config, http_client).use_authorization_header_for_get(true),
		);
		let resolver = ProfileResolver::new(Self::NAME, Arc::clone(&engine), &config);

		Self { config, engine, resolver, verify }
	}

	/// Identity name of the strategy.
	pub fn name(&self) -> &'static str {
		Self::NAME
	}

	/// Resolved configuration.
	pub fn config(&self) -> &StrategyConfig {
		&self.config
	}

	/// Underlying authorization-code engine.
	pub fn engine(&self) -> &OAuth2Engine<C> {
		&self.engine
	}

	/// Provider-specific parameters merged into the authorize URL.
	///
	/// LITauth defines none today; the hook exists for flags such as `prompt`.
	pub fn authorization_params(
		&self,
		_options: &AuthorizationOptions,
	) -> BTreeMap<String, String> {
		BTreeMap::new()
	}

	/// Starts an authorization for the configured scopes, or the override in `options`.
	pub fn start_authorization(&self, options: &AuthorizationOptions) -> AuthorizationSession {
		StageSpan::new(Stage::Authorize, Self::NAME).in_scope(|| {
			obs::record_stage_outcome(Stage::Authorize, Outcome::Attempt);

			let scope = options.scope.as_ref().unwrap_or(&self.config.scopes);
			let session = self.engine.start_session(scope, &self.authorization_params(options));

			obs::record_stage_outcome(Stage::Authorize, Outcome::Success);

			session
		})
	}

	/// Resolves `access_token` into a [`Profile`].
	pub async fn resolve_profile(
		&self,
		access_token: &TokenSecret,
	) -> Result<Profile, ResolutionError> {
		self.resolver.resolve(access_token).await
	}

	/// Resolves `access_token` and hands the result to `done` exactly once.
	pub async fn resolve_profile_with<F>(&self, access_token: &TokenSecret, done: F)
	where
		F: FnOnce(Result<Profile, ResolutionError>),
	{
		self.resolver.resolve_with(access_token, done).await;
	}

	/// Completes an authorization from the callback parameters.
	///
	/// Provider denials, state mismatches, missing codes, and verify rejections are reported as
	/// [`AuthOutcome::Failure`]; token exchange, profile resolution, and verify errors are
	/// returned as [`Error`].
	pub async fn authenticate(
		&self,
		session: &AuthorizationSession,
		params: CallbackParams,
	) -> Result<AuthOutcome<V::User>> {
		if let Some(error) = params.error {
			return Ok(AuthOutcome::Failure(FailureReason::ProviderDenied {
				error,
				description: params.error_description,
			}));
		}
		if !params.state.as_deref().is_some_and(|state| session.state_matches(state)) {
			return Ok(AuthOutcome::Failure(FailureReason::StateMismatch));
		}

		let Some(code) = params.code.filter(|code| !code.is_empty()) else {
			return Ok(AuthOutcome::Failure(FailureReason::MissingCode));
		};
		let grant =
			obs::observe(Stage::Exchange, Self::NAME, self.engine.exchange_code(session, &code))
				.await?;
		let profile = self.resolve_profile(&grant.access_token).await?;
		let user = obs::observe(Stage::Verify, Self::NAME, async {
			self.verify.verify(grant, profile).await.map_err(|source| Error::Verify { source })
		})
		.await?;

		Ok(match user {
			Some(user) => AuthOutcome::Success(user),
			None => AuthOutcome::Failure(FailureReason::Rejected),
		})
	}
}
#[cfg(feature = "reqwest")]
impl<V> LitauthStrategy<ReqwestHttpClient, V>
where
	V: Verify,
{
	/// Creates a strategy backed by a reqwest client that does not follow redirects.
	pub fn new(config: StrategyConfig, verify: V) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self::with_http_client(config, verify, ReqwestHttpClient::with_client(client)))
	}
}
impl<C, V> IdentityStrategy for LitauthStrategy<C, V>
where
	C: ?Sized + ApiHttpClient,
	V: Verify,
{
	type User = V::User;

	fn name(&self) -> &str {
		Self::NAME
	}

	fn start_authorization(&self, options: &AuthorizationOptions) -> AuthorizationSession {
		LitauthStrategy::start_authorization(self, options)
	}

	fn authenticate<'a>(
		&'a self,
		session: &'a AuthorizationSession,
		params: CallbackParams,
	) -> AuthFuture<'a, Self::User> {
		Box::pin(LitauthStrategy::authenticate(self, session, params))
	}
}
impl<C, V> Debug for LitauthStrategy<C, V>
where
	C: ?Sized + ApiHttpClient,
	V: Verify,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LitauthStrategy")
			.field("config", &self.config)
			.field("engine", &self.engine)
			.finish()
	}
}
