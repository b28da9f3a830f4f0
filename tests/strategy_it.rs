#![cfg(feature = "reqwest")]

// std
use std::collections::HashMap;
// crates.io
use httpmock::prelude::*;
use litauth::{
	auth::{ScopeList, TokenGrant},
	config::StrategyConfig,
	error::{BoxError, Error},
	http::ReqwestHttpClient,
	profile::Profile,
	registry::StrategyRegistry,
	strategy::{
		AuthOutcome, AuthorizationOptions, CallbackParams, FailureReason, IdentityStrategy,
		LitauthStrategy, Verify,
	},
	url::Url,
};

const TOKEN_BODY: &str = "{\"access_token\":\"access-it\",\"refresh_token\":\"refresh-it\",\"token_type\":\"bearer\",\"expires_in\":3600,\"scope\":\"identify email\"}";

#[derive(Clone, Debug, PartialEq, Eq)]
struct User {
	id: String,
	email: Option<String>,
}

fn config(server: &MockServer) -> StrategyConfig {
	let endpoint = |path: &str| {
		Url::parse(&server.url(path)).expect("Mock endpoint should parse successfully.")
	};

	StrategyConfig::builder()
		.client_id("123")
		.client_secret("123")
		.callback_url(
			Url::parse("http://localhost:5000/callback")
				.expect("Callback URL should parse successfully."),
		)
		.scope(ScopeList::new(["identify", "email"]).expect("Scope list should be valid."))
		.authorization_endpoint(endpoint("/oauth/authorize"))
		.token_endpoint(endpoint("/api/oauth2/token"))
		.profile_endpoint(endpoint("/api/user"))
		.build()
		.expect("Strategy config should build against the mock provider.")
}

async fn to_user(grant: TokenGrant, profile: Profile) -> Result<Option<User>, BoxError> {
	assert_eq!(grant.access_token.expose(), profile.access_token.expose());

	Ok(profile.id().map(|id| User { id, email: profile.email().map(ToOwned::to_owned) }))
}

async fn reject_everyone(_grant: TokenGrant, _profile: Profile) -> Result<Option<User>, BoxError> {
	Ok(None)
}

async fn fail_lookup(_grant: TokenGrant, _profile: Profile) -> Result<Option<User>, BoxError> {
	Err("User database is unavailable.".into())
}

fn strategy<V>(server: &MockServer, verify: V) -> LitauthStrategy<ReqwestHttpClient, V>
where
	V: Verify<User = User>,
{
	LitauthStrategy::with_http_client(config(server), verify, ReqwestHttpClient::default())
}

async fn mock_provider_api(server: &MockServer) {
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user").header("authorization", "Bearer access-it");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":\"42\",\"username\":\"bob\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user/email").header("authorization", "Bearer access-it");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"email\":\"bob@example.com\"}");
		})
		.await;
}

#[tokio::test]
async fn authenticate_exchanges_resolves_and_verifies() {
	let server = MockServer::start_async().await;
	let strategy = strategy(&server, to_user);
	let session = strategy.start_authorization(&AuthorizationOptions::default());
	let authorize_pairs: HashMap<_, _> = session.authorize_url.query_pairs().into_owned().collect();

	assert_eq!(session.authorize_url.path(), "/oauth/authorize");
	assert_eq!(authorize_pairs.get("response_type"), Some(&"code".into()));
	assert_eq!(authorize_pairs.get("client_id"), Some(&"123".into()));
	assert_eq!(
		authorize_pairs.get("redirect_uri"),
		Some(&"http://localhost:5000/callback".into())
	);
	assert_eq!(authorize_pairs.get("scope"), Some(&"identify email".into()));
	assert_eq!(session.state.len(), 32);

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/oauth2/token")
				.header("authorization", "Basic MTIzOjEyMw==")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "auth-code");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;

	mock_provider_api(&server).await;

	let outcome = strategy
		.authenticate(
			&session,
			CallbackParams {
				code: Some("auth-code".into()),
				state: Some(session.state.clone()),
				..Default::default()
			},
		)
		.await
		.expect("Callback should complete successfully.");

	token_mock.assert_async().await;

	assert_eq!(
		outcome,
		AuthOutcome::Success(User { id: "42".into(), email: Some("bob@example.com".into()) })
	);
}

#[tokio::test]
async fn verify_rejection_is_a_failure_outcome() {
	let server = MockServer::start_async().await;
	let strategy = strategy(&server, reject_everyone);
	let session = strategy.start_authorization(&AuthorizationOptions::default());

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/oauth2/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	mock_provider_api(&server).await;

	let outcome = strategy
		.authenticate(
			&session,
			CallbackParams {
				code: Some("auth-code".into()),
				state: Some(session.state.clone()),
				..Default::default()
			},
		)
		.await
		.expect("A rejected identity is not an error.");

	assert_eq!(outcome, AuthOutcome::Failure(FailureReason::Rejected));
}

#[tokio::test]
async fn verify_errors_propagate() {
	let server = MockServer::start_async().await;
	let strategy = strategy(&server, fail_lookup);
	let session = strategy.start_authorization(&AuthorizationOptions::default());

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/oauth2/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	mock_provider_api(&server).await;

	let err = strategy
		.authenticate(
			&session,
			CallbackParams {
				code: Some("auth-code".into()),
				state: Some(session.state.clone()),
				..Default::default()
			},
		)
		.await
		.expect_err("Verify failures must surface as errors.");

	assert!(matches!(err, Error::Verify { .. }));
}

#[tokio::test]
async fn invalid_grant_stops_before_profile_resolution() {
	let server = MockServer::start_async().await;
	let strategy = strategy(&server, to_user);
	let session = strategy.start_authorization(&AuthorizationOptions::default());
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/oauth2/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"Code expired.\"}");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user");
			then.status(200).body("{}");
		})
		.await;
	let err = strategy
		.authenticate(
			&session,
			CallbackParams {
				code: Some("stale-code".into()),
				state: Some(session.state.clone()),
				..Default::default()
			},
		)
		.await
		.expect_err("An expired code must fail the exchange.");

	token_mock.assert_async().await;
	profile_mock.assert_calls_async(0).await;

	assert!(matches!(err, Error::InvalidGrant { reason } if reason.contains("Code expired.")));
}

#[tokio::test]
async fn profile_failures_surface_as_resolution_errors() {
	let server = MockServer::start_async().await;
	let strategy = strategy(&server, to_user);
	let session = strategy.start_authorization(&AuthorizationOptions::default());

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/oauth2/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/user");
			then.status(200).body("not json");
		})
		.await;

	let err = strategy
		.authenticate(
			&session,
			CallbackParams {
				code: Some("auth-code".into()),
				state: Some(session.state.clone()),
				..Default::default()
			},
		)
		.await
		.expect_err("A malformed profile must fail the login.");

	assert!(matches!(err, Error::Resolution(ref source) if source.is_malformed_response()));
}

#[tokio::test]
async fn registry_dispatches_by_identity_name() {
	let server = MockServer::start_async().await;
	let registry = StrategyRegistry::new().register(strategy(&server, to_user));
	let litauth = registry.get("litauth").expect("LITauth strategy should be registered.");
	let session = litauth.start_authorization(&AuthorizationOptions::default());
	let outcome = litauth
		.authenticate(
			&session,
			CallbackParams {
				state: Some(session.state.clone()),
				error: Some("access_denied".into()),
				error_description: Some("User cancelled.".into()),
				..Default::default()
			},
		)
		.await
		.expect("Provider denial should not be an error.");

	assert_eq!(registry.names(), vec!["litauth"]);
	assert_eq!(
		outcome,
		AuthOutcome::Failure(FailureReason::ProviderDenied {
			error: "access_denied".into(),
			description: Some("User cancelled.".into()),
		})
	);
}
