//! Session-based LITauth login demo.
//!
//! `/` starts a login, `/callback` completes it, `/info` shows the stored profile, and
//! `/logout` clears the session. Sessions live in memory and are keyed by a random cookie.
//!
//! ```sh
//! RUST_LOG=info,litauth=debug cargo run --example server --features tracing
//! ```

// std
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
// crates.io
use axum::{
	Json, Router,
	extract::{Query, State},
	http::{
		HeaderMap, StatusCode,
		header::{COOKIE, SET_COOKIE},
	},
	response::{IntoResponse, Redirect, Response},
	routing::get,
};
use clap::Parser;
use color_eyre::Result;
use parking_lot::Mutex;
use rand::{Rng, distr::Alphanumeric};
use tracing_subscriber::EnvFilter;
// self
use litauth::{
	auth::{ScopeList, TokenGrant},
	config::StrategyConfig,
	engine::AuthorizationSession,
	error::BoxError,
	profile::Profile,
	registry::{SharedStrategy, StrategyRegistry},
	strategy::{
		AuthOutcome, AuthorizationOptions, CallbackParams, LitauthStrategy, STRATEGY_NAME,
	},
	url::Url,
};

const SESSION_COOKIE: &str = "litauth_sid";

#[derive(Debug, Parser)]
#[command(about = "Log in with LITauth and inspect the resolved profile.")]
struct Cli {
	/// OAuth client identifier issued by LITauth.
	#[arg(long, env = "LITAUTH_CLIENT_ID", default_value = "123")]
	client_id: String,
	/// OAuth client secret issued by LITauth.
	#[arg(long, env = "LITAUTH_CLIENT_SECRET", default_value = "123", hide_env_values = true)]
	client_secret: String,
	/// Redirect URI registered with LITauth.
	#[arg(long, env = "LITAUTH_CALLBACK_URL", default_value = "http://localhost:5000/callback")]
	callback_url: Url,
	/// Address the demo listens on.
	#[arg(long, env = "LITAUTH_LISTEN", default_value = "127.0.0.1:5000")]
	listen: SocketAddr,
}

#[derive(Default)]
struct Session {
	pending: Option<AuthorizationSession>,
	user: Option<Profile>,
}

#[derive(Clone)]
struct AppState {
	registry: Arc<StrategyRegistry<Profile>>,
	sessions: Arc<Mutex<HashMap<String, Session>>>,
}
impl AppState {
	fn strategy(&self) -> Result<&SharedStrategy<Profile>, StatusCode> {
		self.registry.get(STRATEGY_NAME).ok_or(StatusCode::INTERNAL_SERVER_ERROR)
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let cli = Cli::parse();
	let config = StrategyConfig::builder()
		.client_id(cli.client_id)
		.client_secret(cli.client_secret)
		.callback_url(cli.callback_url)
		.scope(ScopeList::new(["identify", "email"])?)
		.build()?;
	let strategy = LitauthStrategy::new(config, keep_profile)?;
	let state = AppState {
		registry: Arc::new(StrategyRegistry::new().register(strategy)),
		sessions: Default::default(),
	};
	let app = Router::new()
		.route("/", get(login))
		.route("/callback", get(callback))
		.route("/logout", get(logout))
		.route("/info", get(info))
		.with_state(state);
	let listener = tokio::net::TcpListener::bind(cli.listen).await?;

	tracing::info!(address = %cli.listen, "Listening.");

	axum::serve(listener, app).await?;

	Ok(())
}

async fn keep_profile(_grant: TokenGrant, profile: Profile) -> Result<Option<Profile>, BoxError> {
	Ok(Some(profile))
}

async fn login(State(state): State<AppState>, headers: HeaderMap) -> Response {
	let strategy = match state.strategy() {
		Ok(strategy) => strategy,
		Err(status) => return status.into_response(),
	};
	let pending = strategy.start_authorization(&AuthorizationOptions::default());
	let authorize_url = pending.authorize_url.to_string();
	let sid = session_id(&headers).unwrap_or_else(new_session_id);

	state.sessions.lock().entry(sid.clone()).or_default().pending = Some(pending);

	(
		[(SET_COOKIE, format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly; SameSite=Lax"))],
		Redirect::to(&authorize_url),
	)
		.into_response()
}

async fn callback(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(params): Query<CallbackParams>,
) -> Response {
	let strategy = match state.strategy() {
		Ok(strategy) => strategy,
		Err(status) => return status.into_response(),
	};
	let Some(sid) = session_id(&headers) else {
		tracing::warn!("Callback arrived without a session cookie.");

		return Redirect::to("/").into_response();
	};
	let Some(pending) =
		state.sessions.lock().get_mut(&sid).and_then(|session| session.pending.take())
	else {
		tracing::warn!("Callback arrived without a pending authorization.");

		return Redirect::to("/").into_response();
	};

	match strategy.authenticate(&pending, params).await {
		Ok(AuthOutcome::Success(profile)) => {
			tracing::info!(user = ?profile.username(), "Login succeeded.");

			state.sessions.lock().entry(sid).or_default().user = Some(profile);

			Redirect::to("/info").into_response()
		},
		Ok(AuthOutcome::Failure(reason)) => {
			tracing::warn!(%reason, "Login failed.");

			Redirect::to("/").into_response()
		},
		Err(e) => {
			tracing::error!(error = %e, "Login errored.");

			Redirect::to("/").into_response()
		},
	}
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
	if let Some(sid) = session_id(&headers) {
		state.sessions.lock().remove(&sid);
	}

	(
		[(SET_COOKIE, format!("{SESSION_COOKIE}=; Path=/; Max-Age=0"))],
		Redirect::to("/"),
	)
		.into_response()
}

async fn info(State(state): State<AppState>, headers: HeaderMap) -> Response {
	let user = session_id(&headers)
		.and_then(|sid| state.sessions.lock().get(&sid).and_then(|session| session.user.clone()));

	match user {
		Some(profile) => Json(profile).into_response(),
		None => "not logged in :(".into_response(),
	}
}

fn session_id(headers: &HeaderMap) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.filter_map(|pair| pair.trim().split_once('='))
		.find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
		.map(|(_, value)| value.to_owned())
}

fn new_session_id() -> String {
	rand::rng().sample_iter(Alphanumeric).take(32).map(char::from).collect()
}
