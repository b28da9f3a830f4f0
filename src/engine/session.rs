//! Authorization sessions: CSRF state, optional PKCE pair, and the rendered authorize URL.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::ScopeList};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_LEN: usize = 64;

/// PKCE challenge methods LITauth accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// `S256`: base64url(SHA-256(verifier)).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Wire value of `code_challenge_method`.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Authorization handshake metadata returned by
/// [`OAuth2Engine::start_session`](crate::engine::OAuth2Engine::start_session).
///
/// Callers persist the session (typically in the user's server-side session) until the
/// provider redirects back, then hand it to the callback handler.
#[derive(Clone)]
pub struct AuthorizationSession {
	/// Scopes requested in this session.
	pub scope: ScopeList,
	/// Random `state` the callback must echo back.
	pub state: String,
	/// Callback URL sent as `redirect_uri`.
	pub redirect_uri: Url,
	/// Fully-formed authorize URL that callers should send end-users to.
	pub authorize_url: Url,
	pkce: Option<PkcePair>,
}
impl AuthorizationSession {
	/// PKCE code challenge, when PKCE is enabled.
	pub fn code_challenge(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pair| pair.challenge.as_str())
	}

	/// PKCE challenge method, when PKCE is enabled.
	pub fn code_challenge_method(&self) -> Option<PkceCodeChallengeMethod> {
		self.pkce.as_ref().map(|pair| pair.method)
	}

	/// Returns `true` when `returned_state` matches the state issued for this session.
	pub fn state_matches(&self, returned_state: &str) -> bool {
		returned_state == self.state
	}

	pub(crate) fn pkce_verifier(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pair| pair.verifier.as_str())
	}
}
impl Debug for AuthorizationSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationSession")
			.field("scope", &self.scope)
			.field("state", &self.state)
			.field("redirect_uri", &self.redirect_uri)
			.field("authorize_url", &self.authorize_url)
			.field("code_challenge", &self.code_challenge())
			.finish()
	}
}

#[derive(Clone)]
struct PkcePair {
	verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	fn generate() -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_pkce_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}
}

pub(crate) struct AuthorizeRequest<'a> {
	pub(crate) authorization_endpoint: &'a Url,
	pub(crate) client_id: &'a str,
	pub(crate) redirect_uri: &'a Url,
	pub(crate) scope_delimiter: &'a str,
	pub(crate) pkce: bool,
	pub(crate) extra_params: &'a BTreeMap<String, String>,
}

pub(crate) fn build_session(request: &AuthorizeRequest, scope: ScopeList) -> AuthorizationSession {
	let state = random_string(STATE_LEN);
	let pkce = request.pkce.then(PkcePair::generate);
	let authorize_url = build_authorize_url(request, &scope, &state, pkce.as_ref());

	AuthorizationSession {
		scope,
		state,
		redirect_uri: request.redirect_uri.clone(),
		authorize_url,
		pkce,
	}
}

fn build_authorize_url(
	request: &AuthorizeRequest,
	scope: &ScopeList,
	state: &str,
	pkce: Option<&PkcePair>,
) -> Url {
	let mut url = request.authorization_endpoint.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", request.client_id);
	pairs.append_pair("redirect_uri", request.redirect_uri.as_str());

	if let Some(scope_value) = scope.join(request.scope_delimiter) {
		pairs.append_pair("scope", &scope_value);
	}

	pairs.append_pair("state", state);

	if let Some(pkce) = pkce {
		pairs.append_pair("code_challenge", &pkce.challenge);
		pairs.append_pair("code_challenge_method", pkce.method.as_str());
	}
	for (key, value) in request.extra_params {
		pairs.append_pair(key, value);
	}

	drop(pairs);

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();

	hasher.update(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(hasher.finalize())
}
