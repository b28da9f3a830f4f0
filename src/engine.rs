//! Generic OAuth 2.0 authorization-code engine built on the `oauth2` crate.
//!
//! The engine knows nothing about LITauth: it renders authorize URLs, exchanges codes,
//! and performs authenticated `GET` requests. Provider knowledge lives in
//! [`LitauthStrategy`](crate::strategy::LitauthStrategy), which owns an engine instead of
//! extending one.

pub mod session;

pub use oauth2;
pub use session::*;

// crates.io
use oauth2::{
	AsyncHttpClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet,
	EndpointSet, HttpClientError, PkceCodeVerifier, RedirectUrl, RequestTokenError,
	TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{ScopeList, TokenGrant, TokenSecret},
	config::StrategyConfig,
	error::TransportError,
	http::{ApiHttpClient, ResponseMetadata, ResponseMetadataSlot},
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeTokenResponse = oauth2::basic::BasicTokenResponse;

/// How the access token travels on authenticated `GET` requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPlacement {
	/// `access_token` query parameter.
	#[default]
	QueryParameter,
	/// `Authorization: Bearer <token>` header.
	AuthorizationHeader,
}

/// Authorization-code engine bound to one client registration.
pub struct OAuth2Engine<C>
where
	C: ?Sized + ApiHttpClient,
{
	client_id: String,
	client_secret: TokenSecret,
	authorization_endpoint: Url,
	token_endpoint: Url,
	redirect_uri: Url,
	scope_delimiter: String,
	pkce: bool,
	token_placement: TokenPlacement,
	http_client: Arc<C>,
}
impl<C> OAuth2Engine<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates an engine for the client registration described by `config`.
	pub fn new(config: &StrategyConfig, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			client_id: config.client_id.clone(),
			client_secret: config.client_secret.clone(),
			authorization_endpoint: config.endpoints.authorization().clone(),
			token_endpoint: config.endpoints.token().clone(),
			redirect_uri: config.callback_url.clone(),
			scope_delimiter: config.scope_delimiter.clone(),
			pkce: config.pkce,
			token_placement: TokenPlacement::default(),
			http_client: http_client.into(),
		}
	}

	/// Chooses between header and query-parameter token transmission for `GET` requests.
	pub fn use_authorization_header_for_get(mut self, enabled: bool) -> Self {
		self.token_placement = if enabled {
			TokenPlacement::AuthorizationHeader
		} else {
			TokenPlacement::QueryParameter
		};

		self
	}

	/// Current token placement for `GET` requests.
	pub fn token_placement(&self) -> TokenPlacement {
		self.token_placement
	}

	/// Shared HTTP client.
	pub fn http_client(&self) -> &Arc<C> {
		&self.http_client
	}

	/// Starts an authorization session for `scope`, appending `extra_params` to the URL.
	pub fn start_session(
		&self,
		scope: &ScopeList,
		extra_params: &BTreeMap<String, String>,
	) -> AuthorizationSession {
		session::build_session(
			&session::AuthorizeRequest {
				authorization_endpoint: &self.authorization_endpoint,
				client_id: &self.client_id,
				redirect_uri: &self.redirect_uri,
				scope_delimiter: &self.scope_delimiter,
				pkce: self.pkce,
				extra_params,
			},
			scope.clone(),
		)
	}

	/// Exchanges an authorization code for tokens.
	pub async fn exchange_code(
		&self,
		session: &AuthorizationSession,
		code: &str,
	) -> Result<TokenGrant> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let oauth_client = self.oauth_client();
		let mut request = oauth_client.exchange_code(AuthorizationCode::new(code.to_owned()));

		if let Some(verifier) = session.pkce_verifier() {
			request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_owned()));
		}

		let response = request
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;

		Ok(map_token_response(response))
	}

	/// Performs an authenticated `GET`, returning the body of a 2xx response.
	///
	/// Any non-2xx status is reported as [`TransportError::UnexpectedStatus`].
	pub async fn get(&self, url: &Url, token: &TokenSecret) -> Result<Vec<u8>, TransportError> {
		let mut target = url.clone();
		let mut builder =
			Request::builder().method(Method::GET).header(ACCEPT, "application/json");

		match self.token_placement {
			TokenPlacement::AuthorizationHeader => {
				builder = builder.header(AUTHORIZATION, token.bearer());
			},
			TokenPlacement::QueryParameter => {
				target.query_pairs_mut().append_pair("access_token", token.expose());
			},
		}

		let request = builder.uri(target.as_str()).body(Vec::new())?;
		let handle = self.http_client.with_metadata(ResponseMetadataSlot::default());
		let response = handle.call(request).await?;
		let status = response.status();

		if !status.is_success() {
			return Err(TransportError::unexpected_status(status.as_u16(), response.body()));
		}

		Ok(response.into_body())
	}

	fn oauth_client(&self) -> ConfiguredBasicClient {
		BasicClient::new(ClientId::new(self.client_id.clone()))
			.set_client_secret(ClientSecret::new(self.client_secret.expose().to_owned()))
			.set_auth_uri(AuthUrl::from_url(self.authorization_endpoint.clone()))
			.set_token_uri(TokenUrl::from_url(self.token_endpoint.clone()))
			.set_redirect_uri(RedirectUrl::from_url(self.redirect_uri.clone()))
	}
}
impl<C> Debug for OAuth2Engine<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Engine")
			.field("client_id", &self.client_id)
			.field("authorization_endpoint", &self.authorization_endpoint)
			.field("token_endpoint", &self.token_endpoint)
			.field("redirect_uri", &self.redirect_uri)
			.field("token_placement", &self.token_placement)
			.finish()
	}
}

fn map_token_response(response: FacadeTokenResponse) -> TokenGrant {
	TokenGrant {
		access_token: TokenSecret::new(response.access_token().secret().to_owned()),
		refresh_token: response
			.refresh_token()
			.map(|token| TokenSecret::new(token.secret().to_owned())),
		expires_in: response.expires_in().and_then(|lifetime| Duration::try_from(lifetime).ok()),
		scopes: response
			.scopes()
			.map(|scopes| scopes.iter().map(|scope| scope.to_string()).collect()),
	}
}

fn map_request_error<E>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, status),
		RequestTokenError::Request(error) => TransportError::from(error).into(),
		RequestTokenError::Parse(source, _body) => Error::TokenResponseParse { source, status },
		RequestTokenError::Other(message) => Error::TokenEndpoint { message, status },
	}
}

fn map_server_response_error(response: BasicErrorResponse, status: Option<u16>) -> Error {
	let code = response.error().as_ref().to_owned();
	let message = match response.error_description() {
		Some(description) => format!("{code}: {description}"),
		None => code.clone(),
	};

	if code.eq_ignore_ascii_case("invalid_grant") || code.eq_ignore_ascii_case("access_denied") {
		Error::InvalidGrant { reason: message }
	} else if code.eq_ignore_ascii_case("invalid_client")
		|| code.eq_ignore_ascii_case("unauthorized_client")
	{
		Error::InvalidClient { reason: message }
	} else {
		Error::TokenEndpoint { message, status }
	}
}
