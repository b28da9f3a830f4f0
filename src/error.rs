//! Strategy-level error types shared across configuration, token exchange, and profile
//! resolution.

// self
use crate::_prelude::*;

/// Strategy-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed, thread-safe error used for opaque upstream causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical strategy error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Profile resolution failed after a successful token exchange.
	#[error(transparent)]
	Resolution(#[from] ResolutionError),
	/// Transport failure while calling the token endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Token endpoint answered with an unexpected response.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	TokenEndpoint {
		/// Provider- or strategy-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Provider rejected the authorization code.
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider- or strategy-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider- or strategy-supplied reason string.
		reason: String,
	},
	/// The application's verify callback failed.
	#[error("Verify callback failed.")]
	Verify {
		/// Error returned by the verify callback.
		#[source]
		source: BoxError,
	},
}

/// Configuration and validation failures raised while building a strategy.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required configuration field was not supplied.
	#[error("Configuration is missing the required `{field}` field.")]
	MissingField {
		/// Name of the missing field.
		field: &'static str,
	},
	/// The scope list is empty.
	#[error("At least one scope must be requested.")]
	EmptyScopes,
	/// Requested scopes cannot be validated.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// An endpoint URL cannot be used by the OAuth 2.0 engine.
	#[error("The {endpoint} endpoint is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure, when the URL did not parse.
		#[source]
		source: Option<url::ParseError>,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Provider resource addressed during profile resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileResource {
	/// Primary user resource.
	UserProfile,
	/// Scope-gated resource addressed by scope name.
	Scope(String),
}
impl Display for ProfileResource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::UserProfile => f.write_str("user profile"),
			Self::Scope(scope) => write!(f, "user's {scope}"),
		}
	}
}

/// Failures surfaced while turning an access token into a [`Profile`](crate::profile::Profile).
///
/// Both variants are terminal for the resolution that raised them.
#[derive(Debug, ThisError)]
pub enum ResolutionError {
	/// The HTTP call for `resource` did not complete successfully.
	#[error("Failed to fetch {resource}.")]
	TransportFailure {
		/// Resource being fetched.
		resource: ProfileResource,
		/// Underlying transport failure.
		#[source]
		source: TransportError,
	},
	/// The HTTP call succeeded but the body was not the expected JSON shape.
	#[error("Failed to parse {resource}.")]
	MalformedResponse {
		/// Resource whose body failed to parse.
		resource: ProfileResource,
		/// Parsing failure.
		#[source]
		source: BodyParseError,
	},
}
impl ResolutionError {
	/// Resource that triggered the failure.
	pub fn resource(&self) -> &ProfileResource {
		match self {
			Self::TransportFailure { resource, .. } | Self::MalformedResponse { resource, .. } =>
				resource,
		}
	}

	/// Human-readable stage label, e.g. `fetch user profile`.
	pub fn stage(&self) -> String {
		format!("fetch {}", self.resource())
	}

	/// Returns `true` for [`ResolutionError::TransportFailure`].
	pub fn is_transport_failure(&self) -> bool {
		matches!(self, Self::TransportFailure { .. })
	}

	/// Returns `true` for [`ResolutionError::MalformedResponse`].
	pub fn is_malformed_response(&self) -> bool {
		matches!(self, Self::MalformedResponse { .. })
	}
}

/// Reasons a provider API body was rejected.
#[derive(Debug, ThisError)]
pub enum BodyParseError {
	/// The body is not JSON of the expected shape.
	#[error("Response body does not match the expected JSON shape at `{}`.", .0.path())]
	Json(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// A complete JSON value was followed by more input.
	#[error("Response body has trailing input after the JSON value.")]
	TrailingInput(#[source] serde_json::Error),
}

/// Transport-level failures (network, IO, non-success HTTP status).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// Outbound request could not be assembled.
	#[error("HTTP request could not be built.")]
	Request(#[from] oauth2::http::Error),
	/// Provider answered with a non-success HTTP status.
	#[error("Provider responded with HTTP {status}: {body_preview}")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body_preview: String,
	},
	/// HTTP client failure without a more specific classification.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Message reported by the HTTP client.
		message: String,
	},
}
impl TransportError {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Builds an [`TransportError::UnexpectedStatus`] with a bounded body preview.
	pub fn unexpected_status(status: u16, body: &[u8]) -> Self {
		let body = String::from_utf8_lossy(body);
		let body_preview = if body.chars().count() <= Self::BODY_PREVIEW_LIMIT {
			body.into_owned()
		} else {
			let mut buf = body.chars().take(Self::BODY_PREVIEW_LIMIT).collect::<String>();

			buf.push('…');

			buf
		};

		Self::UnexpectedStatus { status, body_preview }
	}

	/// Returns the HTTP status for [`TransportError::UnexpectedStatus`].
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::UnexpectedStatus { status, .. } => Some(*status),
			_ => None,
		}
	}
}
impl<E> From<oauth2::HttpClientError<E>> for TransportError
where
	E: 'static + Send + Sync + std::error::Error,
{
	fn from(e: oauth2::HttpClientError<E>) -> Self {
		match e {
			oauth2::HttpClientError::Reqwest(inner) => Self::Network { source: inner },
			oauth2::HttpClientError::Http(inner) => Self::Request(inner),
			oauth2::HttpClientError::Io(inner) => Self::Io(inner),
			oauth2::HttpClientError::Other(message) => Self::Other { message },
			_ => Self::Other { message: "unrecognized HTTP client failure".into() },
		}
	}
}
