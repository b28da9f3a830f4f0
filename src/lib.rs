//! LITauth login for Rust services: an OAuth 2.0 authorization-code strategy that exchanges
//! codes, resolves the user profile, and merges the scoped email resource when requested.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod obs;
pub mod profile;
pub mod registry;
pub mod strategy;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::ScopeList,
		config::{StrategyConfig, StrategyConfigBuilder},
		http::ReqwestHttpClient,
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Config builder pre-filled with the demo registration (`123`/`123`, localhost callback)
	/// and the `identify email` scopes.
	pub fn demo_config_builder() -> StrategyConfigBuilder {
		StrategyConfig::builder()
			.client_id("123")
			.client_secret("123")
			.callback_url(
				Url::parse("http://localhost:5000/callback")
					.expect("Callback fixture should parse."),
			)
			.scope(ScopeList::new(["identify", "email"]).expect("Scope fixture should be valid."))
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))]
use {axum as _, clap as _, color_eyre as _, httpmock as _, tracing_subscriber as _};
