//! Normalized user profiles and the resolver that builds them from provider responses.

pub mod resolver;

pub use resolver::*;

// crates.io
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Keys owned by the strategy; provider-supplied values under these names are replaced.
const RESERVED_KEYS: [&str; 3] = ["provider", "accessToken", "fetchedAt"];
/// Member holding the user's email address.
const EMAIL_KEY: &str = "email";

/// Normalized identity returned to the application.
///
/// Serializes as the provider's user object with `provider`, `accessToken`, and `fetchedAt`
/// merged in. The email address lives in [`Profile::fields`] under `email`, so whatever the
/// provider sent there survives untouched until the email resource supplies a string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
	/// Identity name of the strategy that produced the profile.
	pub provider: String,
	/// Access token used to fetch the profile.
	pub access_token: TokenSecret,
	/// When the profile was resolved.
	#[serde(with = "time::serde::rfc3339")]
	pub fetched_at: OffsetDateTime,
	/// Every other member of the provider's user object, verbatim.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}
impl Profile {
	/// Builds a profile from the primary user object.
	pub fn from_user_object(
		provider: impl Into<String>,
		access_token: TokenSecret,
		mut fields: Map<String, Value>,
	) -> Self {
		for key in RESERVED_KEYS {
			fields.remove(key);
		}

		Self { provider: provider.into(), access_token, fetched_at: OffsetDateTime::now_utc(), fields }
	}

	/// Raw member of the provider's user object.
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.fields.get(name)
	}

	/// Provider user identifier, rendered as a string.
	pub fn id(&self) -> Option<String> {
		match self.field("id")? {
			Value::String(id) => Some(id.clone()),
			Value::Number(id) => Some(id.to_string()),
			_ => None,
		}
	}

	/// Provider username.
	pub fn username(&self) -> Option<&str> {
		self.field("username").and_then(Value::as_str)
	}

	/// Email address, when the `email` member is a string.
	pub fn email(&self) -> Option<&str> {
		self.field(EMAIL_KEY).and_then(Value::as_str)
	}

	/// Replaces the `email` member.
	pub fn set_email(&mut self, email: impl Into<String>) {
		self.fields.insert(EMAIL_KEY.into(), Value::String(email.into()));
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn object(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(map) => map,
			other => panic!("Fixture must be a JSON object, got {other}."),
		}
	}

	#[test]
	fn reserved_keys_from_the_provider_are_replaced() {
		let profile = Profile::from_user_object(
			"litauth",
			TokenSecret::new("tok"),
			object(json!({
				"id": "42",
				"username": "bob",
				"provider": "spoofed",
				"accessToken": "spoofed",
				"email": "primary@example.com"
			})),
		);

		assert_eq!(profile.provider, "litauth");
		assert_eq!(profile.access_token.expose(), "tok");
		assert_eq!(profile.email(), Some("primary@example.com"));
		assert_eq!(profile.id().as_deref(), Some("42"));
		assert_eq!(profile.username(), Some("bob"));
		assert!(profile.field("provider").is_none());
		assert!(profile.field("accessToken").is_none());
	}

	#[test]
	fn serializes_as_flat_camel_case_object() {
		let mut profile = Profile::from_user_object(
			"litauth",
			TokenSecret::new("tok"),
			object(json!({ "id": 42, "username": "bob" })),
		);

		profile.fetched_at = time::macros::datetime!(2024-01-02 03:04:05 UTC);

		let value = serde_json::to_value(&profile).expect("Profile should serialize.");

		assert_eq!(
			value,
			json!({
				"provider": "litauth",
				"accessToken": "tok",
				"fetchedAt": "2024-01-02T03:04:05Z",
				"id": 42,
				"username": "bob"
			})
		);
		assert_eq!(profile.id().as_deref(), Some("42"));

		let restored: Profile = serde_json::from_value(value).expect("Profile should deserialize.");

		assert_eq!(restored, profile);
	}

	#[test]
	fn debug_output_redacts_the_access_token() {
		let profile =
			Profile::from_user_object("litauth", TokenSecret::new("tok-secret"), Map::new());

		assert!(!format!("{profile:?}").contains("tok-secret"));
	}

	#[test]
	fn non_string_email_members_are_kept_verbatim() {
		let mut profile = Profile::from_user_object(
			"litauth",
			TokenSecret::new("tok"),
			object(json!({ "id": "42", "email": null })),
		);

		profile.fetched_at = time::macros::datetime!(2024-01-02 03:04:05 UTC);

		assert_eq!(profile.email(), None);
		assert_eq!(profile.field("email"), Some(&Value::Null));

		let value = serde_json::to_value(&profile).expect("Profile should serialize.");

		assert_eq!(value["email"], Value::Null);

		let restored: Profile = serde_json::from_value(value).expect("Profile should deserialize.");

		assert_eq!(restored, profile);

		let mut profile = Profile::from_user_object(
			"litauth",
			TokenSecret::new("tok"),
			object(json!({ "email": { "primary": "bob@example.com" } })),
		);

		assert_eq!(profile.field("email"), Some(&json!({ "primary": "bob@example.com" })));

		profile.set_email("bob@example.com");

		assert_eq!(profile.email(), Some("bob@example.com"));
	}
}
