//! Scope lists, redacted secrets, and token-exchange results.

pub mod grant;
pub mod scope;
pub mod secret;

pub use grant::*;
pub use scope::*;
pub use secret::*;
