//! Yahoo OAuth2 authorization-code library
//!
//! Single-user authorization-code flow for the Yahoo Fantasy Sports API.
//! Standalone from the relay binary so it can be exercised against a mock
//! token endpoint.
//!
//! Flow:
//! 1. Browser is redirected to `authorize::build_authorization_url()`
//! 2. Yahoo redirects back with `?code=...`
//! 3. Relay calls `token::exchange_code()` and gets a `TokenGrant`
//! 4. A granted access token is written to the shared `TokenStore`
//! 5. Resource calls read the token back as a Bearer credential

pub mod authorize;
pub mod constants;
pub mod error;
pub mod store;
pub mod token;

pub use authorize::build_authorization_url;
pub use constants::*;
pub use error::{Error, Result};
pub use store::TokenStore;
pub use token::{Credentials, TokenGrant, basic_auth_header, exchange_code};
