//! Yahoo OAuth and Fantasy API endpoints
//!
//! Defaults only. The relay config can override each URL, which is how the
//! tests point the flow at a local mock upstream.

/// Browser-facing authorization endpoint
pub const AUTHORIZE_ENDPOINT: &str = "https://api.login.yahoo.com/oauth2/request_auth";

/// Server-to-server token endpoint for code exchange
pub const TOKEN_ENDPOINT: &str = "https://api.login.yahoo.com/oauth2/get_token";

/// Base URL of the Fantasy Sports v2 resource API
pub const FANTASY_API_BASE: &str = "https://fantasysports.yahooapis.com/fantasy/v2";

/// Login page language requested in the authorization URL
pub const AUTH_LANGUAGE: &str = "en-us";
