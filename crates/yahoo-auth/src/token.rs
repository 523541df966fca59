//! Authorization code exchange
//!
//! POSTs the code to the token endpoint with HTTP Basic client
//! authentication and decides, once, whether the JSON reply granted a token
//! or carried an error payload. Callers only ever see `TokenGrant`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::Secret;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Registered application credentials. Loaded once at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub redirect_uri: String,
}

/// Outcome of a token exchange that reached the endpoint and returned JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenGrant {
    Granted { access_token: String },
    /// The endpoint answered with an error (or no token); payload kept verbatim.
    Rejected { payload: Value },
}

impl TokenGrant {
    /// Classify a parsed token endpoint reply.
    ///
    /// An `error` member wins over `access_token`. A reply with neither is
    /// treated as a rejection so the caller never stores a missing token.
    pub fn from_payload(payload: Value) -> Self {
        let has_error = payload.get("error").is_some_and(|e| !e.is_null());
        if !has_error {
            if let Some(token) = payload.get("access_token").and_then(Value::as_str) {
                if !token.is_empty() {
                    return TokenGrant::Granted {
                        access_token: token.to_owned(),
                    };
                }
            }
        }
        TokenGrant::Rejected { payload }
    }
}

/// `Authorization` header value: `Basic base64(client_id:client_secret)`.
pub fn basic_auth_header(credentials: &Credentials) -> String {
    let raw = format!(
        "{}:{}",
        credentials.client_id,
        credentials.client_secret.expose()
    );
    format!("Basic {}", STANDARD.encode(raw))
}

/// Exchange an authorization code for an access token.
///
/// The body is parsed as JSON regardless of HTTP status: Yahoo reports
/// `invalid_grant` and friends as a 4xx with a JSON error object, which
/// becomes `TokenGrant::Rejected`. Transport failures and non-JSON bodies
/// are `Err`.
#[instrument(skip_all, fields(token_url = %token_url))]
pub async fn exchange_code(
    client: &reqwest::Client,
    token_url: &str,
    credentials: &Credentials,
    code: &str,
) -> Result<TokenGrant> {
    let response = client
        .post(token_url)
        .header(reqwest::header::AUTHORIZATION, basic_auth_header(credentials))
        .form(&[
            ("grant_type", "authorization_code"),
            ("redirect_uri", credentials.redirect_uri.as_str()),
            ("code", code),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Http(format!("reading token response failed: {e}")))?;
    debug!(%status, bytes = body.len(), "token endpoint replied");

    let payload: Value = serde_json::from_str(&body)
        .map_err(|e| Error::InvalidResponse(format!("{status}: {e}")))?;

    Ok(TokenGrant::from_payload(payload))
}
