//! OAuth handshake endpoints
//!
//! `/auth/start` sends the browser to Yahoo's login page and
//! `/auth/callback` trades the returned code for an access token. The token
//! store is written only after a granted exchange, and the redirect home is
//! issued only after that write has completed.

use std::sync::Arc;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use yahoo_auth::{Credentials, TokenGrant, TokenStore};

use crate::error::ApiError;

/// Shared state for the handshake handlers.
#[derive(Clone)]
pub struct AuthState {
    pub client: reqwest::Client,
    pub credentials: Arc<Credentials>,
    pub token_url: String,
    /// Built once from config; identical for every `/auth/start`
    pub authorization_url: String,
    pub tokens: Arc<TokenStore>,
}

impl AuthState {
    pub fn new(
        client: reqwest::Client,
        credentials: Credentials,
        authorize_url: &str,
        token_url: String,
        tokens: Arc<TokenStore>,
    ) -> yahoo_auth::Result<Self> {
        let authorization_url = yahoo_auth::build_authorization_url(
            authorize_url,
            &credentials.client_id,
            &credentials.redirect_uri,
        )?;
        Ok(Self {
            client,
            credentials: Arc::new(credentials),
            token_url,
            authorization_url,
            tokens,
        })
    }
}

/// Query string Yahoo appends to the redirect URI.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

/// `302 Found` to `location`.
///
/// axum's `Redirect` only offers 303/307/308.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}

/// GET /auth/start
pub fn start_authorization(state: &AuthState) -> Response {
    info!("redirecting to Yahoo authorization");
    found(&state.authorization_url)
}

/// GET /auth/callback?code=...
#[instrument(skip_all, fields(request_id = %request_id))]
pub async fn complete_authorization(
    state: &AuthState,
    params: CallbackParams,
    request_id: &str,
) -> Result<Response, ApiError> {
    let Some(code) = params.code.filter(|c| !c.trim().is_empty()) else {
        warn!("callback without authorization code");
        return Err(ApiError::MissingCode);
    };

    let grant = yahoo_auth::exchange_code(&state.client, &state.token_url, &state.credentials, &code)
        .await
        .map_err(|e| {
            error!(error = %e, "token exchange failed");
            crate::metrics::record_token_exchange("failed");
            crate::metrics::record_upstream_error(ApiError::ExchangeFailed.kind());
            ApiError::ExchangeFailed
        })?;

    match grant {
        TokenGrant::Granted { access_token } => {
            state.tokens.set(access_token).await;
            crate::metrics::record_token_exchange("granted");
            info!("Yahoo access token stored");
            Ok(found("/"))
        }
        TokenGrant::Rejected { payload } => {
            error!(%payload, "token endpoint rejected authorization code");
            crate::metrics::record_token_exchange("rejected");
            Err(ApiError::TokenRejected(payload))
        }
    }
}
