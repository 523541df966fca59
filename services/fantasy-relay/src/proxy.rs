//! Authenticated league resource proxy
//!
//! Fetches a league resource from the Fantasy API with the stored bearer
//! token and forwards the JSON body verbatim. No retries: an upstream
//! failure, including an upstream 401 from an expired token, is reported to
//! the caller as a 500 and the browser decides whether to log in again.

use std::sync::Arc;

use axum::Json;
use serde_json::Value;
use tracing::{debug, error, instrument};
use yahoo_auth::TokenStore;

use crate::error::ApiError;

/// Shared state for the proxy handlers.
#[derive(Clone)]
pub struct ProxyState {
    pub client: reqwest::Client,
    pub api_base_url: String,
    pub league_key: String,
    pub tokens: Arc<TokenStore>,
}

/// League collections the relay exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeagueResource {
    Scoreboard,
    /// Feeds the draft-pick grid
    DraftResults,
}

impl LeagueResource {
    pub fn path_segment(self) -> &'static str {
        match self {
            LeagueResource::Scoreboard => "scoreboard",
            LeagueResource::DraftResults => "draftresults",
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            LeagueResource::Scoreboard => "scoreboard",
            LeagueResource::DraftResults => "draft results",
        }
    }
}

/// `{base}/league/{league_key}/{resource}?format=json`
pub fn resource_url(api_base_url: &str, league_key: &str, resource: LeagueResource) -> String {
    format!(
        "{}/league/{}/{}?format=json",
        api_base_url.trim_end_matches('/'),
        league_key,
        resource.path_segment()
    )
}

/// Fetch `resource` for the configured league.
///
/// Returns `Unauthenticated` without touching the network when no token is
/// stored. The body is read as text before parsing so a failed call can
/// echo the upstream payload.
#[instrument(skip_all, fields(request_id = %request_id, resource = resource.path_segment()))]
pub async fn fetch_league_resource(
    state: &ProxyState,
    resource: LeagueResource,
    request_id: &str,
) -> Result<Json<Value>, ApiError> {
    let Some(token) = state.tokens.get().await else {
        debug!("no access token stored");
        return Err(ApiError::Unauthenticated);
    };

    let url = resource_url(&state.api_base_url, &state.league_key, resource);
    let fetch_failed = |stage: &str, e: &dyn std::fmt::Display| {
        error!(error = %e, stage, "failed to fetch league resource");
        let err = ApiError::FetchFailed(resource.label());
        crate::metrics::record_upstream_error(err.kind());
        err
    };

    let response = state
        .client
        .get(&url)
        .bearer_auth(token.expose())
        .send()
        .await
        .map_err(|e| fetch_failed("send", &e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| fetch_failed("read_body", &e))?;

    if !status.is_success() {
        error!(%status, body = %body, "Yahoo API returned an error");
        let err = ApiError::UpstreamStatus {
            status: status.as_u16(),
            body,
        };
        crate::metrics::record_upstream_error(err.kind());
        return Err(err);
    }

    let payload: Value =
        serde_json::from_str(&body).map_err(|e| fetch_failed("parse_json", &e))?;
    Ok(Json(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoreboard_url_requests_json() {
        assert_eq!(
            resource_url(yahoo_auth::FANTASY_API_BASE, "449.l.12345", LeagueResource::Scoreboard),
            "https://fantasysports.yahooapis.com/fantasy/v2/league/449.l.12345/scoreboard?format=json"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        assert_eq!(
            resource_url("http://127.0.0.1:4000/fantasy/v2/", "k", LeagueResource::DraftResults),
            "http://127.0.0.1:4000/fantasy/v2/league/k/draftresults?format=json"
        );
    }

    #[test]
    fn labels_read_naturally() {
        assert_eq!(LeagueResource::Scoreboard.label(), "scoreboard");
        assert_eq!(LeagueResource::DraftResults.label(), "draft results");
    }

    #[tokio::test]
    async fn missing_token_short_circuits() {
        let state = ProxyState {
            client: reqwest::Client::new(),
            // Nothing listens here; reaching the network would be an error
            api_base_url: "http://127.0.0.1:9/fantasy/v2".into(),
            league_key: "449.l.1".into(),
            tokens: Arc::new(TokenStore::new()),
        };
        let err = fetch_league_resource(&state, LeagueResource::Scoreboard, "req_test")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }
}
