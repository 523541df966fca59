//! Per-request error taxonomy
//!
//! Every failure a handler can hit maps to one `ApiError`, which renders as a
//! JSON body with a fixed status. Underlying causes are logged where they
//! occur and never copied into the response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use thiserror::Error;

/// Message returned when a protected route is called before login.
pub const NOT_AUTHENTICATED: &str = "Not authenticated. Visit /auth/start to sign in with Yahoo.";

#[derive(Error, Debug)]
pub enum ApiError {
    /// `/auth/callback` without a `code` query parameter
    #[error("missing authorization code")]
    MissingCode,

    /// Token endpoint answered with an error payload
    #[error("token exchange rejected: {0}")]
    TokenRejected(Value),

    /// Token endpoint unreachable or replied with something other than JSON
    #[error("token exchange failed")]
    ExchangeFailed,

    /// No access token stored yet
    #[error("not authenticated")]
    Unauthenticated,

    /// Resource endpoint replied with a non-success status
    #[error("upstream returned {status}")]
    UpstreamStatus { status: u16, body: String },

    /// Resource endpoint unreachable or replied with malformed JSON
    #[error("failed to fetch {0}")]
    FetchFailed(&'static str),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCode | ApiError::TokenRejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::ExchangeFailed
            | ApiError::UpstreamStatus { .. }
            | ApiError::FetchFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for the `kind` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingCode => "missing_code",
            ApiError::TokenRejected(_) => "token_rejected",
            ApiError::ExchangeFailed => "exchange_failed",
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::UpstreamStatus { .. } => "upstream_status",
            ApiError::FetchFailed(_) => "upstream_unavailable",
        }
    }

    fn body(&self) -> Value {
        match self {
            ApiError::MissingCode => json!({ "error": "Missing authorization code" }),
            ApiError::TokenRejected(payload) => json!({
                "error": "Token exchange failed",
                "details": payload,
            }),
            ApiError::ExchangeFailed => json!({ "error": "Authentication failed" }),
            ApiError::Unauthenticated => json!({ "error": NOT_AUTHENTICATED }),
            ApiError::UpstreamStatus { status, body } => json!({
                "error": "Yahoo API error",
                "status": status,
                "body": body,
            }),
            ApiError::FetchFailed(resource) => json!({ "error": format!("Failed to fetch {resource}") }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            self.body().to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_code_is_bad_request() {
        let (status, body) = render(ApiError::MissingCode).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing authorization code");
    }

    #[tokio::test]
    async fn rejected_exchange_carries_payload() {
        let (status, body) = render(ApiError::TokenRejected(json!({"error": "invalid_grant"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["error"], "invalid_grant");
    }

    #[tokio::test]
    async fn unauthenticated_points_at_login() {
        let (status, body) = render(ApiError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].as_str().unwrap().starts_with("Not authenticated"));
        assert!(body["error"].as_str().unwrap().contains("/auth/start"));
    }

    #[tokio::test]
    async fn upstream_status_preserves_diagnostics() {
        let (status, body) = render(ApiError::UpstreamStatus {
            status: 503,
            body: "rate limited".into(),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Yahoo API error");
        assert_eq!(body["status"], 503);
        assert_eq!(body["body"], "rate limited");
    }

    #[tokio::test]
    async fn network_failures_are_generic() {
        let (status, body) = render(ApiError::FetchFailed("scoreboard")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to fetch scoreboard"}));

        let (status, body) = render(ApiError::ExchangeFailed).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Authentication failed"}));
    }

    #[test]
    fn kinds_are_distinct() {
        let kinds = [
            ApiError::MissingCode.kind(),
            ApiError::TokenRejected(Value::Null).kind(),
            ApiError::ExchangeFailed.kind(),
            ApiError::Unauthenticated.kind(),
            ApiError::UpstreamStatus { status: 500, body: String::new() }.kind(),
            ApiError::FetchFailed("scoreboard").kind(),
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }
}
