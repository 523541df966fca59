//! Authorization URL construction
//!
//! The URL is a pure function of configuration: no state, nonce or PKCE
//! challenge, so repeated calls produce the same redirect target.

use url::Url;

use crate::constants::AUTH_LANGUAGE;
use crate::error::{Error, Result};

/// Build the Yahoo authorization URL the browser is redirected to.
///
/// Query parameters: `client_id`, `redirect_uri`, `response_type=code` and
/// `language=en-us`, appended to any query already on `endpoint`.
pub fn build_authorization_url(endpoint: &str, client_id: &str, redirect_uri: &str) -> Result<String> {
    let mut url = Url::parse(endpoint).map_err(|e| Error::InvalidEndpoint(format!("{endpoint}: {e}")))?;
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("language", AUTH_LANGUAGE);
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AUTHORIZE_ENDPOINT;
    use std::collections::HashMap;

    fn query_of(url: &str) -> HashMap<String, String> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    #[test]
    fn includes_all_authorization_parameters() {
        let url = build_authorization_url(
            AUTHORIZE_ENDPOINT,
            "dj0yJmk9client",
            "https://relay.example.com/auth/callback",
        )
        .unwrap();

        assert!(url.starts_with("https://api.login.yahoo.com/oauth2/request_auth?"));
        let query = query_of(&url);
        assert_eq!(query.len(), 4);
        assert_eq!(query["client_id"], "dj0yJmk9client");
        assert_eq!(query["redirect_uri"], "https://relay.example.com/auth/callback");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["language"], "en-us");
    }

    #[test]
    fn redirect_uri_is_percent_encoded() {
        let url = build_authorization_url(AUTHORIZE_ENDPOINT, "id", "https://x.test/cb?a=1").unwrap();
        assert!(url.contains("redirect_uri=https%3A%2F%2Fx.test%2Fcb%3Fa%3D1"), "got: {url}");
    }

    #[test]
    fn repeated_builds_are_identical() {
        let first = build_authorization_url(AUTHORIZE_ENDPOINT, "id", "https://x.test/cb").unwrap();
        for _ in 0..5 {
            let again = build_authorization_url(AUTHORIZE_ENDPOINT, "id", "https://x.test/cb").unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn rejects_unparseable_endpoint() {
        let err = build_authorization_url("not a url", "id", "https://x.test/cb").unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }
}
