//! Configuration types and loading
//!
//! Precedence: env vars > config file > defaults. The client secret is only
//! ever read from `YAHOO_CLIENT_SECRET`, never from TOML, so it cannot end
//! up in a checked-in file.

use common::Secret;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use yahoo_auth::Credentials;

/// Root configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub yahoo: YahooConfig,
}

/// Inbound HTTP listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the browser bundle; `index.html` is the fallback
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    /// Timeout applied to every outbound upstream call
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// Yahoo application and league settings
#[derive(Debug, Deserialize)]
pub struct YahooConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default)]
    pub league_key: String,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
            timeout_secs: default_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: default_redirect_uri(),
            league_key: String::new(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_timeout() -> u64 {
    30
}

fn default_max_connections() -> usize {
    256
}

/// Yahoo only accepts https redirect URIs, while the relay itself listens
/// on plain HTTP. Local use needs a TLS-terminating proxy on port 3000 (or
/// `YAHOO_REDIRECT_URI` pointing at one).
fn default_redirect_uri() -> String {
    "https://localhost:3000/auth/callback".into()
}

fn default_authorize_url() -> String {
    yahoo_auth::AUTHORIZE_ENDPOINT.into()
}

fn default_token_url() -> String {
    yahoo_auth::TOKEN_ENDPOINT.into()
}

fn default_api_base_url() -> String {
    yahoo_auth::FANTASY_API_BASE.into()
}

impl Config {
    /// Load configuration from `path` (if present), overlay the process
    /// environment, then validate.
    ///
    /// A missing file is only an error when `required` is set, i.e. the
    /// path was named explicitly with `--config` or `CONFIG_PATH`.
    pub fn load(path: &Path, required: bool) -> common::Result<Self> {
        Self::load_with_env(path, required, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with an injectable environment lookup.
    pub fn load_with_env(
        path: &Path,
        required: bool,
        env: impl Fn(&str) -> Option<String>,
    ) -> common::Result<Self> {
        let mut config = if required || path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            Config::default()
        };

        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> common::Result<()> {
        let lookup = |key: &str| env(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        if let Some(id) = lookup("YAHOO_CLIENT_ID") {
            self.yahoo.client_id = Some(id);
        }
        if let Some(secret) = lookup("YAHOO_CLIENT_SECRET") {
            self.yahoo.client_secret = Some(Secret::new(secret));
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| common::Error::invalid("PORT", format!("{port:?}: {e}")))?;
        }
        if let Some(uri) = lookup("YAHOO_REDIRECT_URI") {
            self.yahoo.redirect_uri = uri;
        }
        if let Some(key) = lookup("YAHOO_LEAGUE_KEY") {
            self.yahoo.league_key = key;
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    fn validate(&self) -> common::Result<()> {
        for (key, value) in [
            ("yahoo.redirect_uri", &self.yahoo.redirect_uri),
            ("yahoo.authorize_url", &self.yahoo.authorize_url),
            ("yahoo.token_url", &self.yahoo.token_url),
            ("yahoo.api_base_url", &self.yahoo.api_base_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| common::Error::invalid(key, format!("{value:?}: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(common::Error::invalid(
                    key,
                    format!("must start with http:// or https://, got: {value}"),
                ));
            }
        }

        if self.yahoo.league_key.trim().is_empty() {
            return Err(common::Error::Config(
                "league_key is required (set YAHOO_LEAGUE_KEY or [yahoo] league_key)".into(),
            ));
        }

        if self.server.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Names of the env vars whose absence leaves the relay unable to
    /// authenticate. Empty when both credentials are present.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.yahoo.client_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
            missing.push("YAHOO_CLIENT_ID");
        }
        if self.yahoo.client_secret.as_ref().is_none_or(Secret::is_blank) {
            missing.push("YAHOO_CLIENT_SECRET");
        }
        missing
    }

    /// Application credentials for the OAuth flow. Missing values become
    /// empty strings; Yahoo then rejects the handshake upstream.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.yahoo.client_id.clone().unwrap_or_default(),
            client_secret: self
                .yahoo
                .client_secret
                .clone()
                .unwrap_or_else(|| Secret::new(String::new())),
            redirect_uri: self.yahoo.redirect_uri.clone(),
        }
    }

    /// Resolve the config file path and whether it was named explicitly.
    ///
    /// CLI arg wins over `CONFIG_PATH`; otherwise `fantasy-relay.toml` in
    /// the working directory, which may be absent.
    pub fn resolve_path(cli_path: Option<&str>) -> (PathBuf, bool) {
        if let Some(p) = cli_path {
            return (PathBuf::from(p), true);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return (PathBuf::from(p), true);
        }
        (PathBuf::from("fantasy-relay.toml"), false)
    }
}
