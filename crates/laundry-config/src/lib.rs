//! Layered configuration for the laundry control panel backend.
//!
//! TOML file + `LAUNDRY_*` environment overrides, platform-token
//! resolution, validation, and translation to `iotda_api::ClientConfig`.
//! Every value the deployment needs — platform ids, endpoint, token,
//! login pair, session TTL — comes through here; nothing is hardcoded
//! in the server.

use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use iotda_api::{ClientConfig, Credentials, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no platform token configured (set platform.token or platform.token_env)")]
    NoToken,

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub platform: Platform,

    #[serde(default)]
    pub server: Server,

    #[serde(default)]
    pub auth: Auth,
}

/// IoTDA platform coordinates and credentials.
#[derive(Debug, Deserialize, Serialize)]
pub struct Platform {
    /// Project id the token is scoped to.
    pub project_id: String,

    /// Device the panel controls.
    pub device_id: String,

    /// Service the panel reads properties from and sends commands to.
    pub service_id: String,

    /// Region id, e.g. `cn-north-4`. Informational; the endpoint decides
    /// where requests go.
    #[serde(default)]
    pub region_id: String,

    /// Application-side endpoint host (with or without scheme).
    pub endpoint: String,

    /// IAM token (plaintext — prefer `token_env`).
    pub token: Option<String>,

    /// Environment variable name containing the IAM token.
    pub token_env: Option<String>,

    /// Upstream request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// HTTP server settings.
#[derive(Debug, Deserialize, Serialize)]
pub struct Server {
    /// Listen address, e.g. `0.0.0.0:5000`.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Directory holding `index.html` / `login.html`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Allow any origin. The bundled front end is same-origin; this is
    /// for serving the pages from elsewhere during development.
    #[serde(default = "default_true")]
    pub permissive_cors: bool,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            device_id: String::new(),
            service_id: String::new(),
            region_id: String::new(),
            endpoint: String::new(),
            token: None,
            token_env: None,
            timeout: default_timeout(),
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            static_dir: default_static_dir(),
            permissive_cors: true,
        }
    }
}

/// Login gate settings.
#[derive(Debug, Deserialize, Serialize)]
pub struct Auth {
    /// The single accepted username.
    pub username: String,

    /// The single accepted password (plaintext — keep the file private).
    pub password: String,

    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl: u64,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            session_ttl: default_session_ttl(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_listen() -> String {
    "0.0.0.0:5000".into()
}
fn default_static_dir() -> String {
    "static".into()
}
fn default_true() -> bool {
    true
}
fn default_session_ttl() -> u64 {
    86_400
}

// ── Config loading ──────────────────────────────────────────────────

/// Load settings from a TOML file + environment.
///
/// Merge order (later wins): struct defaults → TOML file →
/// `LAUNDRY_*` env vars. Env keys use `__` as the section separator,
/// e.g. `LAUNDRY_PLATFORM__DEVICE_ID`.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LAUNDRY_").split("__"));

    let settings: Settings = figment.extract()?;
    Ok(settings)
}

// ── Validation ──────────────────────────────────────────────────────

impl Settings {
    /// Reject configurations that cannot possibly serve a request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn require(field: &str, value: &str) -> Result<(), ConfigError> {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: "must not be empty".into(),
                });
            }
            Ok(())
        }

        require("platform.project_id", &self.platform.project_id)?;
        require("platform.device_id", &self.platform.device_id)?;
        require("platform.service_id", &self.platform.service_id)?;
        require("platform.endpoint", &self.platform.endpoint)?;
        require("auth.username", &self.auth.username)?;
        require("auth.password", &self.auth.password)?;

        if self.auth.session_ttl == 0 {
            return Err(ConfigError::Validation {
                field: "auth.session_ttl".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.platform.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "platform.timeout".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the platform token from the credential chain:
/// `token_env` indirection first, plaintext `token` second.
pub fn resolve_token(platform: &Platform) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = platform.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(ref token) = platform.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoToken)
}

// ── Translation ─────────────────────────────────────────────────────

/// Build an `iotda_api::ClientConfig` from validated settings.
pub fn to_client_config(settings: &Settings) -> Result<ClientConfig, ConfigError> {
    let token = resolve_token(&settings.platform)?;

    Ok(ClientConfig {
        endpoint: settings.platform.endpoint.clone(),
        project_id: settings.platform.project_id.clone(),
        credentials: Credentials::Token(token),
        transport: TransportConfig {
            timeout: Duration::from_secs(settings.platform.timeout),
            ..TransportConfig::default()
        },
    })
}
