use thiserror::Error;

/// Top-level error type for the `iotda-api` crate.
///
/// Covers every failure mode of the north-bound API surface: token
/// handling, transport, structured platform errors, and payload decoding.
/// Callers map these into their own user-facing responses.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token material could not be turned into a request header.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Token rejected by the platform (expired or revoked).
    #[error("Invalid or expired auth token")]
    InvalidToken,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Platform ────────────────────────────────────────────────────
    /// Structured error from the IoTDA platform.
    ///
    /// Mirrors the `error_code`/`error_msg` body IoTDA attaches to
    /// non-2xx responses, plus the `X-Request-Id` correlation header.
    #[error("IoTDA error (HTTP {status}): {message}")]
    Platform {
        status: u16,
        request_id: Option<String>,
        error_code: Option<String>,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the token is no longer
    /// accepted and a fresh one might resolve it.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken | Self::Authentication { .. } | Self::Platform { status: 401, .. }
        )
    }

    /// Returns `true` if this is a "not found" error (unknown device id).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Platform { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the platform error code (e.g. `IOTDA.014016`), if available.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Platform { error_code, .. } => error_code.as_deref(),
            _ => None,
        }
    }

    /// Extract the platform request id, if available.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Platform { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }
}
