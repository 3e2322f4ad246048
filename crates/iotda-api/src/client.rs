// Hand-crafted async HTTP client for the IoTDA north-bound v5 API.
//
// Base path: /v5/iot/{project_id}/
// Auth: X-Auth-Token header (project-scoped IAM token)

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types;

// ── Error response shape from the platform ───────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error_msg: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

// ── Configuration ────────────────────────────────────────────────────

/// Everything needed to construct an [`IotdaClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Application-side endpoint, e.g.
    /// `https://<instance>.iotda-app.cn-north-4.myhuaweicloud.com`.
    pub endpoint: String,
    /// Project id the token is scoped to.
    pub project_id: String,
    pub credentials: Credentials,
    pub transport: TransportConfig,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the IoTDA application-side API.
///
/// Constructed once at process start and shared; `reqwest::Client` is
/// internally reference-counted, so concurrent independent calls are fine.
pub struct IotdaClient {
    http: reqwest::Client,
    base_url: Url,
}

impl IotdaClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from explicit configuration.
    ///
    /// Injects `X-Auth-Token` as a sensitive default header on every
    /// request and pins the base URL to `/v5/iot/{project_id}/`.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let Credentials::Token(ref token) = config.credentials;

        let mut headers = HeaderMap::new();
        let mut token_value =
            HeaderValue::from_str(token.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid auth token header value: {e}"),
            })?;
        token_value.set_sensitive(true);
        headers.insert("X-Auth-Token", token_value);

        let http = config.transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(&config.endpoint, &config.project_id)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(
        endpoint: &str,
        project_id: &str,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(endpoint, project_id)?;
        Ok(Self { http, base_url })
    }

    /// Build the base URL: `{endpoint}/v5/iot/{project_id}/`.
    ///
    /// A bare host is accepted and upgraded to `https://`.
    fn normalize_base_url(raw: &str, project_id: &str) -> Result<Url, Error> {
        let with_scheme = if raw.contains("://") {
            raw.to_owned()
        } else {
            format!("https://{raw}")
        };

        let mut url = Url::parse(&with_scheme)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/v5/iot/{project_id}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"devices/{id}/shadow"`) onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/`, so joining relative paths works.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidToken;
        }

        let request_id = resp
            .headers()
            .get("X-Request-Id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Platform {
                status: status.as_u16(),
                request_id,
                message: err.error_msg.unwrap_or_else(|| status.to_string()),
                error_code: err.error_code,
            }
        } else {
            Error::Platform {
                status: status.as_u16(),
                request_id,
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                error_code: None,
            }
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Device shadow ────────────────────────────────────────────────

    /// Query the full shadow document for one device.
    pub async fn show_device_shadow(&self, device_id: &str) -> Result<types::DeviceShadow, Error> {
        self.get(&format!("devices/{device_id}/shadow")).await
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Dispatch one command to a device.
    ///
    /// No retries and no idempotency key; delivery is the platform's
    /// concern and failures surface as [`Error::Platform`].
    pub async fn create_command(
        &self,
        device_id: &str,
        body: &types::DeviceCommandRequest,
    ) -> Result<types::CommandResponse, Error> {
        self.post(&format!("devices/{device_id}/commands"), body)
            .await
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// List devices in the project (first page).
    pub async fn list_devices(&self, limit: Option<u32>) -> Result<types::DeviceListing, Error> {
        match limit {
            Some(limit) => {
                self.get_with_params("devices", &[("limit", limit.to_string())])
                    .await
            }
            None => self.get("devices").await,
        }
    }
}
