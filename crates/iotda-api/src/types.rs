//! Request/response types for the IoTDA north-bound v5 API.
//!
//! All types match the JSON bodies exchanged with `/v5/iot/{project_id}/`
//! endpoints. Field names are snake_case on the wire, so no rename rules
//! are needed. Unmodeled fields are preserved via `#[serde(flatten)]`
//! catch-alls where callers re-publish the raw response.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Device shadow ────────────────────────────────────────────────────

/// Full shadow document — from `GET /v5/iot/{pid}/devices/{id}/shadow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceShadow {
    pub device_id: String,
    /// One entry per service the device reports under.
    #[serde(default)]
    pub shadow: Vec<ShadowService>,
}

/// Per-service shadow entry: last reported and desired property sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowService {
    pub service_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported: Option<ShadowData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired: Option<ShadowData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

/// One side of a shadow entry (reported or desired).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowData {
    /// Property map; the platform sends `null` when nothing was reported.
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, Value>>,
    /// Platform event timestamp, `yyyyMMdd'T'HHmmss'Z'`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
}

impl DeviceShadow {
    /// Reported properties for `service_id`, with the fallback chain the
    /// front-end contract relies on: exact match, else the first entry,
    /// else an empty map.
    pub fn reported_properties(&self, service_id: &str) -> serde_json::Map<String, Value> {
        self.shadow
            .iter()
            .find(|s| s.service_id == service_id)
            .or_else(|| self.shadow.first())
            .and_then(|s| s.reported.as_ref())
            .and_then(|r| r.properties.clone())
            .unwrap_or_default()
    }
}

// ── Commands ─────────────────────────────────────────────────────────

/// Command dispatch body — `POST /v5/iot/{pid}/devices/{id}/commands`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCommandRequest {
    pub service_id: String,
    pub command_name: String,
    /// Command parameters; product-defined shape.
    #[serde(default)]
    pub paras: serde_json::Map<String, Value>,
}

/// Command dispatch result.
///
/// For synchronous commands the platform relays the device's response in
/// `response`; unmodeled fields are preserved so the full result can be
/// re-published verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

// ── Device listing ───────────────────────────────────────────────────

/// Device overview — from `GET /v5/iot/{pid}/devices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// One of: `ONLINE`, `OFFLINE`, `ABNORMAL`, `INACTIVE`, `FROZEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Marker-paginated device list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceListing {
    #[serde(default)]
    pub devices: Vec<DeviceSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}
