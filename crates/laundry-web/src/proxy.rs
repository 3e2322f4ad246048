//! Device proxy contract: the command allow-list and response reshaping.

use serde_json::{Map, Value, json};
use strum::EnumString;

use iotda_api::types::DeviceShadow;

use crate::error::ApiError;

/// Commands the panel may dispatch to the device.
///
/// Fixed allow-list; anything else is rejected before a platform call is
/// made. Matches the command set the dryer firmware handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CommandName {
    Start,
    Stop,
    Toggle,
    SetMode,
    SwitchMode,
}

/// Validated command request, parsed from the raw JSON body.
#[derive(Debug)]
pub struct CommandRequest {
    pub command_name: CommandName,
    pub paras: Map<String, Value>,
}

impl CommandRequest {
    /// Parse and validate `{command_name, paras?}`.
    ///
    /// A missing body or missing `paras` defaults to an empty mapping;
    /// a present-but-non-object `paras` is a contract violation.
    pub fn parse(body: Value) -> Result<Self, ApiError> {
        let command_name = body
            .get("command_name")
            .and_then(Value::as_str)
            .and_then(|name| name.parse::<CommandName>().ok())
            .ok_or_else(|| ApiError::BadRequest("invalid command_name".into()))?;

        let paras = match body.get("paras") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(ApiError::BadRequest("paras must be an object".into()));
            }
        };

        Ok(Self {
            command_name,
            paras,
        })
    }
}

/// Reshape a shadow document into the payload the front end renders:
/// `{ services: [ { service_id, properties } ] }`, with the reported
/// properties of the configured service (fallbacks per
/// [`DeviceShadow::reported_properties`]).
pub fn shadow_payload(shadow: &DeviceShadow, service_id: &str) -> Value {
    json!({
        "services": [
            {
                "service_id": service_id,
                "properties": shadow.reported_properties(service_id),
            }
        ]
    })
}
