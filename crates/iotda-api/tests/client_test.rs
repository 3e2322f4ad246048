// Integration tests for `IotdaClient` using wiremock.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use iotda_api::types::{CommandResponse, DeviceCommandRequest, DeviceListing, DeviceShadow};
use iotda_api::{ClientConfig, Credentials, Error, IotdaClient, TransportConfig};

const PROJECT_ID: &str = "9e84cbf7c7c642059df96a94aa97661a";
const DEVICE_ID: &str = "69254fd5bf22cc5a8c09cdcf_demo";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, IotdaClient) {
    let server = MockServer::start().await;
    let client = IotdaClient::from_reqwest(&server.uri(), PROJECT_ID, reqwest::Client::new())
        .expect("client from mock server uri");
    (server, client)
}

fn shadow_path() -> String {
    format!("/v5/iot/{PROJECT_ID}/devices/{DEVICE_ID}/shadow")
}

fn commands_path() -> String {
    format!("/v5/iot/{PROJECT_ID}/devices/{DEVICE_ID}/commands")
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_show_device_shadow() {
    let (server, client) = setup().await;

    let body = json!({
        "device_id": DEVICE_ID,
        "shadow": [
            {
                "service_id": "dryer",
                "reported": {
                    "properties": {
                        "status": "RUNNING",
                        "mode": "Standard",
                        "temperature": 54.5,
                        "humidity": 31,
                        "countdown": 1200
                    },
                    "event_time": "20260829T101500Z"
                },
                "version": 7
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path(shadow_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let shadow: DeviceShadow = client.show_device_shadow(DEVICE_ID).await.unwrap();

    assert_eq!(shadow.device_id, DEVICE_ID);
    assert_eq!(shadow.shadow.len(), 1);
    assert_eq!(shadow.shadow[0].service_id, "dryer");
    assert_eq!(shadow.shadow[0].version, Some(7));

    let props = shadow.reported_properties("dryer");
    assert_eq!(props.get("status"), Some(&json!("RUNNING")));
    assert_eq!(props.get("countdown"), Some(&json!(1200)));
}

#[tokio::test]
async fn test_create_command() {
    let (server, client) = setup().await;

    let expected_body = json!({
        "service_id": "dryer",
        "command_name": "set_mode",
        "paras": { "gear": 2 }
    });

    Mock::given(method("POST"))
        .and(path(commands_path()))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "command_id": "b1224afb-e9f0-4916-8220-b6bab568e888",
            "response": { "result_code": 0 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let req: DeviceCommandRequest =
        serde_json::from_value(expected_body).expect("valid command request");
    let resp: CommandResponse = client.create_command(DEVICE_ID, &req).await.unwrap();

    assert_eq!(
        resp.command_id.as_deref(),
        Some("b1224afb-e9f0-4916-8220-b6bab568e888")
    );
    assert_eq!(resp.response, Some(json!({ "result_code": 0 })));
}

#[tokio::test]
async fn test_list_devices_with_limit() {
    let (server, client) = setup().await;

    let body = json!({
        "devices": [
            { "device_id": DEVICE_ID, "device_name": "demo", "status": "ONLINE" }
        ],
        "page": { "count": 1 }
    });

    Mock::given(method("GET"))
        .and(path(format!("/v5/iot/{PROJECT_ID}/devices")))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let listing: DeviceListing = client.list_devices(Some(10)).await.unwrap();

    assert_eq!(listing.devices.len(), 1);
    assert_eq!(listing.devices[0].device_id, DEVICE_ID);
    assert_eq!(listing.devices[0].status.as_deref(), Some("ONLINE"));
}

#[tokio::test]
async fn test_token_sent_as_default_header() {
    let server = MockServer::start().await;

    let config = ClientConfig {
        endpoint: server.uri(),
        project_id: PROJECT_ID.into(),
        credentials: Credentials::token("tok-abc123"),
        transport: TransportConfig::default(),
    };
    let client = IotdaClient::new(&config).expect("client from config");

    Mock::given(method("GET"))
        .and(path(shadow_path()))
        .and(header("X-Auth-Token", "tok-abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_id": DEVICE_ID,
            "shadow": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.show_device_shadow(DEVICE_ID).await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_401_maps_to_invalid_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.show_device_shadow(DEVICE_ID).await;

    assert!(
        matches!(result, Err(Error::InvalidToken)),
        "expected InvalidToken, got: {result:?}"
    );
    assert!(result.unwrap_err().is_auth_error());
}

#[tokio::test]
async fn test_error_404_structured_platform_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(shadow_path()))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("X-Request-Id", "req-42")
                .set_body_json(json!({
                    "error_code": "IOTDA.014016",
                    "error_msg": "The device does not exist."
                })),
        )
        .mount(&server)
        .await;

    let err = client.show_device_shadow(DEVICE_ID).await.unwrap_err();

    match err {
        Error::Platform {
            status,
            ref request_id,
            ref error_code,
            ref message,
        } => {
            assert_eq!(status, 404);
            assert_eq!(request_id.as_deref(), Some("req-42"));
            assert_eq!(error_code.as_deref(), Some("IOTDA.014016"));
            assert_eq!(message, "The device does not exist.");
        }
        other => panic!("expected Platform error, got: {other:?}"),
    }
    assert!(err.is_not_found());
    assert_eq!(err.error_code(), Some("IOTDA.014016"));
}

#[tokio::test]
async fn test_error_500_without_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let req = DeviceCommandRequest {
        service_id: "dryer".into(),
        command_name: "start".into(),
        paras: serde_json::Map::new(),
    };
    let result = client.create_command(DEVICE_ID, &req).await;

    match result {
        Err(Error::Platform {
            status, error_code, ..
        }) => {
            assert_eq!(status, 500);
            assert!(error_code.is_none());
        }
        other => panic!("expected Platform 500 error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_deserialization_error_carries_body_preview() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(shadow_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let err = client.show_device_shadow(DEVICE_ID).await.unwrap_err();

    match err {
        Error::Deserialization { message, body } => {
            assert!(message.contains("body preview"), "message: {message}");
            assert_eq!(body, "not json at all");
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
