//! Shared state for routes and middleware.
//!
//! The platform client is built once at startup and injected here;
//! handlers never reach for globals.

use std::sync::Arc;
use std::time::Duration;

use iotda_api::IotdaClient;
use laundry_config::Settings;

use crate::session::SessionStore;

/// Deployment facts the handlers need, frozen at startup.
#[derive(Debug)]
pub struct WebConfig {
    pub username: String,
    pub password: String,
    pub device_id: String,
    pub service_id: String,
    pub static_dir: String,
    pub permissive_cors: bool,
}

/// Shared context for all routes and middleware. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<IotdaClient>,
    pub sessions: SessionStore,
    pub config: Arc<WebConfig>,
}

impl AppState {
    pub fn new(client: IotdaClient, settings: &Settings) -> Self {
        Self {
            client: Arc::new(client),
            sessions: SessionStore::new(Duration::from_secs(settings.auth.session_ttl)),
            config: Arc::new(WebConfig {
                username: settings.auth.username.clone(),
                password: settings.auth.password.clone(),
                device_id: settings.platform.device_id.clone(),
                service_id: settings.platform.service_id.clone(),
                static_dir: settings.server.static_dir.clone(),
                permissive_cors: settings.server.permissive_cors,
            }),
        }
    }
}
