// iotda-api: Async Rust client for the Huawei Cloud IoTDA north-bound v5 API

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use auth::Credentials;
pub use client::{ClientConfig, IotdaClient};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
