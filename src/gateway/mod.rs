//! Remote catalog client for the AI gateway's REST API.
//!
//! This module provides:
//! - The `GatewayApi` seam the dashboard talks through
//! - A blocking HTTP implementation (`GatewayClient`)
//! - Pure parsers for the `/v1/models` and `/key/info` payloads

pub mod api_client;
pub mod types;

pub use api_client::GatewayClient;
pub use types::SpendInfo;

use crate::errors::DashError;

/// Calls the dashboard needs from the gateway, one credential per instance.
pub trait GatewayApi {
    /// Model ids currently offered to this key.
    fn list_models(&self) -> Result<Vec<String>, DashError>;

    /// Spend and key metadata, or `None` if the gateway doesn't report it.
    fn key_info(&self) -> Result<Option<SpendInfo>, DashError>;
}
