//! Blocking HTTP client for the gateway's model and key endpoints.

use super::types::SpendInfo;
use super::GatewayApi;
use crate::errors::DashError;
use std::collections::BTreeMap;
use std::time::Duration;

const MODELS_PATH: &str = "/v1/models";
const KEY_INFO_PATH: &str = "/key/info";

/// Gateway client bound to one API key.
pub struct GatewayClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl GatewayClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn get_body(&self, path: &str) -> Result<String, ureq::Error> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        self.agent
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header(
                "User-Agent",
                format!("cborg-dash/{}", env!("CARGO_PKG_VERSION")),
            )
            .header("Accept", "application/json")
            .call()?
            .body_mut()
            .read_to_string()
    }
}

impl GatewayApi for GatewayClient {
    fn list_models(&self) -> Result<Vec<String>, DashError> {
        let body = self
            .get_body(MODELS_PATH)
            .map_err(|e| request_error("model list", e))?;
        let models = parse_models_body(&body)?;
        tracing::info!(count = models.len(), "Fetched model catalog");
        Ok(models)
    }

    fn key_info(&self) -> Result<Option<SpendInfo>, DashError> {
        match self.get_body(KEY_INFO_PATH) {
            Ok(body) => parse_key_info_body(&body),
            // Gateways without the key endpoint simply don't report spend.
            Err(ureq::Error::StatusCode(404)) => {
                tracing::info!("Gateway has no key info endpoint");
                Ok(None)
            }
            Err(e) => Err(request_error("key info", e)),
        }
    }
}

fn request_error(what: &str, err: ureq::Error) -> DashError {
    let message = match err {
        ureq::Error::StatusCode(code) => format!("{} request failed with HTTP {}", what, code),
        other => format!("{} request failed: {}", what, other),
    };
    tracing::warn!(%message, "Gateway request failed");
    DashError::remote(message)
}

/// Extracts model ids from an OpenAI-style `/v1/models` body.
///
/// An empty catalog is rejected: a working gateway always offers models.
pub fn parse_models_body(body: &str) -> Result<Vec<String>, DashError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| DashError::malformed(format!("model list is not JSON: {}", e)))?;

    let data = value["data"]
        .as_array()
        .ok_or_else(|| DashError::malformed("model list has no data array"))?;

    let mut models: Vec<String> = data
        .iter()
        .filter_map(|entry| entry["id"].as_str())
        .map(String::from)
        .collect();

    let skipped = data.len() - models.len();
    if skipped > 0 {
        tracing::warn!(skipped, "Model entries without an id were ignored");
    }

    if models.is_empty() {
        return Err(DashError::malformed("gateway returned an empty model catalog"));
    }

    models.sort();
    models.dedup();
    Ok(models)
}

/// Extracts spend information from a `/key/info` body.
///
/// Returns `Ok(None)` when the body carries no `info` object.
pub fn parse_key_info_body(body: &str) -> Result<Option<SpendInfo>, DashError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| DashError::malformed(format!("key info is not JSON: {}", e)))?;

    let info = &value["info"];
    if !info.is_object() {
        return Ok(None);
    }

    let current_spend = info["spend"].as_f64().unwrap_or(0.0);
    let budget_limit = info["max_budget"].as_f64();
    let remaining = budget_limit.map(|budget| budget - current_spend);

    let text = |field: &str| info[field].as_str().map(String::from);

    let model_spend: BTreeMap<String, f64> = info["model_spend"]
        .as_object()
        .map(|spend| {
            spend
                .iter()
                .filter_map(|(model, amount)| amount.as_f64().map(|a| (model.clone(), a)))
                .collect()
        })
        .unwrap_or_default();

    Ok(Some(SpendInfo {
        current_spend,
        budget_limit,
        remaining,
        key_alias: text("key_alias"),
        status: text("status"),
        created_at: text("created_at"),
        last_used_at: text("last_used_at"),
        budget_reset_at: text("budget_reset_at"),
        model_spend,
    }))
}

#[cfg(test)]
#[path = "tests/api_client_tests.rs"]
mod tests;
