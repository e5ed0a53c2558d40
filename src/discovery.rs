use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{AppInstance, coerce_text};
use crate::error::SsoError;
use crate::http::PortalHttpClient;

pub fn instances_url(base_url: &str) -> String {
    format!("{}/instance/appinstances", base_url.trim_end_matches('/'))
}

/// Lists the application instances visible to the bearer token.
pub async fn discover(
    client: &PortalHttpClient,
    base_url: &str,
) -> Result<Vec<AppInstance>, SsoError> {
    let url = instances_url(base_url);
    let response = client.fetch(&url).await?;
    let body: Value = serde_json::from_str(&response.body).map_err(|err| SsoError::Discovery {
        url: url.clone(),
        status: response.status,
        message: err.to_string(),
    })?;

    let instances = parse_instances(&url, response.status, &body)?;
    debug!(count = instances.len(), "discovered application instances");
    Ok(instances)
}

pub fn parse_instances(
    url: &str,
    status: u16,
    body: &Value,
) -> Result<Vec<AppInstance>, SsoError> {
    let Some(entries) = body.get("result").and_then(Value::as_array) else {
        let message = body
            .get("message")
            .map(|message| coerce_text(Some(message)))
            .unwrap_or_else(|| body.to_string());
        return Err(SsoError::Discovery {
            url: url.to_string(),
            status,
            message,
        });
    };

    if entries.is_empty() {
        warn!(url, "directory listed no application instances");
    }
    Ok(entries.iter().map(AppInstance::from_value).collect())
}
