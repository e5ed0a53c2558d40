use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::AppInstance;
use crate::http::PortalHttpClient;

/// The result of fetching one instance's profiles, tagged with that instance.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The request completed and its body parsed as JSON. The payload may
    /// still describe a business-level failure.
    Success { instance: AppInstance, payload: Value },
    /// Transport failed or the body was not JSON; the payload describes why.
    Failure { instance: AppInstance, payload: Value },
}

impl FetchOutcome {
    pub fn instance(&self) -> &AppInstance {
        match self {
            FetchOutcome::Success { instance, .. } | FetchOutcome::Failure { instance, .. } => {
                instance
            }
        }
    }

    pub fn payload(&self) -> &Value {
        match self {
            FetchOutcome::Success { payload, .. } | FetchOutcome::Failure { payload, .. } => {
                payload
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    pub fn into_parts(self) -> (AppInstance, Value) {
        match self {
            FetchOutcome::Success { instance, payload }
            | FetchOutcome::Failure { instance, payload } => (instance, payload),
        }
    }
}

/// Produces exactly one outcome per instance and never fails.
#[async_trait]
pub trait ProfileFetcher: Send + Sync + 'static {
    async fn run(&self, instance: AppInstance) -> FetchOutcome;
}

pub struct FetchTask {
    client: PortalHttpClient,
    base_url: String,
}

impl FetchTask {
    pub fn new(client: PortalHttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn profiles_url(&self, instance_id: &str) -> String {
        format!(
            "{}/instance/appinstance/{instance_id}/profiles",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ProfileFetcher for FetchTask {
    async fn run(&self, instance: AppInstance) -> FetchOutcome {
        let url = self.profiles_url(&instance.id);
        let response = match self.client.fetch(&url).await {
            Ok(response) => response,
            Err(err) => {
                return FetchOutcome::Failure {
                    instance,
                    payload: json!({ "error": err.to_string() }),
                };
            }
        };

        match serde_json::from_str::<Value>(&response.body) {
            Ok(payload) => {
                debug!(instance = %instance.id, status = response.status, "profiles fetched");
                FetchOutcome::Success { instance, payload }
            }
            Err(err) => FetchOutcome::Failure {
                instance,
                payload: json!({ "parse_error": err.to_string() }),
            },
        }
    }
}
